//! Secret CLI commands
//!
//! Reading, writing and reorganising secrets on the targeted backend.

use std::collections::BTreeMap;
use std::io::Read;

use anyhow::{Context, Result};
use bytes::Bytes;
use reqwest::Method;

use super::output::{print_json, print_secret};
use super::prompt::{confirm, Assignment};
use super::{Commands, Recursion};
use crate::errors::SafeError;
use crate::vault::{Secret, SecretStore, TreeBuilder, TreeOp, TreeOps, VaultClient};

/// Handle secret commands
pub async fn handle_secret_command<S: SecretStore + ?Sized>(
    command: Commands,
    store: &S,
) -> Result<()> {
    match command {
        Commands::Get { paths } => get_secrets(store, &paths).await?,
        Commands::Set { path, assignments } => {
            set_secret(store, &path, &assignments, true).await?
        }
        Commands::Paste { path, assignments } => {
            set_secret(store, &path, &assignments, false).await?
        }
        Commands::Paths { paths } => list_paths(store, &paths).await?,
        Commands::Tree { paths } => draw_trees(store, &paths).await?,
        Commands::Delete { recursion, paths } => {
            if !proceed("delete", recursion, &paths)? {
                return Ok(());
            }
            delete_secrets(store, &paths, recursion.recursive).await?
        }
        Commands::Move { recursion, old, new } => {
            if !proceed("move", recursion, &[old.clone(), new.clone()])? {
                return Ok(());
            }
            relocate(store, TreeOp::Move, &old, &new, recursion.recursive).await?
        }
        Commands::Copy { recursion, old, new } => {
            if !proceed("copy", recursion, &[old.clone(), new.clone()])? {
                return Ok(());
            }
            relocate(store, TreeOp::Copy, &old, &new, recursion.recursive).await?
        }
        Commands::Export { paths } => export_secrets(store, &paths).await?,
        Commands::Import => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input).context("Failed to read stdin")?;
            import_secrets(store, &input).await?;
        }
        other => anyhow::bail!("'{}' is not a secret command", other.name()),
    }

    Ok(())
}

/// Recursive operations need confirmation unless forced
fn proceed(command: &str, recursion: Recursion, args: &[String]) -> Result<bool> {
    if !recursion.recursive || recursion.force {
        return Ok(true);
    }

    let question = format!("Are you sure you wish to recursively {} {}?", command, args.join(" "));
    if confirm(&question)? {
        Ok(true)
    } else {
        println!("Aborting...");
        Ok(false)
    }
}

async fn get_secrets<S: SecretStore + ?Sized>(store: &S, paths: &[String]) -> Result<()> {
    for path in paths {
        let secret = store.read(path).await?;
        print_secret(path, &secret)?;
    }
    Ok(())
}

/// Read-modify-write; a missing secret starts out empty.
///
/// `confirm` makes prompted values be entered twice.
pub async fn set_secret<S: SecretStore + ?Sized>(
    store: &S,
    path: &str,
    assignments: &[String],
    confirm: bool,
) -> Result<()> {
    let assignments =
        assignments.iter().map(|a| Assignment::parse(a)).collect::<Result<Vec<_>, _>>()?;

    let mut secret = match store.read(path).await {
        Ok(secret) => secret,
        Err(e) if e.is_not_found() => Secret::new(),
        Err(e) => return Err(e.into()),
    };

    for assignment in assignments {
        let (key, value) = assignment.resolve(confirm)?;
        secret.set(key, value);
    }

    store.write(path, &secret).await?;
    Ok(())
}

async fn list_paths<S: SecretStore + ?Sized>(store: &S, paths: &[String]) -> Result<()> {
    for path in paths {
        let tree = TreeBuilder::new(store).tree(path).await?;
        for leaf in tree.paths("/") {
            println!("{}", leaf);
        }
    }
    Ok(())
}

async fn draw_trees<S: SecretStore + ?Sized>(store: &S, paths: &[String]) -> Result<()> {
    for path in paths {
        let tree = TreeBuilder::new(store).tree(path).await?;
        println!("{}", tree.draw());
    }
    Ok(())
}

async fn delete_secrets<S: SecretStore + ?Sized>(
    store: &S,
    paths: &[String],
    recursive: bool,
) -> Result<()> {
    let ops = TreeOps::new(store);
    for path in paths {
        if recursive {
            ops.delete_tree(path).await?;
        } else {
            store.delete(path).await?;
        }
    }
    Ok(())
}

async fn relocate<S: SecretStore + ?Sized>(
    store: &S,
    op: TreeOp,
    old: &str,
    new: &str,
    recursive: bool,
) -> Result<()> {
    let ops = TreeOps::new(store);
    if recursive {
        ops.move_copy_tree(old, new, op).await?;
    } else {
        ops.apply(op, old, new).await?;
    }
    Ok(())
}

async fn export_secrets<S: SecretStore + ?Sized>(store: &S, paths: &[String]) -> Result<()> {
    let data = TreeOps::new(store).export(paths).await?;
    print_json(&data)
}

/// Write every secret of an export document
pub async fn import_secrets<S: SecretStore + ?Sized>(store: &S, input: &str) -> Result<usize> {
    let data: BTreeMap<String, Secret> =
        serde_json::from_str(input).map_err(SafeError::from).context("Invalid export document")?;
    let written = TreeOps::new(store).import(&data).await?;
    eprintln!("wrote {} secrets", written);
    Ok(written)
}

/// Issue a raw request and print the body
pub async fn curl(
    client: &VaultClient,
    method: &str,
    path: &str,
    body: Option<String>,
) -> Result<()> {
    let method = Method::from_bytes(method.to_uppercase().as_bytes())
        .map_err(|_| SafeError::usage(format!("invalid HTTP method '{}'", method)))?;

    let response = client.curl(method, path, body.map(Bytes::from)).await?;
    eprintln!("{}", response.status_text());
    println!("{}", response.text());
    Ok(())
}
