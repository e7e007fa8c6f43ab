//! # Command Line Interface
//!
//! Secret manipulation and cluster seal management against the current
//! target (`~/.saferc`) or the `VAULT_*` environment.

pub mod cluster;
pub mod output;
pub mod prompt;
pub mod secrets;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::Instrument;

use crate::command_span;
use crate::config::{ClientConfig, TargetFile};
use crate::errors::SafeError;
use crate::observability::init_logging;
use crate::vault::VaultClient;

#[derive(Parser)]
#[command(name = "safe")]
#[command(about = "Hierarchical secret management for Vault")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip TLS certificate verification
    #[arg(short = 'k', long, global = true)]
    pub insecure: bool,
}

/// Flags shared by commands that can walk a whole subtree
#[derive(Args, Debug, Clone, Copy)]
pub struct Recursion {
    /// Operate on every secret below the given path
    #[arg(short = 'R', long)]
    pub recursive: bool,

    /// Skip the confirmation prompt for recursive operations
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print one or more secrets as YAML; `path:key` selects a single key
    #[command(visible_aliases = ["read", "cat"])]
    Get {
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<String>,
    },

    /// Update keys of a secret, creating it if needed
    #[command(
        visible_alias = "write",
        after_help = "ASSIGNMENTS:\n    key=value    set key to a literal value\n    key@file     set key to the contents of a file\n    key          prompt for the value without echo"
    )]
    Set {
        path: String,

        #[arg(required = true, value_name = "ASSIGNMENT")]
        assignments: Vec<String>,
    },

    /// Like `set`, but prompted values are entered once without confirmation
    Paste {
        path: String,

        #[arg(required = true, value_name = "ASSIGNMENT")]
        assignments: Vec<String>,
    },

    /// List every secret path below the given paths
    Paths {
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<String>,
    },

    /// Draw the hierarchy below the given paths
    Tree {
        #[arg(value_name = "PATH", default_value = "secret")]
        paths: Vec<String>,
    },

    /// Delete secrets
    #[command(visible_alias = "rm")]
    Delete {
        #[command(flatten)]
        recursion: Recursion,

        #[arg(required = true, value_name = "PATH")]
        paths: Vec<String>,
    },

    /// Move a secret, or a subtree with -R
    #[command(visible_aliases = ["mv", "rename"])]
    Move {
        #[command(flatten)]
        recursion: Recursion,

        old: String,
        new: String,
    },

    /// Copy a secret, or a subtree with -R
    #[command(visible_alias = "cp")]
    Copy {
        #[command(flatten)]
        recursion: Recursion,

        old: String,
        new: String,
    },

    /// Dump every secret below the given paths as JSON
    Export {
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<String>,
    },

    /// Write secrets from an export document read on stdin
    Import,

    /// Issue a raw API request and print the response body
    Curl {
        /// HTTP method (GET, PUT, POST, DELETE, ...)
        method: String,

        /// API path below /v1/
        path: String,

        /// Request body
        body: Option<String>,
    },

    /// Show the seal status of every cluster member
    Status,

    /// Seal every cluster member, following the active member
    Seal,

    /// Unseal every sealed cluster member
    Unseal {
        /// Key share to use instead of prompting (repeatable)
        #[arg(long = "key", value_name = "SHARE")]
        keys: Vec<String>,
    },

    /// Show the address and token in effect
    Env,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Get { .. } => "get",
            Commands::Set { .. } => "set",
            Commands::Paste { .. } => "paste",
            Commands::Paths { .. } => "paths",
            Commands::Tree { .. } => "tree",
            Commands::Delete { .. } => "delete",
            Commands::Move { .. } => "move",
            Commands::Copy { .. } => "copy",
            Commands::Export { .. } => "export",
            Commands::Import => "import",
            Commands::Curl { .. } => "curl",
            Commands::Status => "status",
            Commands::Seal => "seal",
            Commands::Unseal { .. } => "unseal",
            Commands::Env => "env",
        }
    }
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let mut env = ClientConfig::from_env();
    if cli.insecure {
        env.skip_verify = true;
    }

    let targets = TargetFile::load().context("Failed to load ~/.saferc")?;
    let config = targets.client_config(env)?;
    let endpoint_url = match targets.current()? {
        Some((_, target)) => target.url.clone(),
        None => config.address.clone(),
    };

    let span = command_span!(cli.command.name());
    async move {
        match cli.command {
            Commands::Env => cluster::show_env(&config),
            Commands::Status => cluster::status(&config, &targets, &endpoint_url).await,
            Commands::Seal => cluster::seal(&config, &endpoint_url).await,
            Commands::Unseal { keys } => {
                cluster::unseal(&config, &targets, &endpoint_url, keys).await
            }
            Commands::Curl { method, path, body } => {
                let client = connect(&config)?;
                secrets::curl(&client, &method, &path, body).await
            }
            command => {
                let client = connect(&config)?;
                secrets::handle_secret_command(command, &client).await
            }
        }
    }
    .instrument(span)
    .await
}

/// Build a client for the targeted backend
fn connect(config: &ClientConfig) -> anyhow::Result<VaultClient> {
    require_target(config)?;
    Ok(VaultClient::new(config.clone())?)
}

fn require_target(config: &ClientConfig) -> anyhow::Result<()> {
    if config.address.is_empty() {
        return Err(SafeError::config(
            "not targeting a vault; set VAULT_ADDR or a current target in ~/.saferc",
        )
        .into());
    }
    Ok(())
}
