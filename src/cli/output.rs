//! Shared output formatting for CLI commands
//!
//! Data goes to stdout; progress and status lines go to stderr.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::cluster::MemberStatus;
use crate::vault::Secret;

/// Print data as pretty JSON
pub fn print_json<T: Serialize>(data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("Failed to serialize to JSON")?;
    println!("{}", json);
    Ok(())
}

/// Print one secret as a YAML document headed by its path
pub fn print_secret(path: &str, secret: &Secret) -> Result<()> {
    let yaml = secret.to_yaml().context("Failed to serialize to YAML")?;
    println!("--- # {}", path);
    println!("{}\n", yaml.trim_end());
    Ok(())
}

/// One status line per member
pub fn status_line(status: &MemberStatus) -> String {
    match &status.state {
        Err(e) => format!("{}: {}", status.endpoint, e.to_string().red()),
        Ok(state) if state.sealed => format!("{}: {}", status.endpoint, "SEALED".cyan()),
        Ok(_) => format!("{}: {}", status.endpoint, "unsealed".green()),
    }
}

pub fn print_status(statuses: &[MemberStatus]) {
    for status in statuses {
        eprintln!("{}", status_line(status));
    }
}

/// Progress note on stderr
pub fn note(message: &str) {
    eprintln!("{}", message.yellow());
}
