//! Cluster CLI commands
//!
//! Seal management across every member of the targeted cluster.

use anyhow::Result;
use owo_colors::OwoColorize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::output::{note, print_status};
use super::prompt::TerminalKeyShares;
use super::require_target;
use crate::cluster::{
    ClusterCoordinator, KeyShareSource, MemberControl, NameResolver, StaticKeyShares,
    SystemResolver, UnsealOutcome, VaultMembers,
};
use crate::config::{ClientConfig, CoordinatorSettings, Target, TargetFile};

type Coordinator = ClusterCoordinator<SystemResolver, VaultMembers>;

fn coordinator(config: &ClientConfig) -> Result<Coordinator> {
    let settings = CoordinatorSettings::from_env()?;
    let members = VaultMembers::new(config.clone());
    Ok(ClusterCoordinator::new(SystemResolver::default(), members, settings))
}

/// Member endpoints from the current target, falling back to DNS discovery
async fn member_endpoints<R, M>(
    coordinator: &ClusterCoordinator<R, M>,
    targets: &TargetFile,
    endpoint_url: &str,
) -> Result<Vec<String>>
where
    R: NameResolver,
    M: MemberControl,
{
    let mut target = match targets.current()? {
        Some((_, target)) => target.clone(),
        None => Target::new(endpoint_url),
    };

    if target.backends.is_empty() {
        let topology = coordinator.discover_topology().await?;
        debug!(backends = ?topology.backends, active = ?topology.active, "discovered topology");
        topology.apply(&mut target);
    }

    Ok(target.vault_endpoints()?)
}

pub async fn status(config: &ClientConfig, targets: &TargetFile, endpoint_url: &str) -> Result<()> {
    require_target(config)?;
    let coordinator = coordinator(config)?;
    let endpoints = member_endpoints(&coordinator, targets, endpoint_url).await?;

    let statuses = coordinator.status(&endpoints).await?;
    print_status(&statuses);
    Ok(())
}

pub async fn seal(config: &ClientConfig, endpoint_url: &str) -> Result<()> {
    require_target(config)?;
    let coordinator = coordinator(config)?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    note("looking up unsealed vaults to seal...");
    let sealed = coordinator.seal(endpoint_url, &cancel).await?;
    for host in &sealed {
        eprintln!("sealed {}", host);
    }
    eprintln!("{}", "The Vaults are sealed!".green());
    Ok(())
}

pub async fn unseal(
    config: &ClientConfig,
    targets: &TargetFile,
    endpoint_url: &str,
    keys: Vec<String>,
) -> Result<()> {
    require_target(config)?;
    let coordinator = coordinator(config)?;
    let endpoints = member_endpoints(&coordinator, targets, endpoint_url).await?;

    let mut shares: Box<dyn KeyShareSource> = if keys.is_empty() {
        Box::new(TerminalKeyShares)
    } else {
        Box::new(StaticKeyShares(keys))
    };

    match coordinator.unseal(&endpoints, shares.as_mut()).await? {
        UnsealOutcome::AlreadyUnsealed => {
            eprintln!("Vaults are already unsealed; taking no action.")
        }
        UnsealOutcome::Unsealed(members) => {
            eprintln!("{} ({} members)", "Unsealed the Vault(s)".green(), members.len())
        }
    }
    Ok(())
}

/// Print the effective address and token
pub fn show_env(config: &ClientConfig) -> Result<()> {
    eprintln!("  {}  {}", "VAULT_ADDR".blue(), config.address.green());
    eprintln!("  {} {}", "VAULT_TOKEN".blue(), config.token.as_deref().unwrap_or_default().green());
    if let Some(host) = &config.host_override {
        eprintln!("  {} {}", "VAULT_HOSTNAME".blue(), host.green());
    }
    Ok(())
}
