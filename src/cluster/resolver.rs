//! Name resolution for cluster topology.
//!
//! The coordinator needs two views of DNS: the set of addresses behind a
//! service name, and a single "pointer" value for the active member name.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::errors::{Result, SafeError};

/// Resolves service names to member addresses
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Addresses `name` currently resolves to, in resolver order.
    /// A name without records resolves to an empty list.
    async fn lookup(&self, name: &str) -> Result<Vec<String>>;

    /// Whether `name` resolves to at least one record
    async fn has_records(&self, name: &str) -> Result<bool> {
        Ok(!self.lookup(name).await?.is_empty())
    }

    /// The first record for `name`, or an empty string when there is none
    async fn pointer(&self, name: &str) -> Result<String> {
        Ok(self.lookup(name).await?.into_iter().next().unwrap_or_default())
    }
}

/// Resolver backed by the operating system's stub resolver.
///
/// A name that does not resolve has no records; a lookup that outlives the
/// timeout is an error.
#[derive(Debug, Clone)]
pub struct SystemResolver {
    timeout: Duration,
}

impl Default for SystemResolver {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(5) }
    }
}

impl SystemResolver {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl NameResolver for SystemResolver {
    async fn lookup(&self, name: &str) -> Result<Vec<String>> {
        let query = format!("{}:0", name);
        let addrs = match tokio::time::timeout(self.timeout, tokio::net::lookup_host(query)).await {
            Ok(Ok(addrs)) => addrs,
            Ok(Err(e)) => {
                debug!(name, error = %e, "name did not resolve");
                return Ok(Vec::new());
            }
            Err(_) => {
                debug!(name, "name resolution timed out");
                return Err(SafeError::resolve_timeout(name));
            }
        };

        let mut hosts: Vec<String> = Vec::new();
        for addr in addrs {
            let ip = addr.ip().to_string();
            if !hosts.contains(&ip) {
                hosts.push(ip);
            }
        }
        Ok(hosts)
    }
}
