//! Per-member seal control.

use async_trait::async_trait;

use crate::config::ClientConfig;
use crate::errors::{Result, SafeError};
use crate::vault::{SealState, VaultClient};

/// Seal management for individual cluster members addressed by endpoint URL
#[async_trait]
pub trait MemberControl: Send + Sync {
    async fn seal_status(&self, endpoint: &str) -> Result<SealState>;

    async fn seal(&self, endpoint: &str) -> Result<()>;

    /// Submit `keys` to a sealed member, returning its final state
    async fn unseal(&self, endpoint: &str, keys: &[String]) -> Result<SealState>;
}

/// [`MemberControl`] over HTTP, one short-lived [`VaultClient`] per call
#[derive(Debug, Clone)]
pub struct VaultMembers {
    config: ClientConfig,
}

impl VaultMembers {
    /// Members share `config`'s token, TLS and tracing options
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    fn client(&self, endpoint: &str) -> Result<VaultClient> {
        VaultClient::new(self.config.with_address(endpoint))
    }
}

#[async_trait]
impl MemberControl for VaultMembers {
    async fn seal_status(&self, endpoint: &str) -> Result<SealState> {
        self.client(endpoint)?.seal_status().await
    }

    async fn seal(&self, endpoint: &str) -> Result<()> {
        self.client(endpoint)?.seal().await
    }

    async fn unseal(&self, endpoint: &str, keys: &[String]) -> Result<SealState> {
        self.client(endpoint)?.unseal(keys).await
    }
}

/// Supplies unseal key shares on demand
pub trait KeyShareSource: Send {
    /// Produce exactly `threshold` key shares
    fn collect(&mut self, threshold: u32) -> Result<Vec<String>>;
}

/// Key shares known up front, e.g. from the command line
#[derive(Debug, Clone, Default)]
pub struct StaticKeyShares(pub Vec<String>);

impl KeyShareSource for StaticKeyShares {
    fn collect(&mut self, threshold: u32) -> Result<Vec<String>> {
        let wanted = threshold as usize;
        if self.0.len() < wanted {
            return Err(SafeError::usage(format!(
                "{} key shares required, {} given",
                wanted,
                self.0.len()
            )));
        }
        Ok(self.0.iter().take(wanted).cloned().collect())
    }
}
