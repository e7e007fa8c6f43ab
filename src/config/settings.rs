//! # Configuration Settings
//!
//! Transport and cluster coordination settings, resolved from the environment.

use std::time::Duration;

use crate::errors::{Result, SafeError};

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for one backend transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the backend (e.g. "https://vault.example.com:8200")
    pub address: String,

    /// Bearer token sent as `X-Vault-Token`
    pub token: Option<String>,

    /// Host header override, used when talking to a member by address
    pub host_override: Option<String>,

    /// Disable TLS certificate verification
    pub skip_verify: bool,

    /// Dump every request and response to stderr
    pub trace: bool,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            token: None,
            host_override: None,
            skip_verify: false,
            trace: false,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Load transport settings from the process environment
    ///
    /// - `VAULT_ADDR`: backend address
    /// - `VAULT_TOKEN`: authentication token
    /// - `VAULT_HOSTNAME`: host header override
    /// - `VAULT_SKIP_VERIFY`: any non-empty value disables certificate checks
    /// - `DEBUG`: wire tracing toggle
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        Self {
            address: non_empty("VAULT_ADDR").unwrap_or_default(),
            token: non_empty("VAULT_TOKEN"),
            host_override: non_empty("VAULT_HOSTNAME"),
            skip_verify: non_empty("VAULT_SKIP_VERIFY").is_some(),
            trace: trace_enabled(lookup("DEBUG").as_deref()),
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Same credentials, pointed at a different member address
    pub fn with_address<S: Into<String>>(&self, address: S) -> Self {
        Self { address: address.into(), ..self.clone() }
    }

    /// Request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Interpret the `DEBUG` toggle: anything but empty, `false`, `0`, `no` or `off` enables tracing
pub fn trace_enabled(value: Option<&str>) -> bool {
    match value {
        None => false,
        Some(v) => {
            let v = v.trim().to_lowercase();
            !matches!(v.as_str(), "" | "false" | "0" | "no" | "off")
        }
    }
}

/// Name resolution and polling settings for the cluster coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorSettings {
    /// Service name that resolves while any member is unsealed
    pub service_name: String,

    /// Name pointing at the current active member
    pub active_name: String,

    /// Name listing every member, used for topology discovery
    pub backends_name: String,

    /// How long to wait for an active member to appear
    pub election_timeout: Duration,

    /// How long to wait for a new active member after sealing the current one
    pub handoff_timeout: Duration,

    /// Delay between name resolution attempts
    pub poll_interval: Duration,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            service_name: "vault.service.consul".to_string(),
            active_name: "active.vault.service.consul".to_string(),
            backends_name: "vaults.service.consul".to_string(),
            election_timeout: Duration::from_secs(300),
            handoff_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(1),
        }
    }
}

impl CoordinatorSettings {
    /// Load coordinator settings from the process environment
    ///
    /// Overrides: `SAFE_SERVICE_NAME`, `SAFE_ACTIVE_NAME`, `SAFE_BACKENDS_NAME`,
    /// `SAFE_ELECTION_TIMEOUT` (seconds), `SAFE_HANDOFF_TIMEOUT` (seconds),
    /// `SAFE_POLL_INTERVAL_MS` (milliseconds).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let number = |key: &str| -> Result<Option<u64>> {
            match lookup(key).filter(|v| !v.is_empty()) {
                None => Ok(None),
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map(Some)
                    .map_err(|e| SafeError::config(format!("invalid {}: {}", key, e))),
            }
        };

        let poll_interval = match number("SAFE_POLL_INTERVAL_MS")? {
            Some(0) => return Err(SafeError::config("SAFE_POLL_INTERVAL_MS must be positive")),
            Some(ms) => Duration::from_millis(ms),
            None => defaults.poll_interval,
        };

        Ok(Self {
            service_name: lookup("SAFE_SERVICE_NAME").unwrap_or(defaults.service_name),
            active_name: lookup("SAFE_ACTIVE_NAME").unwrap_or(defaults.active_name),
            backends_name: lookup("SAFE_BACKENDS_NAME").unwrap_or(defaults.backends_name),
            election_timeout: number("SAFE_ELECTION_TIMEOUT")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.election_timeout),
            handoff_timeout: number("SAFE_HANDOFF_TIMEOUT")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.handoff_timeout),
            poll_interval,
        })
    }
}
