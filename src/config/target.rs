//! Target file handling
//!
//! Reads the currently targeted backend from `~/.saferc` and resolves the
//! credentials and member addresses a command should use.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::settings::ClientConfig;
use crate::errors::{Result, SafeError};

/// One targeted backend as recorded in the target file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Endpoint URL of the backend (load balancer or any member)
    pub url: String,

    /// Authentication token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Last known active member host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<String>,

    /// Known member hosts from the last topology discovery
    #[serde(default)]
    pub backends: Vec<String>,
}

/// Address and credentials resolved for a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub address: String,
    pub token: Option<String>,
    pub host_override: Option<String>,
}

impl Target {
    /// Create a target for an endpoint URL
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self { url: url.into(), ..Default::default() }
    }

    /// Resolve where requests go and which host they claim to be for.
    ///
    /// When an active member is known, requests are sent straight to it
    /// and the endpoint's own host is carried as the host override.
    pub fn credentials(&self) -> Result<Credentials> {
        let mut credentials = Credentials {
            address: self.url.clone(),
            token: self.token.clone(),
            host_override: None,
        };

        if let Some(active) = self.active.as_deref().filter(|a| !a.is_empty()) {
            let url = Url::parse(&self.url).map_err(|e| SafeError::invalid_url(&self.url, e))?;
            credentials.host_override = url.host_str().map(|h| match url.port() {
                Some(port) => format!("{}:{}", h, port),
                None => h.to_string(),
            });
            credentials.address = swap_host(&self.url, active)?;
        }

        Ok(credentials)
    }

    /// Member endpoint URLs: each known backend host swapped into the target URL
    pub fn vault_endpoints(&self) -> Result<Vec<String>> {
        self.backends.iter().map(|backend| swap_host(&self.url, backend)).collect()
    }
}

/// Replace the host portion of `url`, keeping scheme, port and path
pub fn swap_host(url: &str, host: &str) -> Result<String> {
    let mut parsed = Url::parse(url).map_err(|e| SafeError::invalid_url(url, e))?;

    let host = host.trim();
    let host = if host.contains(':') && !host.starts_with('[') {
        format!("[{}]", host)
    } else {
        host.to_string()
    };
    parsed.set_host(Some(&host)).map_err(|e| SafeError::invalid_url(&host, e))?;

    let mut swapped = parsed.to_string();
    if parsed.path() == "/" && !url.ends_with('/') {
        swapped.pop();
    }
    Ok(swapped)
}

/// The `~/.saferc` document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetFile {
    #[serde(default)]
    pub version: String,

    /// Alias of the current target
    #[serde(default)]
    pub target: String,

    #[serde(default)]
    pub targets: BTreeMap<String, Target>,
}

impl TargetFile {
    /// Default location of the target file
    pub fn default_path() -> Result<PathBuf> {
        let home = home_dir()?;
        Ok(home.join(".saferc"))
    }

    /// Load the target file from its default location
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path()?)
    }

    /// Load the target file from a specific path; a missing file is an empty configuration
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no target file found");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// The currently targeted backend, if any
    pub fn current(&self) -> Result<Option<(&str, &Target)>> {
        if self.target.is_empty() {
            return Ok(None);
        }

        match self.targets.get(&self.target) {
            Some(target) => Ok(Some((self.target.as_str(), target))),
            None => Err(SafeError::config(format!(
                "current target vault '{}' not found in ~/.saferc",
                self.target
            ))),
        }
    }

    /// Combine the current target with environment settings.
    ///
    /// The target's address and token win over the environment; a missing
    /// token falls back to `VAULT_TOKEN`, then `~/.vault-token`.
    pub fn client_config(&self, env: ClientConfig) -> Result<ClientConfig> {
        let mut config = env;

        if let Some((alias, target)) = self.current()? {
            debug!(target = alias, url = %target.url, "using current target");
            let credentials = target.credentials()?;
            config.address = credentials.address;
            if credentials.token.is_some() {
                config.token = credentials.token;
            }
            if credentials.host_override.is_some() {
                config.host_override = credentials.host_override;
            }
        }

        if config.token.is_none() {
            config.token = read_token_file();
        }

        Ok(config)
    }
}

fn home_dir() -> Result<PathBuf> {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .map_err(|_| SafeError::config("unable to determine home directory"))
}

fn read_token_file() -> Option<String> {
    let path = home_dir().ok()?.join(".vault-token");
    let token = std::fs::read_to_string(path).ok()?;
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}
