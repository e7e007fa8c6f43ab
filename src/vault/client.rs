//! Vault HTTP client
//!
//! Maps the backend's REST surface (`/v1/{path}`, `?list=1`, `sys/seal*`)
//! onto [`SecretStore`] and the seal management calls.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::secret::{Secret, SecretPath};
use super::store::SecretStore;
use super::transport::{Transport, TransportResponse};
use crate::config::ClientConfig;
use crate::errors::{Result, SafeError};

/// Seal status of one backend member
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealState {
    pub sealed: bool,

    /// Key shares required to unseal
    #[serde(rename = "t", default)]
    pub threshold: u32,

    /// Key shares accepted so far
    #[serde(default)]
    pub progress: u32,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    data: ListData,
}

#[derive(Debug, Default, Deserialize)]
struct ListData {
    #[serde(default)]
    keys: Vec<String>,
}

/// Client for one Vault backend
#[derive(Debug, Clone)]
pub struct VaultClient {
    transport: Transport,
}

impl VaultClient {
    /// Create a client with its own transport
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self { transport: Transport::new(config)? })
    }

    /// Base address of the backend
    pub fn address(&self) -> &str {
        self.transport.address()
    }

    /// Raw request against an API path, returned without status interpretation
    pub async fn curl(
        &self,
        method: Method,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<TransportResponse> {
        self.transport.request(method, path, body).await
    }

    /// Query `sys/seal-status`
    pub async fn seal_status(&self) -> Result<SealState> {
        let response = self.transport.request(Method::GET, "sys/seal-status", None).await?;
        let response = expect_success(response)?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// Seal this member
    pub async fn seal(&self) -> Result<()> {
        let response = self.transport.request(Method::PUT, "sys/seal", None).await?;
        expect_success(response).map(|_| ())
    }

    /// Reset any partial unseal progress, then submit key shares until unsealed
    pub async fn unseal(&self, keys: &[String]) -> Result<SealState> {
        let reset = serde_json::to_vec(&serde_json::json!({ "reset": true }))?;
        let response =
            self.transport.request(Method::PUT, "sys/unseal", Some(Bytes::from(reset))).await?;
        let mut state: SealState = serde_json::from_slice(&expect_success(response)?.body)?;

        for key in keys {
            if !state.sealed {
                break;
            }
            let body = serde_json::to_vec(&serde_json::json!({ "key": key }))?;
            let response =
                self.transport.request(Method::PUT, "sys/unseal", Some(Bytes::from(body))).await?;
            state = serde_json::from_slice(&expect_success(response)?.body)?;
            debug!(
                address = self.address(),
                progress = state.progress,
                threshold = state.threshold,
                "submitted key share"
            );
        }

        Ok(state)
    }
}

#[async_trait]
impl SecretStore for VaultClient {
    async fn read(&self, path: &str) -> Result<Secret> {
        let selector = SecretPath::parse(path);
        let response = self.transport.request(Method::GET, selector.path, None).await?;

        match response.status {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Err(SafeError::not_found(selector.path)),
            _ => return Err(SafeError::api(response.status_text())),
        }

        let raw: Value = serde_json::from_slice(&response.body)?;
        match raw.get("data").and_then(Value::as_object) {
            Some(data) => Secret::from_data(data, selector.key),
            None => Err(SafeError::malformed(format!("no data object at '{}'", selector.path))),
        }
    }

    async fn list(&self, path: &str) -> Result<Vec<String>> {
        let response =
            self.transport.request(Method::GET, &format!("{}?list=1", path), None).await?;

        match response.status {
            StatusCode::OK => {
                let listing: ListResponse = serde_json::from_slice(&response.body)?;
                Ok(listing.data.keys)
            }
            StatusCode::NOT_FOUND => {
                // Not a namespace; tell an absent path from a leaf secret
                let response = self.transport.request(Method::GET, path, None).await?;
                match response.status {
                    StatusCode::OK => Ok(Vec::new()),
                    StatusCode::NOT_FOUND => Err(SafeError::not_found(path)),
                    _ => Err(SafeError::api(response.status_text())),
                }
            }
            _ => Err(SafeError::api(response.status_text())),
        }
    }

    async fn write(&self, path: &str, secret: &Secret) -> Result<()> {
        let body = secret.to_json()?;
        let response = self.transport.request(Method::POST, path, Some(Bytes::from(body))).await?;
        expect_success(response).map(|_| ())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let response = self.transport.request(Method::DELETE, path, None).await?;
        expect_success(response).map(|_| ())
    }
}

fn expect_success(response: TransportResponse) -> Result<TransportResponse> {
    match response.status {
        StatusCode::OK | StatusCode::NO_CONTENT => Ok(response),
        _ => Err(SafeError::api(response.status_text())),
    }
}
