//! Backend-agnostic secret storage primitives.

use async_trait::async_trait;

use super::secret::Secret;
use crate::errors::Result;

/// The four primitives tree building and tree operations are built on.
///
/// Implementations report absence as [`SafeError::NotFound`](crate::SafeError::NotFound).
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Read the secret at `path`; a trailing `:key` narrows it to one key
    async fn read(&self, path: &str) -> Result<Secret>;

    /// Names directly below `path`; names ending in `/` are sub-namespaces.
    /// A path that exists only as a leaf has no children.
    async fn list(&self, path: &str) -> Result<Vec<String>>;

    /// Replace the secret at `path`; empty secrets are refused
    async fn write(&self, path: &str, secret: &Secret) -> Result<()>;

    /// Remove the secret at `path`
    async fn delete(&self, path: &str) -> Result<()>;
}
