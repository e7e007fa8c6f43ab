//! # safe
//!
//! A client-side engine that layers a hierarchical, cluster-aware secret
//! management surface on top of Vault's flat key-value HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! CLI → TreeOps → TreeBuilder → VaultClient → Transport → Vault
//!  ↓
//! ClusterCoordinator → NameResolver (DNS) + MemberControl (per-member VaultClient)
//! ```
//!
//! ## Core Components
//!
//! - **Transport**: authenticated HTTP with manual 307 redirect handling and
//!   replayable request bodies
//! - **TreeBuilder**: rebuilds the path hierarchy from recursive listings
//! - **TreeOps**: recursive delete, move and copy with abort-on-first-error
//! - **ClusterCoordinator**: DNS-driven seal loop and unseal fan-out
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use safe::{ClientConfig, Result, TreeOps, VaultClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = VaultClient::new(ClientConfig::from_env())?;
//!     let deleted = TreeOps::new(&client).delete_tree("secret/old").await?;
//!     println!("issued {} deletes", deleted);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod cluster;
pub mod config;
pub mod errors;
pub mod observability;
pub mod vault;

// Re-export commonly used types and traits
pub use cluster::{ClusterCoordinator, NameResolver, UnsealOutcome};
pub use config::{ClientConfig, CoordinatorSettings, Target, TargetFile};
pub use errors::{Result, SafeError};
pub use vault::{Node, Secret, SecretStore, TreeBuilder, TreeOp, TreeOps, VaultClient};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
