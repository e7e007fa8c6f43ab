//! Secret access on top of Vault's flat key-value API.
//!
//! - [`transport`]: authenticated, redirect-following HTTP
//! - [`client`]: the REST surface as a [`SecretStore`]
//! - [`tree`]: hierarchy reconstruction from listings
//! - [`ops`]: recursive delete, move, copy, export and import

pub mod client;
pub mod ops;
pub mod secret;
pub mod store;
pub mod transport;
pub mod tree;

pub use client::{SealState, VaultClient};
pub use ops::{TreeOp, TreeOps};
pub use secret::{Secret, SecretPath};
pub use store::SecretStore;
pub use transport::{Transport, TransportResponse, MAX_REDIRECTS};
pub use tree::{Node, Paths, TreeBuilder, MAX_TREE_DEPTH};
