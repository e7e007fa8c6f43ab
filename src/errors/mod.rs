//! # Error Handling
//!
//! Error types shared by the transport, tree operations and cluster coordinator.

pub mod types;

pub use types::{Result, SafeError};
