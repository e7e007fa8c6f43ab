//! # Configuration Management
//!
//! Transport settings come from the environment, coordinator settings from
//! `SAFE_*` overrides, and the current target from `~/.saferc`.

pub mod settings;
pub mod target;

pub use settings::{trace_enabled, ClientConfig, CoordinatorSettings};
pub use target::{swap_host, Credentials, Target, TargetFile};
