//! Multi-member cluster coordination driven by DNS service records.

pub mod coordinator;
pub mod members;
pub mod poll;
pub mod resolver;

pub use coordinator::{ClusterCoordinator, MemberStatus, Topology, UnsealOutcome};
pub use members::{KeyShareSource, MemberControl, StaticKeyShares, VaultMembers};
pub use poll::{has_changed, wait_for_change};
pub use resolver::{NameResolver, SystemResolver};
