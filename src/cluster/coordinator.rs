//! Cluster-wide seal, unseal and status.
//!
//! Sealing follows the active member as it moves: seal whichever member the
//! active name points at, wait for a stand-by to take over, and repeat until
//! the service name stops resolving (no unsealed member remains). Unsealing
//! walks the configured member endpoints and feeds the same key shares to
//! every member that reports itself sealed.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::members::{KeyShareSource, MemberControl};
use super::poll::wait_for_change;
use super::resolver::NameResolver;
use crate::config::{swap_host, CoordinatorSettings, Target};
use crate::errors::{Result, SafeError};
use crate::vault::SealState;

/// Result of [`ClusterCoordinator::unseal`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsealOutcome {
    /// No member was sealed; no key shares were requested
    AlreadyUnsealed,

    /// Endpoints that were sealed and received key shares
    Unsealed(Vec<String>),
}

/// Seal state of one member, or why it could not be queried
#[derive(Debug)]
pub struct MemberStatus {
    pub endpoint: String,
    pub state: Result<SealState>,
}

/// Backends and active member as seen through name resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    pub backends: Vec<String>,
    pub active: Option<String>,
}

impl Topology {
    /// Record the discovered topology on `target`.
    ///
    /// Returns `false` and leaves `target` untouched when no backends were found.
    pub fn apply(&self, target: &mut Target) -> bool {
        if self.backends.is_empty() {
            return false;
        }
        target.backends = self.backends.clone();
        target.active = self.active.clone();
        true
    }
}

pub struct ClusterCoordinator<R, M> {
    resolver: R,
    members: M,
    settings: CoordinatorSettings,
}

impl<R: NameResolver, M: MemberControl> ClusterCoordinator<R, M> {
    pub fn new(resolver: R, members: M, settings: CoordinatorSettings) -> Self {
        Self { resolver, members, settings }
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    /// Seal every member, one active member at a time.
    ///
    /// `endpoint_url` is the target URL; each active member's address is
    /// swapped into it to reach that member directly. Returns the sealed
    /// member addresses in order.
    pub async fn seal(&self, endpoint_url: &str, cancel: &CancellationToken) -> Result<Vec<String>> {
        let service = &self.settings.service_name;
        let active_name = &self.settings.active_name;
        let interval = self.settings.poll_interval;

        if !self.resolver.has_records(service).await? {
            return Err(SafeError::NoBackends);
        }

        let mut sealed = Vec::new();
        info!(service = %service, "sealing unsealed members");

        while self.resolver.has_records(service).await? {
            let (active, found) = wait_for_change(
                &self.resolver,
                active_name,
                "",
                self.settings.election_timeout,
                interval,
                cancel,
            )
            .await?;
            if !found {
                return Err(SafeError::active_node_timeout());
            }

            let member = swap_host(endpoint_url, &active)?;
            info!(member = %member, "sealing active member");
            self.members.seal(&member).await?;
            sealed.push(active.clone());

            let (next, changed) = wait_for_change(
                &self.resolver,
                active_name,
                &active,
                self.settings.handoff_timeout,
                interval,
                cancel,
            )
            .await?;
            if !changed {
                return Err(SafeError::new_active_node_timeout());
            }
            debug!(previous = %active, next = %next, "active member moved");
        }

        info!(count = sealed.len(), "all members sealed");
        Ok(sealed)
    }

    /// Unseal every sealed member among `endpoints`.
    ///
    /// Key shares are requested from `shares` at most once, for the
    /// threshold reported by the first sealed member, and reused for the rest.
    pub async fn unseal(
        &self,
        endpoints: &[String],
        shares: &mut dyn KeyShareSource,
    ) -> Result<UnsealOutcome> {
        if endpoints.is_empty() {
            return Err(SafeError::NoBackends);
        }

        let mut keys: Option<Vec<String>> = None;
        let mut unsealed = Vec::new();

        for endpoint in endpoints {
            let state = self.members.seal_status(endpoint).await?;
            if !state.sealed {
                debug!(endpoint = %endpoint, "already unsealed");
                continue;
            }

            if keys.is_none() {
                keys = Some(shares.collect(state.threshold)?);
            }
            let keys = keys.as_deref().unwrap_or_default();

            info!(endpoint = %endpoint, "unsealing");
            let after = self.members.unseal(endpoint, keys).await?;
            if after.sealed {
                warn!(
                    endpoint = %endpoint,
                    progress = after.progress,
                    threshold = after.threshold,
                    "member is still sealed after key submission"
                );
            }
            unsealed.push(endpoint.clone());
        }

        if unsealed.is_empty() {
            Ok(UnsealOutcome::AlreadyUnsealed)
        } else {
            Ok(UnsealOutcome::Unsealed(unsealed))
        }
    }

    /// Query each endpoint's seal state without stopping at failures
    pub async fn status(&self, endpoints: &[String]) -> Result<Vec<MemberStatus>> {
        if endpoints.is_empty() {
            return Err(SafeError::NoBackends);
        }

        let mut statuses = Vec::with_capacity(endpoints.len());
        for endpoint in endpoints {
            let state = self.members.seal_status(endpoint).await;
            if let Err(ref e) = state {
                debug!(endpoint = %endpoint, error = %e, "seal status failed");
            }
            statuses.push(MemberStatus { endpoint: endpoint.clone(), state });
        }
        Ok(statuses)
    }

    /// Resolve the backend list and the current active member
    pub async fn discover_topology(&self) -> Result<Topology> {
        let backends = self.resolver.lookup(&self.settings.backends_name).await?;
        let active = self.resolver.pointer(&self.settings.active_name).await?;
        Ok(Topology { backends, active: Some(active).filter(|a| !a.is_empty()) })
    }
}
