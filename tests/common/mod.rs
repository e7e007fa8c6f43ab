//! Shared fixtures for integration tests
//!
//! - [`MemoryStore`]: an in-memory [`SecretStore`] with a call log and
//!   per-path failure injection
//! - [`FakeCluster`]: a simulated set of members behind DNS-style names

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use safe::cluster::{KeyShareSource, MemberControl, NameResolver};
use safe::config::CoordinatorSettings;
use safe::errors::{Result, SafeError};
use safe::vault::{SealState, Secret, SecretStore};

/// One recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Read(String),
    List(String),
    Write(String),
    Delete(String),
}

#[derive(Default)]
struct StoreState {
    secrets: BTreeMap<String, Secret>,
    calls: Vec<Call>,
    failing_writes: HashSet<String>,
    failing_deletes: HashSet<String>,
}

/// In-memory store answering listings the way the HTTP backend does
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed secrets without recording calls
    pub fn with_secrets(entries: &[(&str, &[(&str, &str)])]) -> Self {
        let store = Self::new();
        {
            let mut state = store.state.lock().unwrap();
            for (path, pairs) in entries {
                let secret: Secret = pairs.iter().map(|(k, v)| (*k, *v)).collect();
                state.secrets.insert(path.to_string(), secret);
            }
        }
        store
    }

    pub fn fail_write(&self, path: &str) {
        self.state.lock().unwrap().failing_writes.insert(path.to_string());
    }

    pub fn fail_delete(&self, path: &str) {
        self.state.lock().unwrap().failing_deletes.insert(path.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn writes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Write(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn get(&self, path: &str) -> Option<Secret> {
        self.state.lock().unwrap().secrets.get(path).cloned()
    }

    pub fn paths(&self) -> Vec<String> {
        self.state.lock().unwrap().secrets.keys().cloned().collect()
    }
}

fn injected_failure() -> SafeError {
    SafeError::api("500 Internal Server Error")
}

#[async_trait]
impl SecretStore for MemoryStore {
    async fn read(&self, path: &str) -> Result<Secret> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Read(path.to_string()));
        state.secrets.get(path).cloned().ok_or_else(|| SafeError::not_found(path))
    }

    async fn list(&self, path: &str) -> Result<Vec<String>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::List(path.to_string()));

        let prefix = format!("{}/", path.trim_end_matches('/'));
        let mut children = BTreeSet::new();
        for key in state.secrets.keys() {
            if let Some(rest) = key.strip_prefix(&prefix) {
                match rest.split_once('/') {
                    Some((namespace, _)) => children.insert(format!("{}/", namespace)),
                    None => children.insert(rest.to_string()),
                };
            }
        }

        if children.is_empty() {
            return if state.secrets.contains_key(path) {
                Ok(Vec::new())
            } else {
                Err(SafeError::not_found(path))
            };
        }
        Ok(children.into_iter().collect())
    }

    async fn write(&self, path: &str, secret: &Secret) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Write(path.to_string()));
        if state.failing_writes.contains(path) {
            return Err(injected_failure());
        }
        secret.to_json()?;
        state.secrets.insert(path.to_string(), secret.clone());
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Delete(path.to_string()));
        if state.failing_deletes.contains(path) {
            return Err(injected_failure());
        }
        state.secrets.remove(path);
        Ok(())
    }
}

pub const SERVICE: &str = "vault.service.test";
pub const ACTIVE: &str = "active.vault.service.test";
pub const BACKENDS: &str = "vaults.service.test";

/// Coordinator settings with millisecond timings
pub fn fast_settings() -> CoordinatorSettings {
    CoordinatorSettings {
        service_name: SERVICE.to_string(),
        active_name: ACTIVE.to_string(),
        backends_name: BACKENDS.to_string(),
        election_timeout: Duration::from_millis(200),
        handoff_timeout: Duration::from_millis(100),
        poll_interval: Duration::from_millis(5),
    }
}

#[derive(Debug, Clone)]
struct FakeMember {
    host: String,
    sealed: bool,
}

#[derive(Debug)]
struct ClusterState {
    members: Vec<FakeMember>,
    threshold: u32,
    keys: Vec<String>,
    /// Whether the active name is published at all
    elects_leader: bool,
    /// Whether seal calls take effect
    seal_takes_effect: bool,
    /// Service lookups time out once this many members were sealed
    service_stalls_after: Option<usize>,
    sealed_order: Vec<String>,
    unseal_calls: Vec<(String, Vec<String>)>,
}

/// Simulated cluster shared by [`FakeResolver`] and [`FakeMembers`].
///
/// The service name resolves to unsealed members, the active name to the
/// first unsealed member and the backends name to every member.
#[derive(Clone)]
pub struct FakeCluster {
    state: Arc<Mutex<ClusterState>>,
}

impl FakeCluster {
    /// Members by host with their initial sealed flag
    pub fn new(members: &[(&str, bool)]) -> Self {
        let members =
            members.iter().map(|(h, s)| FakeMember { host: h.to_string(), sealed: *s }).collect();
        Self {
            state: Arc::new(Mutex::new(ClusterState {
                members,
                threshold: 3,
                keys: vec!["k1".into(), "k2".into(), "k3".into()],
                elects_leader: true,
                seal_takes_effect: true,
                service_stalls_after: None,
                sealed_order: Vec::new(),
                unseal_calls: Vec::new(),
            })),
        }
    }

    pub fn without_leader(self) -> Self {
        self.state.lock().unwrap().elects_leader = false;
        self
    }

    pub fn ignoring_seals(self) -> Self {
        self.state.lock().unwrap().seal_takes_effect = false;
        self
    }

    pub fn stalling_service_after(self, seals: usize) -> Self {
        self.state.lock().unwrap().service_stalls_after = Some(seals);
        self
    }

    pub fn resolver(&self) -> FakeResolver {
        FakeResolver { cluster: self.clone() }
    }

    pub fn members(&self) -> FakeMembers {
        FakeMembers { cluster: self.clone() }
    }

    pub fn keys(&self) -> Vec<String> {
        self.state.lock().unwrap().keys.clone()
    }

    pub fn sealed_order(&self) -> Vec<String> {
        self.state.lock().unwrap().sealed_order.clone()
    }

    pub fn unseal_calls(&self) -> Vec<(String, Vec<String>)> {
        self.state.lock().unwrap().unseal_calls.clone()
    }

    pub fn is_sealed(&self, host: &str) -> bool {
        self.state.lock().unwrap().members.iter().any(|m| m.host == host && m.sealed)
    }

    pub fn endpoints(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .members
            .iter()
            .map(|m| format!("https://{}:8200", m.host))
            .collect()
    }
}

pub struct FakeResolver {
    cluster: FakeCluster,
}

#[async_trait]
impl NameResolver for FakeResolver {
    async fn lookup(&self, name: &str) -> Result<Vec<String>> {
        let state = self.cluster.state.lock().unwrap();
        if name == SERVICE
            && state.service_stalls_after.is_some_and(|n| state.sealed_order.len() >= n)
        {
            return Err(SafeError::resolve_timeout(name));
        }
        let unsealed = state.members.iter().filter(|m| !m.sealed).map(|m| m.host.clone());
        let records = match name {
            SERVICE => unsealed.collect(),
            ACTIVE if state.elects_leader => unsealed.take(1).collect(),
            BACKENDS => state.members.iter().map(|m| m.host.clone()).collect(),
            _ => Vec::new(),
        };
        Ok(records)
    }
}

pub struct FakeMembers {
    cluster: FakeCluster,
}

fn host_of(endpoint: &str) -> Result<String> {
    let url = url::Url::parse(endpoint).map_err(|e| SafeError::invalid_url(endpoint, e))?;
    Ok(url.host_str().unwrap_or_default().to_string())
}

#[async_trait]
impl MemberControl for FakeMembers {
    async fn seal_status(&self, endpoint: &str) -> Result<SealState> {
        let host = host_of(endpoint)?;
        let state = self.cluster.state.lock().unwrap();
        let member = state
            .members
            .iter()
            .find(|m| m.host == host)
            .ok_or_else(|| SafeError::api("503 Service Unavailable"))?;
        Ok(SealState { sealed: member.sealed, threshold: state.threshold, progress: 0 })
    }

    async fn seal(&self, endpoint: &str) -> Result<()> {
        let host = host_of(endpoint)?;
        let mut state = self.cluster.state.lock().unwrap();
        state.sealed_order.push(host.clone());
        if state.seal_takes_effect {
            if let Some(member) = state.members.iter_mut().find(|m| m.host == host) {
                member.sealed = true;
            }
        }
        Ok(())
    }

    async fn unseal(&self, endpoint: &str, keys: &[String]) -> Result<SealState> {
        let host = host_of(endpoint)?;
        let mut state = self.cluster.state.lock().unwrap();
        state.unseal_calls.push((host.clone(), keys.to_vec()));
        let accepted = keys == state.keys.as_slice();
        let threshold = state.threshold;
        let member = state
            .members
            .iter_mut()
            .find(|m| m.host == host)
            .ok_or_else(|| SafeError::api("503 Service Unavailable"))?;
        if accepted {
            member.sealed = false;
        }
        Ok(SealState { sealed: member.sealed, threshold, progress: 0 })
    }
}

/// Key shares from a fixed list, counting how often they were requested
pub struct CountingShares {
    pub keys: Vec<String>,
    pub requests: Vec<u32>,
}

impl CountingShares {
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys, requests: Vec::new() }
    }
}

impl KeyShareSource for CountingShares {
    fn collect(&mut self, threshold: u32) -> Result<Vec<String>> {
        self.requests.push(threshold);
        Ok(self.keys.iter().take(threshold as usize).cloned().collect())
    }
}
