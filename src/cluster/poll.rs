//! Bounded polling for pointer changes.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::resolver::NameResolver;
use crate::errors::{Result, SafeError};

/// Whether `current` counts as a change away from `previous`.
///
/// An empty baseline is satisfied by the first non-empty value; otherwise
/// any different value counts, including the record disappearing.
pub fn has_changed(previous: &str, current: &str) -> bool {
    if previous.is_empty() {
        !current.is_empty()
    } else {
        current != previous
    }
}

/// Poll `name` every `interval` until its pointer changes away from `previous`.
///
/// Returns the new value and `true` on change, or the last observed value
/// and `false` once `timeout` elapses. Resolver errors count as "not yet"
/// and polling continues. Cancelling `cancel` aborts with [`SafeError::Cancelled`].
pub async fn wait_for_change<R: NameResolver + ?Sized>(
    resolver: &R,
    name: &str,
    previous: &str,
    timeout: Duration,
    interval: Duration,
    cancel: &CancellationToken,
) -> Result<(String, bool)> {
    let deadline = Instant::now() + timeout;
    let mut last = previous.to_string();

    loop {
        if cancel.is_cancelled() {
            return Err(SafeError::Cancelled);
        }

        match resolver.pointer(name).await {
            Ok(current) if has_changed(previous, &current) => {
                debug!(name, previous, current = %current, "pointer changed");
                return Ok((current, true));
            }
            Ok(current) => {
                trace!(name, current = %current, "pointer unchanged");
                last = current;
            }
            Err(e) => debug!(name, error = %e, "lookup failed while polling"),
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok((last, false));
        }

        tokio::select! {
            _ = cancel.cancelled() => return Err(SafeError::Cancelled),
            _ = tokio::time::sleep(interval.min(deadline - now)) => {}
        }
    }
}
