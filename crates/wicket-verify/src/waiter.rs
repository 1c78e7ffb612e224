use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace};

use wicket_types::ArtifactRef;

/// Artifact availability collaborator.
///
/// The capture pipeline delivers artifacts out of band; this seam only
/// answers whether a referenced artifact has arrived yet.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Returns `true` once the referenced artifact is available.
    async fn available(&self, artifact: &ArtifactRef) -> bool;
}

/// Bounded-retry policy for artifact waits.
#[derive(Clone, Copy, Debug)]
pub struct WaitPolicy {
    /// Maximum total time to wait for the artifact.
    pub max_wait: Duration,
    /// Interval between availability checks.
    pub poll_interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_secs(20),
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// Result of waiting for an artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The artifact arrived within the bounded wait.
    Found(ArtifactRef),
    /// The artifact never appeared; the attempt proceeds as a non-match.
    TimedOut,
}

impl WaitOutcome {
    /// Returns `true` if the artifact was located.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Polls an [`ArtifactStore`] until a referenced artifact appears or the
/// policy's deadline elapses.
///
/// One final authoritative check runs after the deadline, so an artifact
/// landing exactly at the boundary is still accepted. The wait suspends
/// between polls (no thread blocking) and is cancelled by dropping the
/// future; cancellation has no side effects.
#[derive(Clone)]
pub struct ArtifactWaiter {
    store: Arc<dyn ArtifactStore>,
    policy: WaitPolicy,
}

impl ArtifactWaiter {
    /// Create a waiter over the given store and policy.
    pub fn new(store: Arc<dyn ArtifactStore>, policy: WaitPolicy) -> Self {
        Self { store, policy }
    }

    /// The active wait policy.
    pub fn policy(&self) -> &WaitPolicy {
        &self.policy
    }

    /// Wait for the artifact.
    pub async fn wait_for(&self, artifact: &ArtifactRef) -> WaitOutcome {
        let start = Instant::now();
        let deadline = start + self.policy.max_wait;

        loop {
            if self.store.available(artifact).await {
                debug!(%artifact, elapsed_ms = start.elapsed().as_millis() as u64, "artifact located");
                return WaitOutcome::Found(artifact.clone());
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            trace!(%artifact, "artifact not yet available");
            sleep_until(deadline.min(now + self.policy.poll_interval)).await;
        }

        // Final authoritative check: the artifact may have landed exactly
        // at the deadline boundary.
        if self.store.available(artifact).await {
            debug!(%artifact, "artifact located at deadline");
            return WaitOutcome::Found(artifact.clone());
        }

        debug!(%artifact, max_wait_ms = self.policy.max_wait.as_millis() as u64, "artifact wait timed out");
        WaitOutcome::TimedOut
    }
}

/// In-memory artifact store for tests and demos.
#[derive(Default)]
pub struct InMemoryArtifactStore {
    present: RwLock<HashSet<ArtifactRef>>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an artifact as available.
    pub fn insert(&self, artifact: ArtifactRef) {
        self.present
            .write()
            .expect("artifact store lock poisoned")
            .insert(artifact);
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn available(&self, artifact: &ArtifactRef) -> bool {
        self.present
            .read()
            .expect("artifact store lock poisoned")
            .contains(artifact)
    }
}
