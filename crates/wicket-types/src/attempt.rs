use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::device::{ArtifactRef, DeviceId};

/// Unique identifier for one access attempt (UUID v7 for time-ordering).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttemptId(uuid::Uuid);

impl AttemptId {
    /// Generate a new time-ordered attempt id.
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }

    /// Short representation (first 8 characters).
    pub fn short_id(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for AttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttemptId({})", self.short_id())
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated, normalized inbound device event.
///
/// Created once on ingestion and owned by exactly one orchestrator
/// invocation for its lifetime. Never persisted on its own; only the
/// decision record derived from it reaches the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessAttempt {
    /// Attempt identifier, assigned at ingestion.
    pub id: AttemptId,
    /// The reporting device.
    pub device: DeviceId,
    /// Whether the upstream reader presented and matched a credential.
    pub credential_present: bool,
    /// Reference to the captured probe material, if the device sent one.
    pub artifact: Option<ArtifactRef>,
    /// When the event was received by the orchestrator.
    pub received_at: DateTime<Utc>,
}

impl AccessAttempt {
    /// Build a new attempt stamped with the current time.
    pub fn new(device: DeviceId, credential_present: bool, artifact: Option<ArtifactRef>) -> Self {
        Self {
            id: AttemptId::new(),
            device,
            credential_present,
            artifact,
            received_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempt_ids_are_unique() {
        assert_ne!(AttemptId::new(), AttemptId::new());
    }

    #[test]
    fn attempt_ids_are_time_ordered() {
        let a = AttemptId::new();
        // Ids within one millisecond only differ in random bits.
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = AttemptId::new();
        assert!(a < b);
    }

    #[test]
    fn attempt_construction() {
        let device = DeviceId::new("door-1").unwrap();
        let artifact = ArtifactRef::new("img42").unwrap();
        let attempt = AccessAttempt::new(device.clone(), true, Some(artifact));
        assert_eq!(attempt.device, device);
        assert!(attempt.credential_present);
        assert!(attempt.artifact.is_some());
    }

    #[test]
    fn serde_roundtrip() {
        let attempt = AccessAttempt::new(DeviceId::new("door-1").unwrap(), false, None);
        let json = serde_json::to_string(&attempt).unwrap();
        let parsed: AccessAttempt = serde_json::from_str(&json).unwrap();
        assert_eq!(attempt, parsed);
    }
}
