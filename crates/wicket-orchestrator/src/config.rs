use std::time::Duration;

use serde::{Deserialize, Serialize};

use wicket_bus::DEFAULT_EVENT_TOPIC;
use wicket_types::MATCH_THRESHOLD;
use wicket_verify::WaitPolicy;

/// Configuration for the access decision orchestrator.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Topic devices publish access attempts to. Response topics are
    /// derived from it per device.
    pub event_topic: String,
    /// Maximum total time to wait for a capture artifact.
    pub artifact_max_wait: Duration,
    /// Interval between artifact availability checks.
    pub artifact_poll_interval: Duration,
    /// Similarity threshold for a biometric match (0–100 scale).
    pub match_threshold: f64,
    /// Whether malformed inbound events are logged. They never produce a
    /// ledger entry or a device response either way.
    pub log_malformed: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            event_topic: DEFAULT_EVENT_TOPIC.to_string(),
            artifact_max_wait: Duration::from_secs(20),
            artifact_poll_interval: Duration::from_millis(500),
            match_threshold: MATCH_THRESHOLD,
            log_malformed: true,
        }
    }
}

impl OrchestratorConfig {
    /// The artifact wait policy implied by this configuration.
    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy {
            max_wait: self.artifact_max_wait,
            poll_interval: self.artifact_poll_interval,
        }
    }
}
