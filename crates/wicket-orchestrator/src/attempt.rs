use std::fmt;
use std::time::Duration;

use wicket_ledger::LogEntry;
use wicket_types::{AttemptId, DeviceId};

use crate::error::OrchestratorError;

/// Stages of one attempt's lifecycle.
///
/// Within an attempt, transitions are strictly sequential:
/// `Received → CredentialChecked → (ArtifactAwaited → Verified) →
/// Decided → Logged → Responded`, with `Failed` as the terminal state for
/// malformed input or a rejected ledger submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttemptState {
    Received,
    CredentialChecked,
    ArtifactAwaited,
    Verified,
    Decided,
    Logged,
    Responded,
    Failed,
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Received => "received",
            Self::CredentialChecked => "credential_checked",
            Self::ArtifactAwaited => "artifact_awaited",
            Self::Verified => "verified",
            Self::Decided => "decided",
            Self::Logged => "logged",
            Self::Responded => "responded",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Structured outcome of one orchestrated attempt.
///
/// Produced for every inbound payload, well-formed or not, so callers and
/// tests observe results as values rather than log side effects.
#[derive(Debug)]
pub struct AttemptReport {
    /// Attempt id, absent when parsing failed.
    pub attempt_id: Option<AttemptId>,
    /// Reporting device, absent when parsing failed.
    pub device: Option<DeviceId>,
    /// Terminal state reached.
    pub state: AttemptState,
    /// The recorded ledger entry, when recording succeeded.
    pub entry: Option<LogEntry>,
    /// The failure, when the terminal state is `Failed`.
    pub error: Option<OrchestratorError>,
    /// Wall-clock time from ingestion to the terminal state.
    pub elapsed: Duration,
}

impl AttemptReport {
    /// Returns `true` if the attempt was decided, recorded, and responded.
    pub fn is_complete(&self) -> bool {
        self.state == AttemptState::Responded
    }

    /// A report for a payload that never parsed.
    pub fn malformed(error: OrchestratorError, elapsed: Duration) -> Self {
        Self {
            attempt_id: None,
            device: None,
            state: AttemptState::Failed,
            entry: None,
            error: Some(error),
            elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_display_names() {
        assert_eq!(AttemptState::ArtifactAwaited.to_string(), "artifact_awaited");
        assert_eq!(AttemptState::Responded.to_string(), "responded");
    }

    #[test]
    fn malformed_report_is_terminal_failure() {
        let report = AttemptReport::malformed(
            OrchestratorError::MalformedEvent("missing deviceId".into()),
            Duration::ZERO,
        );
        assert_eq!(report.state, AttemptState::Failed);
        assert!(!report.is_complete());
        assert!(report.entry.is_none());
        assert!(report.device.is_none());
    }
}
