use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use wicket_types::ArtifactRef;

use crate::error::MatcherError;

/// Raw identification result from the remote matcher.
///
/// `score` is on the matcher's native 0–1 scale; `subject` is `None` when
/// the probe resolved to no enrolled subject at all. Threshold policy is
/// applied by [`crate::VerificationClient`], not here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// The best-matching enrolled subject, if any.
    pub subject: Option<String>,
    /// Confidence score in 0..=1.
    pub score: f64,
}

impl MatchCandidate {
    /// A candidate naming a subject with the given confidence.
    pub fn subject(id: impl Into<String>, score: f64) -> Self {
        Self {
            subject: Some(id.into()),
            score,
        }
    }

    /// No enrolled subject resembled the probe.
    pub fn none(score: f64) -> Self {
        Self {
            subject: None,
            score,
        }
    }
}

/// Remote biometric matching capability.
///
/// Wicket consumes this as an external collaborator: submit probe or
/// reference material, receive an identification or enrollment outcome.
/// The matching algorithm itself is out of scope.
#[async_trait]
pub trait BiometricMatcher: Send + Sync {
    /// Compare the referenced probe against all enrolled references.
    async fn identify(&self, probe: &ArtifactRef) -> Result<MatchCandidate, MatcherError>;

    /// Enroll reference material, optionally under a subject hint.
    ///
    /// Returns `true` if the matcher accepted the reference.
    async fn enroll(&self, reference: &[u8], hint: Option<&str>) -> Result<bool, MatcherError>;
}
