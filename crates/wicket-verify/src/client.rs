use std::sync::Arc;

use tracing::{debug, warn};

use wicket_types::{ArtifactRef, VerificationResult, MATCH_THRESHOLD};

use crate::matcher::BiometricMatcher;

/// Adapts the remote matcher into [`VerificationResult`]s.
///
/// Applies the similarity threshold (matcher scores are scaled from 0–1 to
/// 0–100) and absorbs remote failures: a transport or matcher error yields
/// a `VERIFIER_ERROR` non-match instead of propagating, so the attempt
/// still reaches a decision and an audit record.
#[derive(Clone)]
pub struct VerificationClient {
    matcher: Arc<dyn BiometricMatcher>,
    threshold: f64,
}

impl VerificationClient {
    /// Create a client with the default match threshold.
    pub fn new(matcher: Arc<dyn BiometricMatcher>) -> Self {
        Self::with_threshold(matcher, MATCH_THRESHOLD)
    }

    /// Create a client with an explicit threshold on the 0–100 scale.
    pub fn with_threshold(matcher: Arc<dyn BiometricMatcher>, threshold: f64) -> Self {
        Self { matcher, threshold }
    }

    /// The active match threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Verify the referenced probe. Never fails; failure modes become
    /// non-matching results.
    pub async fn verify(&self, probe: &ArtifactRef) -> VerificationResult {
        match self.matcher.identify(probe).await {
            Ok(candidate) => {
                let similarity = candidate.score * 100.0;
                match candidate.subject {
                    Some(subject) if similarity >= self.threshold => {
                        debug!(%probe, subject, similarity, "probe matched");
                        VerificationResult::match_found(subject, similarity)
                    }
                    _ => {
                        debug!(%probe, similarity, "probe did not match");
                        VerificationResult::no_match(similarity)
                    }
                }
            }
            Err(e) => {
                warn!(%probe, error = %e, "matcher call failed");
                VerificationResult::verifier_error()
            }
        }
    }

    /// Enroll reference material. Remote failures are absorbed into `false`.
    pub async fn register(&self, reference: &[u8], hint: Option<&str>) -> bool {
        match self.matcher.enroll(reference, hint).await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "enrollment failed");
                false
            }
        }
    }
}
