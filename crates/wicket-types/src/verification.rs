use serde::{Deserialize, Serialize};

use crate::subject::SubjectId;

/// Default similarity threshold (on the 0–100 scale) for a match.
pub const MATCH_THRESHOLD: f64 = 60.0;

/// Outcome of one biometric verification.
///
/// Produced exactly once per attempt and never mutated. Failure causes are
/// encoded as [`SubjectId`] sentinels so a deny decision is always
/// representable and auditable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Whether the probe matched an enrolled subject.
    pub matched: bool,
    /// The matched subject, or the sentinel naming the non-match cause.
    pub subject: SubjectId,
    /// Similarity on a 0–100 scale (0 when verification never ran).
    pub similarity: f64,
}

impl VerificationResult {
    /// A successful match against an enrolled subject.
    pub fn match_found(subject: impl Into<String>, similarity: f64) -> Self {
        Self {
            matched: true,
            subject: SubjectId::known(subject),
            similarity,
        }
    }

    /// Probe examined but below threshold or unrecognized.
    pub fn no_match(similarity: f64) -> Self {
        Self {
            matched: false,
            subject: SubjectId::Unknown,
            similarity,
        }
    }

    /// The referenced artifact never became available.
    pub fn artifact_timeout() -> Self {
        Self {
            matched: false,
            subject: SubjectId::ArtifactTimeout,
            similarity: 0.0,
        }
    }

    /// The remote matcher failed; treated as a non-match.
    pub fn verifier_error() -> Self {
        Self {
            matched: false,
            subject: SubjectId::VerifierError,
            similarity: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_found_is_known_subject() {
        let result = VerificationResult::match_found("S7", 92.0);
        assert!(result.matched);
        assert_eq!(result.subject, SubjectId::known("S7"));
        assert_eq!(result.similarity, 92.0);
    }

    #[test]
    fn failure_constructors_never_match() {
        for result in [
            VerificationResult::no_match(10.0),
            VerificationResult::artifact_timeout(),
            VerificationResult::verifier_error(),
        ] {
            assert!(!result.matched);
            assert!(!result.subject.is_known());
        }
    }

    #[test]
    fn error_results_have_zero_similarity() {
        assert_eq!(VerificationResult::artifact_timeout().similarity, 0.0);
        assert_eq!(VerificationResult::verifier_error().similarity, 0.0);
    }
}
