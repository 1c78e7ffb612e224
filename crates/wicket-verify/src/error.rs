use thiserror::Error;

/// Errors produced by the remote biometric matcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatcherError {
    #[error("matcher transport error: {0}")]
    Transport(String),

    #[error("matcher rejected the probe: {0}")]
    Remote(String),

    #[error("probe material is invalid: {0}")]
    InvalidProbe(String),
}
