use thiserror::Error;

/// Errors produced by type construction and parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("device id must not be empty")]
    EmptyDeviceId,

    #[error("artifact reference must not be empty")]
    EmptyArtifactRef,
}
