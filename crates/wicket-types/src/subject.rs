use std::fmt;

use serde::{Deserialize, Serialize};

/// The subject a verification resolved to, or a deny sentinel.
///
/// Sentinels carry the cause of a non-match so the decision record stays
/// auditable even when no subject could be identified.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SubjectId {
    /// A matched, enrolled subject.
    Known(String),
    /// Probe material did not match any enrolled subject.
    Unknown,
    /// The referenced artifact never became available.
    ArtifactTimeout,
    /// The remote matcher failed (transport or internal error).
    VerifierError,
    /// No credential was presented; verification was never attempted.
    NoCredential,
}

impl SubjectId {
    /// Wrap a matcher-reported subject identifier.
    pub fn known(id: impl Into<String>) -> Self {
        Self::Known(id.into())
    }

    /// Canonical string label, as recorded in the ledger and wire payloads.
    pub fn label(&self) -> String {
        match self {
            Self::Known(id) => format!("USER_{id}"),
            Self::Unknown => "UNKNOWN_SUBJECT".to_string(),
            Self::ArtifactTimeout => "ARTIFACT_TIMEOUT".to_string(),
            Self::VerifierError => "VERIFIER_ERROR".to_string(),
            Self::NoCredential => "NO_CREDENTIAL".to_string(),
        }
    }

    /// Parse a canonical label back into a `SubjectId`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "UNKNOWN_SUBJECT" => Self::Unknown,
            "ARTIFACT_TIMEOUT" => Self::ArtifactTimeout,
            "VERIFIER_ERROR" => Self::VerifierError,
            "NO_CREDENTIAL" => Self::NoCredential,
            other => match other.strip_prefix("USER_") {
                Some(id) => Self::Known(id.to_string()),
                None => Self::Known(other.to_string()),
            },
        }
    }

    /// Returns `true` if this is a matched, enrolled subject.
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for SubjectId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for SubjectId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}
