use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wicket_types::SubjectId;

/// Inbound device event, as published by an edge device.
///
/// `deviceId` and `credentialPresent` are required; `artifactRef` may be
/// empty when the capture pipeline produced nothing, and `capturedAt` is
/// optional.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceEvent {
    /// Reporting device identifier.
    pub device_id: String,
    /// Whether the upstream reader presented and matched a credential.
    pub credential_present: bool,
    /// Reference to the captured probe material.
    #[serde(default)]
    pub artifact_ref: Option<String>,
    /// Device-side capture timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
}

/// Outbound decision notification, published to the device's response
/// topic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceResponse {
    /// The decision.
    pub access_granted: bool,
    /// Matched subject or deny sentinel label.
    pub subject_id: SubjectId,
    /// Similarity on the 0–100 scale.
    pub similarity: f64,
    /// Whether a credential was presented and matched.
    pub credential_present: bool,
    /// Whether biometric verification matched.
    pub verification_matched: bool,
    /// Hex receipt of the ledger write; empty when recording failed.
    pub ledger_receipt: String,
    /// When the decision was reached.
    pub decided_at: DateTime<Utc>,
}
