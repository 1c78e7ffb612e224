use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Json;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use wicket_ledger::{LedgerIdentity, LogEntry};
use wicket_types::SubjectId;

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Health check handler.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "name": "wicket-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// One decision log entry, shaped for the admin API.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntryView {
    pub seq: u64,
    pub subject_id: SubjectId,
    pub device_id: String,
    pub credential_matched: bool,
    pub verification_matched: bool,
    pub access_granted: bool,
    pub receipt: String,
    pub decided_at: DateTime<Utc>,
}

impl From<&LogEntry> for LogEntryView {
    fn from(entry: &LogEntry) -> Self {
        Self {
            seq: entry.seq,
            subject_id: entry.record.subject.clone(),
            device_id: entry.record.device.to_string(),
            credential_matched: entry.record.credential_matched,
            verification_matched: entry.record.verification_matched,
            access_granted: entry.record.access_granted,
            receipt: entry.receipt.to_hex(),
            decided_at: entry.record.decided_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogsResponse {
    pub logs: Vec<LogEntryView>,
}

/// Name of the header carrying the caller's claimed writer identity.
pub const IDENTITY_HEADER: &str = "x-wicket-identity";

/// List all decision records, newest first.
///
/// When anonymous reads are disabled, the caller must present the
/// authorized writer identity in the [`IDENTITY_HEADER`] header.
pub async fn logs_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ServerResult<Json<LogsResponse>> {
    if !state.allow_anonymous_read {
        let claimed = headers
            .get(IDENTITY_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|raw| LedgerIdentity::from_hex(raw).ok())
            .ok_or(ServerError::NotAuthorized)?;
        if claimed != state.ledger.authorized_identity() {
            return Err(ServerError::NotAuthorized);
        }
    }

    let mut entries = state.ledger.read_all().await?;
    entries.reverse();
    let logs = entries.iter().map(LogEntryView::from).collect();
    Ok(Json(LogsResponse { logs }))
}

/// Enrollment request: base64 reference material plus the caller's
/// claimed writer identity (hex).
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub reference_image: String,
    pub identity: String,
    #[serde(default)]
    pub subject_hint: Option<String>,
}

/// Enroll reference biometrics with the matcher.
///
/// Gated on the ledger's single authorized identity: only the operator
/// holding the signing key may register subjects.
pub async fn enroll_handler(
    State(state): State<AppState>,
    Json(request): Json<EnrollRequest>,
) -> ServerResult<Json<serde_json::Value>> {
    let claimed = LedgerIdentity::from_hex(&request.identity)
        .map_err(|e| ServerError::BadRequest(e.to_string()))?;
    if claimed != state.ledger.authorized_identity() {
        tracing::warn!(identity = %claimed, "enrollment refused for unauthorized identity");
        return Err(ServerError::NotAuthorized);
    }

    let reference = base64::engine::general_purpose::STANDARD
        .decode(request.reference_image.trim())
        .map_err(|e| ServerError::BadRequest(format!("reference image is not base64: {e}")))?;

    if state
        .verifier
        .register(&reference, request.subject_hint.as_deref())
        .await
    {
        Ok(Json(json!({ "success": true })))
    } else {
        Err(ServerError::EnrollmentRejected)
    }
}
