use wicket_bus::DeviceEvent;
use wicket_types::{AccessAttempt, ArtifactRef, DeviceId};

use crate::error::OrchestratorError;

/// Validate and normalize a raw inbound payload into an [`AccessAttempt`].
///
/// Fails with [`OrchestratorError::MalformedEvent`] when required fields
/// are missing, of the wrong type, or empty. An empty artifact reference
/// is normalized to "no artifact"; the pipeline treats it as a capture
/// that never arrived.
pub fn parse_event(payload: &[u8]) -> Result<AccessAttempt, OrchestratorError> {
    let event: DeviceEvent = serde_json::from_slice(payload)
        .map_err(|e| OrchestratorError::MalformedEvent(e.to_string()))?;

    let device = DeviceId::new(event.device_id)
        .map_err(|e| OrchestratorError::MalformedEvent(e.to_string()))?;

    let artifact = event
        .artifact_ref
        .and_then(|raw| ArtifactRef::new(raw).ok());

    Ok(AccessAttempt::new(device, event.credential_present, artifact))
}
