use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use wicket_bus::{DeviceResponse, MessageBus, ResponsePublisher};
use wicket_ledger::RecorderHandle;
use wicket_types::{AccessAttempt, VerificationResult};
use wicket_verify::{ArtifactStore, ArtifactWaiter, BiometricMatcher, VerificationClient, WaitOutcome};

use crate::attempt::{AttemptReport, AttemptState};
use crate::config::OrchestratorConfig;
use crate::decision;
use crate::error::OrchestratorError;
use crate::parser::parse_event;

/// The access decision orchestrator.
///
/// An explicitly constructed context wiring the waiter, verification
/// client, ledger recorder, and response publisher. One instance serves
/// all devices; each inbound event runs through [`Orchestrator::handle_event`]
/// in its own task.
pub struct Orchestrator {
    config: OrchestratorConfig,
    bus: Arc<dyn MessageBus>,
    waiter: ArtifactWaiter,
    verifier: VerificationClient,
    recorder: RecorderHandle,
    publisher: ResponsePublisher,
}

impl Orchestrator {
    /// Wire an orchestrator from its collaborators.
    pub fn new(
        config: OrchestratorConfig,
        bus: Arc<dyn MessageBus>,
        artifacts: Arc<dyn ArtifactStore>,
        matcher: Arc<dyn BiometricMatcher>,
        recorder: RecorderHandle,
    ) -> Self {
        let waiter = ArtifactWaiter::new(artifacts, config.wait_policy());
        let verifier = VerificationClient::with_threshold(matcher, config.match_threshold);
        let publisher = ResponsePublisher::new(bus.clone(), config.event_topic.clone());
        Self {
            config,
            bus,
            waiter,
            verifier,
            recorder,
            publisher,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run one raw inbound payload through the full pipeline.
    ///
    /// Every well-formed payload produces exactly one ledger submission
    /// and exactly one device response, even when verification or the
    /// ledger fails. Malformed payloads produce neither.
    pub async fn handle_event(&self, payload: &[u8]) -> AttemptReport {
        let started = Instant::now();

        let attempt = match parse_event(payload) {
            Ok(attempt) => attempt,
            Err(error) => {
                if self.config.log_malformed {
                    warn!(error = %error, "discarding malformed device event");
                }
                return AttemptReport::malformed(error, started.elapsed());
            }
        };
        debug!(attempt = %attempt.id, device = %attempt.device, "attempt received");

        // Credential absent: deny without consulting artifact or matcher.
        let verification = if attempt.credential_present {
            Some(self.verify_attempt(&attempt).await)
        } else {
            debug!(attempt = %attempt.id, "no credential; short-circuiting to deny");
            None
        };

        let record = decision::record_for(&attempt, verification.as_ref());
        debug!(
            attempt = %attempt.id,
            subject = %record.subject,
            granted = record.access_granted,
            "decision reached"
        );

        let (state, entry, error) = match self.recorder.submit(record.clone()).await {
            Ok(entry) => (AttemptState::Logged, Some(entry), None),
            Err(e) => {
                warn!(attempt = %attempt.id, error = %e, "decision could not be recorded");
                (AttemptState::Failed, None, Some(OrchestratorError::from(e)))
            }
        };

        // The device is always told the outcome, failure-annotated when
        // the ledger write did not complete (empty receipt).
        let response = DeviceResponse {
            access_granted: record.access_granted,
            subject_id: record.subject.clone(),
            similarity: verification.as_ref().map(|v| v.similarity).unwrap_or(0.0),
            credential_present: attempt.credential_present,
            verification_matched: record.verification_matched,
            ledger_receipt: entry
                .as_ref()
                .map(|e| e.receipt.to_hex())
                .unwrap_or_default(),
            decided_at: record.decided_at,
        };
        self.publisher.publish(&attempt.device, &response).await;

        let state = if state == AttemptState::Logged {
            AttemptState::Responded
        } else {
            state
        };

        info!(
            attempt = %attempt.id,
            device = %attempt.device,
            state = %state,
            granted = record.access_granted,
            seq = entry.as_ref().map(|e| e.seq),
            "attempt finished"
        );

        AttemptReport {
            attempt_id: Some(attempt.id.clone()),
            device: Some(attempt.device.clone()),
            state,
            entry,
            error,
            elapsed: started.elapsed(),
        }
    }

    /// Artifact wait plus matcher call; never fails, only degrades.
    async fn verify_attempt(&self, attempt: &AccessAttempt) -> VerificationResult {
        let Some(artifact) = &attempt.artifact else {
            // Credential present but no capture reference: nothing will
            // ever arrive, so treat it as a wait that found nothing.
            debug!(attempt = %attempt.id, "no artifact reference on event");
            return VerificationResult::artifact_timeout();
        };

        match self.waiter.wait_for(artifact).await {
            WaitOutcome::Found(artifact) => self.verifier.verify(&artifact).await,
            WaitOutcome::TimedOut => VerificationResult::artifact_timeout(),
        }
    }

    /// Start the consume loop: subscribe to the event topic and dispatch
    /// each inbound message to an independently scheduled task.
    ///
    /// The subscription is taken before the loop task starts, so events
    /// published immediately after this returns are not lost.
    pub fn spawn(self: Arc<Self>) -> OrchestratorHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let mut events = self.bus.subscribe(&self.config.event_topic);
        let task = tokio::spawn(async move {
            info!(topic = %self.config.event_topic, "orchestrator consuming");

            loop {
                tokio::select! {
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    message = events.recv() => match message {
                        Ok(message) => {
                            let orchestrator = Arc::clone(&self);
                            tokio::spawn(async move {
                                orchestrator.handle_event(&message.payload).await;
                            });
                        }
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            warn!(missed, "event stream lagged; attempts dropped");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }

            info!("orchestrator stopped");
        });

        OrchestratorHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Handle to a running orchestrator consume loop.
pub struct OrchestratorHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl OrchestratorHandle {
    /// Signal shutdown and wait for the loop to stop.
    ///
    /// In-flight attempt tasks run to completion; only the intake of new
    /// events stops.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}
