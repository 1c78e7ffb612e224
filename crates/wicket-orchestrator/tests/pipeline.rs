//! End-to-end pipeline tests: parse → wait → verify → decide → record →
//! respond, over the in-memory collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, timeout};

use wicket_bus::{DeviceResponse, InMemoryBus, MessageBus, TopicStream};
use wicket_ledger::{
    InMemoryLedger, LedgerAppend, LedgerError, LedgerReader, LedgerRecorder, LogEntry,
    RecorderHandle, SignedSubmission, SigningKey,
};
use wicket_orchestrator::{AttemptState, Orchestrator, OrchestratorConfig};
use wicket_types::{ArtifactRef, SubjectId};
use wicket_verify::{BiometricMatcher, InMemoryArtifactStore, MatchCandidate, MatcherError};

/// Matcher double returning a scripted candidate and counting calls.
struct ScriptedMatcher {
    candidate: Mutex<Result<MatchCandidate, MatcherError>>,
    identify_calls: AtomicUsize,
}

impl ScriptedMatcher {
    fn returning(candidate: MatchCandidate) -> Arc<Self> {
        Arc::new(Self {
            candidate: Mutex::new(Ok(candidate)),
            identify_calls: AtomicUsize::new(0),
        })
    }

    fn failing(error: MatcherError) -> Arc<Self> {
        Arc::new(Self {
            candidate: Mutex::new(Err(error)),
            identify_calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.identify_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BiometricMatcher for ScriptedMatcher {
    async fn identify(&self, _probe: &ArtifactRef) -> Result<MatchCandidate, MatcherError> {
        self.identify_calls.fetch_add(1, Ordering::SeqCst);
        self.candidate.lock().unwrap().clone()
    }

    async fn enroll(&self, _reference: &[u8], _hint: Option<&str>) -> Result<bool, MatcherError> {
        Ok(true)
    }
}

struct Harness {
    bus: Arc<InMemoryBus>,
    artifacts: Arc<InMemoryArtifactStore>,
    ledger: Arc<InMemoryLedger>,
    matcher: Arc<ScriptedMatcher>,
    orchestrator: Arc<Orchestrator>,
}

fn harness_with_config(matcher: Arc<ScriptedMatcher>, config: OrchestratorConfig) -> Harness {
    let key = SigningKey::generate();
    let ledger = Arc::new(InMemoryLedger::new(&key.verifying_key()));
    let recorder = LedgerRecorder::spawn(key, ledger.clone());
    harness_with_recorder(matcher, config, ledger, recorder)
}

fn harness_with_recorder(
    matcher: Arc<ScriptedMatcher>,
    config: OrchestratorConfig,
    ledger: Arc<InMemoryLedger>,
    recorder: RecorderHandle,
) -> Harness {
    let bus = Arc::new(InMemoryBus::default());
    let artifacts = Arc::new(InMemoryArtifactStore::new());
    let orchestrator = Arc::new(Orchestrator::new(
        config,
        bus.clone(),
        artifacts.clone(),
        matcher.clone(),
        recorder,
    ));
    Harness {
        bus,
        artifacts,
        ledger,
        matcher,
        orchestrator,
    }
}

fn harness(matcher: Arc<ScriptedMatcher>) -> Harness {
    harness_with_config(
        matcher,
        OrchestratorConfig {
            artifact_max_wait: Duration::from_millis(500),
            artifact_poll_interval: Duration::from_millis(100),
            ..Default::default()
        },
    )
}

fn event(device: &str, credential: bool, artifact: &str) -> Vec<u8> {
    format!(
        r#"{{"deviceId":"{device}","credentialPresent":{credential},"artifactRef":"{artifact}"}}"#
    )
    .into_bytes()
}

fn response_stream(harness: &Harness, device: &str) -> TopicStream {
    harness
        .bus
        .subscribe(&format!("access/attempt/response/{device}"))
}

fn decode(stream: &mut TopicStream) -> DeviceResponse {
    let msg = stream.try_recv().expect("expected a published response");
    serde_json::from_slice(&msg.payload).unwrap()
}

#[tokio::test(start_paused = true)]
async fn granted_end_to_end() {
    // Scenario: credential ok, artifact arrives at 100ms, matcher is
    // confident. Expect a granted, receipted decision.
    let h = harness(ScriptedMatcher::returning(MatchCandidate::subject("S7", 0.92)));
    let mut responses = response_stream(&h, "door-1");

    let artifacts = h.artifacts.clone();
    tokio::spawn(async move {
        sleep(Duration::from_millis(100)).await;
        artifacts.insert(ArtifactRef::new("img42").unwrap());
    });

    let report = h.orchestrator.handle_event(&event("door-1", true, "img42")).await;

    assert_eq!(report.state, AttemptState::Responded);
    let entry = report.entry.expect("decision must be recorded");
    assert_eq!(entry.record.subject, SubjectId::known("S7"));
    assert!(entry.record.access_granted);
    assert_eq!(entry.seq, 1);

    let response = decode(&mut responses);
    assert!(response.access_granted);
    assert_eq!(response.subject_id, SubjectId::known("S7"));
    assert!((response.similarity - 92.0).abs() < 1e-9);
    assert!(!response.ledger_receipt.is_empty());
}

#[tokio::test(start_paused = true)]
async fn unknown_subject_is_denied() {
    let h = harness(ScriptedMatcher::returning(MatchCandidate::none(0.10)));
    let mut responses = response_stream(&h, "door-1");
    h.artifacts.insert(ArtifactRef::new("img42").unwrap());

    let report = h.orchestrator.handle_event(&event("door-1", true, "img42")).await;

    let entry = report.entry.unwrap();
    assert!(!entry.record.access_granted);
    assert_eq!(entry.record.subject, SubjectId::Unknown);

    let response = decode(&mut responses);
    assert!(!response.access_granted);
    assert_eq!(response.subject_id, SubjectId::Unknown);
}

#[tokio::test]
async fn missing_credential_short_circuits_verification() {
    let h = harness(ScriptedMatcher::returning(MatchCandidate::subject("S7", 0.92)));
    let mut responses = response_stream(&h, "door-1");

    let report = h.orchestrator.handle_event(&event("door-1", false, "img42")).await;

    // No artifact wait, no matcher call.
    assert_eq!(h.matcher.calls(), 0);

    let entry = report.entry.unwrap();
    assert_eq!(entry.record.subject, SubjectId::NoCredential);
    assert!(!entry.record.access_granted);

    let response = decode(&mut responses);
    assert!(!response.access_granted);
    assert_eq!(response.subject_id, SubjectId::NoCredential);
    assert_eq!(response.similarity, 0.0);
}

#[tokio::test(start_paused = true)]
async fn artifact_timeout_still_produces_a_decision() {
    let h = harness(ScriptedMatcher::returning(MatchCandidate::subject("S7", 0.92)));
    let mut responses = response_stream(&h, "door-1");

    // Artifact never arrives.
    let report = h.orchestrator.handle_event(&event("door-1", true, "img42")).await;

    assert_eq!(h.matcher.calls(), 0);
    let entry = report.entry.unwrap();
    assert_eq!(entry.record.subject, SubjectId::ArtifactTimeout);
    assert!(!entry.record.access_granted);

    let response = decode(&mut responses);
    assert_eq!(response.subject_id, SubjectId::ArtifactTimeout);
}

#[tokio::test(start_paused = true)]
async fn artifact_at_deadline_boundary_is_accepted() {
    // maxWait 500ms, artifact appears at 499ms: the final authoritative
    // check must still locate it.
    let h = harness(ScriptedMatcher::returning(MatchCandidate::subject("S7", 0.92)));

    let artifacts = h.artifacts.clone();
    tokio::spawn(async move {
        sleep(Duration::from_millis(499)).await;
        artifacts.insert(ArtifactRef::new("img42").unwrap());
    });

    let report = h.orchestrator.handle_event(&event("door-1", true, "img42")).await;

    assert_eq!(h.matcher.calls(), 1);
    assert!(report.entry.unwrap().record.access_granted);
}

#[tokio::test(start_paused = true)]
async fn verifier_error_degrades_to_deny() {
    let h = harness(ScriptedMatcher::failing(MatcherError::Transport(
        "connection refused".into(),
    )));
    h.artifacts.insert(ArtifactRef::new("img42").unwrap());

    let report = h.orchestrator.handle_event(&event("door-1", true, "img42")).await;

    let entry = report.entry.unwrap();
    assert_eq!(entry.record.subject, SubjectId::VerifierError);
    assert!(!entry.record.access_granted);
    assert_eq!(report.state, AttemptState::Responded);
}

#[tokio::test]
async fn malformed_event_produces_no_entry_and_no_response() {
    let h = harness(ScriptedMatcher::returning(MatchCandidate::subject("S7", 0.92)));
    let mut responses = response_stream(&h, "door-1");

    let report = h.orchestrator.handle_event(b"{\"credentialPresent\":true}").await;

    assert_eq!(report.state, AttemptState::Failed);
    assert!(report.entry.is_none());
    assert!(h.ledger.read_all().await.unwrap().is_empty());
    assert!(responses.try_recv().is_err());
}

#[tokio::test]
async fn exactly_one_entry_and_one_response_per_attempt() {
    let h = harness(ScriptedMatcher::returning(MatchCandidate::subject("S7", 0.92)));
    let mut responses = response_stream(&h, "door-1");
    h.artifacts.insert(ArtifactRef::new("img42").unwrap());

    h.orchestrator.handle_event(&event("door-1", true, "img42")).await;

    assert_eq!(h.ledger.read_all().await.unwrap().len(), 1);
    decode(&mut responses);
    assert!(responses.try_recv().is_err(), "exactly one response expected");
}

#[tokio::test]
async fn concurrent_attempts_get_distinct_increasing_sequences() {
    let h = harness(ScriptedMatcher::returning(MatchCandidate::subject("S7", 0.80)));

    const DEVICES: usize = 12;
    for i in 0..DEVICES {
        h.artifacts.insert(ArtifactRef::new(format!("img-{i}")).unwrap());
    }

    let mut tasks = Vec::new();
    for i in 0..DEVICES {
        let orchestrator = h.orchestrator.clone();
        tasks.push(tokio::spawn(async move {
            orchestrator
                .handle_event(&event(&format!("door-{i}"), true, &format!("img-{i}")))
                .await
        }));
    }
    for task in tasks {
        let report = task.await.unwrap();
        assert_eq!(report.state, AttemptState::Responded);
    }

    let entries = h.ledger.read_all().await.unwrap();
    assert_eq!(entries.len(), DEVICES);
    let seqs: Vec<u64> = entries.iter().map(|e| e.seq).collect();
    assert_eq!(seqs, (1..=DEVICES as u64).collect::<Vec<_>>());
    h.ledger.validate_stream().unwrap();

    // Append order is stable across reads.
    assert_eq!(h.ledger.read_all().await.unwrap(), entries);
}

/// Ledger double that rejects every submission.
struct RejectingLedger;

#[async_trait]
impl LedgerAppend for RejectingLedger {
    async fn append(&self, _submission: &SignedSubmission) -> Result<LogEntry, LedgerError> {
        Err(LedgerError::Rejected("authorization failure".into()))
    }
}

#[tokio::test]
async fn ledger_rejection_still_notifies_the_device() {
    let key = SigningKey::generate();
    let verifying = key.verifying_key();
    let recorder = LedgerRecorder::spawn(key, Arc::new(RejectingLedger));
    let h = harness_with_recorder(
        ScriptedMatcher::returning(MatchCandidate::subject("S7", 0.92)),
        OrchestratorConfig {
            artifact_max_wait: Duration::from_millis(100),
            artifact_poll_interval: Duration::from_millis(20),
            ..Default::default()
        },
        Arc::new(InMemoryLedger::new(&verifying)),
        recorder,
    );
    let mut responses = response_stream(&h, "door-1");
    h.artifacts.insert(ArtifactRef::new("img42").unwrap());

    let report = h.orchestrator.handle_event(&event("door-1", true, "img42")).await;

    assert_eq!(report.state, AttemptState::Failed);
    assert!(report.entry.is_none());
    assert!(report.error.is_some());

    // Failure-annotated response: decision present, receipt empty.
    let response = decode(&mut responses);
    assert!(response.access_granted);
    assert!(response.ledger_receipt.is_empty());
}

#[tokio::test]
async fn consume_loop_dispatches_bus_events() {
    let h = harness(ScriptedMatcher::returning(MatchCandidate::subject("S7", 0.92)));
    h.artifacts.insert(ArtifactRef::new("img42").unwrap());
    let mut responses = response_stream(&h, "door-1");

    let handle = h.orchestrator.clone().spawn();
    h.bus.publish("access/attempt", event("door-1", true, "img42")).await.unwrap();

    let msg = timeout(Duration::from_secs(5), responses.recv())
        .await
        .expect("response within deadline")
        .unwrap();
    let response: DeviceResponse = serde_json::from_slice(&msg.payload).unwrap();
    assert!(response.access_granted);

    handle.shutdown().await;
    assert_eq!(h.ledger.read_all().await.unwrap().len(), 1);
}
