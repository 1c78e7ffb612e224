use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use colored::Colorize;
use tracing::info;

use wicket_bus::{response_topic, DeviceEvent, DeviceResponse, InMemoryBus, MessageBus};
use wicket_ledger::{
    InMemoryLedger, LedgerAppend, LedgerIdentity, LedgerReader, LedgerRecorder, SigningKey,
};
use wicket_orchestrator::{Orchestrator, OrchestratorConfig};
use wicket_server::{AdminServer, AppState, ServerConfig};
use wicket_types::{ArtifactRef, DeviceId};
use wicket_verify::{
    ArtifactStore, BiometricMatcher, InMemoryArtifactStore, MatchCandidate, MatcherError,
    VerificationClient,
};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => runtime()?.block_on(cmd_serve(args)),
        Command::Demo(args) => runtime()?.block_on(cmd_demo(args)),
        Command::Keygen(_) => cmd_keygen(),
    }
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Runtime::new()?)
}

/// Matcher backing `serve` and `demo`: an artifact reference of the form
/// `probe:<subject>` identifies `<subject>` with fixed high confidence,
/// anything else resolves to no enrolled subject. Real deployments replace
/// this with a remote matcher.
struct StubMatcher;

#[async_trait]
impl BiometricMatcher for StubMatcher {
    async fn identify(&self, probe: &ArtifactRef) -> Result<MatchCandidate, MatcherError> {
        match probe.as_str().strip_prefix("probe:") {
            Some(subject) => Ok(MatchCandidate::subject(subject, 0.92)),
            None => Ok(MatchCandidate::none(0.18)),
        }
    }

    async fn enroll(&self, _reference: &[u8], _hint: Option<&str>) -> Result<bool, MatcherError> {
        Ok(true)
    }
}

/// Fully wired in-memory stack shared by `serve` and `demo`.
struct Stack {
    topic: String,
    identity: LedgerIdentity,
    bus: Arc<InMemoryBus>,
    artifacts: Arc<InMemoryArtifactStore>,
    ledger: Arc<InMemoryLedger>,
    matcher: Arc<StubMatcher>,
    orchestrator: Arc<Orchestrator>,
}

fn build_stack(key: SigningKey, config: OrchestratorConfig) -> Stack {
    let topic = config.event_topic.clone();
    let identity = key.identity();
    let bus = Arc::new(InMemoryBus::default());
    let artifacts = Arc::new(InMemoryArtifactStore::new());
    let ledger = Arc::new(InMemoryLedger::new(&key.verifying_key()));
    let matcher = Arc::new(StubMatcher);
    let recorder = LedgerRecorder::spawn(key, ledger.clone() as Arc<dyn LedgerAppend>);
    let orchestrator = Arc::new(Orchestrator::new(
        config,
        bus.clone() as Arc<dyn MessageBus>,
        artifacts.clone() as Arc<dyn ArtifactStore>,
        matcher.clone() as Arc<dyn BiometricMatcher>,
        recorder,
    ));
    Stack {
        topic,
        identity,
        bus,
        artifacts,
        ledger,
        matcher,
        orchestrator,
    }
}

fn writer_key(seed: Option<&str>) -> anyhow::Result<SigningKey> {
    match seed {
        Some(seed) => {
            let bytes = hex::decode(seed)?;
            let seed: [u8; 32] = bytes
                .try_into()
                .map_err(|_| anyhow::anyhow!("writer key seed must be 32 bytes of hex"))?;
            Ok(SigningKey::from_bytes(seed))
        }
        None => {
            let key = SigningKey::generate();
            info!(identity = %key.identity(), "generated ephemeral writer key");
            Ok(key)
        }
    }
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut server_config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        server_config.bind_addr = bind;
    }

    let mut config = OrchestratorConfig::default();
    if let Some(topic) = args.topic {
        config.event_topic = topic;
    }

    let key = writer_key(args.writer_key.as_deref())?;
    let stack = build_stack(key, config);
    let handle = stack.orchestrator.clone().spawn();

    println!("{} wicket serving", "✓".green().bold());
    println!("  Event topic: {}", stack.topic.yellow());
    println!("  Writer:      {}", stack.identity.to_string().cyan());
    println!("  Admin API:   http://{}", server_config.bind_addr.to_string().bold());

    let mut state = AppState::new(
        stack.ledger.clone() as Arc<dyn LedgerReader>,
        VerificationClient::new(stack.matcher.clone() as Arc<dyn BiometricMatcher>),
    );
    if !server_config.allow_anonymous_read {
        state = state.with_gated_reads();
    }
    AdminServer::new(server_config, state).serve().await?;

    handle.shutdown().await;
    Ok(())
}

async fn cmd_demo(args: DemoArgs) -> anyhow::Result<()> {
    // Short wait bounds so the no-show capture times out quickly.
    let config = OrchestratorConfig {
        artifact_max_wait: Duration::from_millis(750),
        artifact_poll_interval: Duration::from_millis(50),
        ..Default::default()
    };
    let stack = build_stack(SigningKey::generate(), config);
    let handle = stack.orchestrator.clone().spawn();

    let devices = ["door-1", "door-2", "door-3", "door-4"];
    let mut streams = Vec::new();
    for device in devices {
        let id = DeviceId::new(device)?;
        streams.push((device, stack.bus.subscribe(&response_topic(&stack.topic, &id))));
    }

    println!("{}", "Publishing sample access attempts".bold());
    println!("  door-1: credential, capture matches an enrolled subject");
    println!("  door-2: credential, capture matches nobody");
    println!("  door-3: no credential presented");
    println!("  door-4: credential, capture never arrives");

    stack.artifacts.insert(ArtifactRef::new("probe:alice")?);
    stack.artifacts.insert(ArtifactRef::new("cap-7781")?);
    publish_event(&stack, "door-1", true, Some("probe:alice")).await?;
    publish_event(&stack, "door-2", true, Some("cap-7781")).await?;
    publish_event(&stack, "door-3", false, None).await?;
    publish_event(&stack, "door-4", true, Some("probe:ghost")).await?;

    println!("\n{}", "Device responses".bold());
    for (device, mut stream) in streams {
        let message = tokio::time::timeout(Duration::from_secs(5), stream.recv()).await??;
        if args.raw {
            println!("  {}: {}", device.bold(), String::from_utf8_lossy(&message.payload));
            continue;
        }
        let response: DeviceResponse = serde_json::from_slice(&message.payload)?;
        let verdict = if response.access_granted {
            "GRANT".green().bold()
        } else {
            "DENY ".red().bold()
        };
        println!(
            "  {} {} {:<18} similarity {:>5.1}",
            device.bold(),
            verdict,
            response.subject_id.label(),
            response.similarity,
        );
    }

    stack.ledger.validate_stream()?;
    let entries = stack.ledger.read_all().await?;
    println!("\n{}", "Decision ledger".bold());
    for entry in &entries {
        let verdict = if entry.record.access_granted {
            "GRANT".green()
        } else {
            "DENY ".red()
        };
        println!(
            "  #{:<3} {} {:<18} {:<8} {}",
            entry.seq,
            verdict,
            entry.record.subject.label(),
            entry.record.device.as_str(),
            entry.receipt.short_hex().dimmed(),
        );
    }
    println!(
        "\n{} chain verified: {} entries, writer {}",
        "✓".green().bold(),
        entries.len().to_string().bold(),
        stack.identity.to_string().cyan(),
    );

    handle.shutdown().await;
    Ok(())
}

async fn publish_event(
    stack: &Stack,
    device: &str,
    credential_present: bool,
    artifact: Option<&str>,
) -> anyhow::Result<()> {
    let event = DeviceEvent {
        device_id: device.to_string(),
        credential_present,
        artifact_ref: artifact.map(str::to_string),
        captured_at: Some(Utc::now()),
    };
    stack.bus.publish(&stack.topic, serde_json::to_vec(&event)?).await?;
    Ok(())
}

fn cmd_keygen() -> anyhow::Result<()> {
    let key = SigningKey::generate();
    println!("{} generated ledger writer key", "✓".green().bold());
    println!("  Seed:     {}", hex::encode(key.as_bytes()).yellow());
    println!("  Public:   {}", hex::encode(key.verifying_key().as_bytes()).cyan());
    println!("  Identity: {}", key.identity().to_hex().cyan());
    println!(
        "\nPass the seed to {} for a stable writer identity.",
        "wicket serve --writer-key <seed>".bold()
    );
    Ok(())
}
