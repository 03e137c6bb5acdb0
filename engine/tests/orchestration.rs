//! End-to-end tests for the ordered-attempt orchestration loop

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type CallLog = Arc<Mutex<Vec<String>>>;

use async_trait::async_trait;

use engine::services::adapters::RealAdapterDispatch;
use engine::services::health::HealthTracker;
use engine::traits::{AdapterDispatch, MockConfigStore};
use engine::{Engine, EngineSettings};
use shared::{
    AdminConfig, AdminProviderEntry, AttemptFailure, AttemptStatus, CancelFlag,
    GenerationOutcome, GenerationRequest, ImageData, ProviderDescriptor, ProviderFamily,
    ProviderOrigin, RenderParams, TerminalFailure, ENVIRONMENT_PRIORITY,
};

/// Deterministic stand-in for the adapter layer: scripted outcome per
/// provider id, optional artificial latency, optional cancel trigger.
struct ScriptedDispatch {
    outcomes: HashMap<String, Result<ImageData, AttemptFailure>>,
    delays: HashMap<String, Duration>,
    cancel_after: Option<(String, CancelFlag)>,
    calls: CallLog,
}

impl ScriptedDispatch {
    fn new() -> Self {
        Self {
            outcomes: HashMap::new(),
            delays: HashMap::new(),
            cancel_after: None,
            calls: CallLog::default(),
        }
    }

    fn succeed(mut self, id: &str) -> Self {
        self.outcomes.insert(id.to_string(), Ok(png()));
        self
    }

    fn fail(mut self, id: &str, failure: AttemptFailure) -> Self {
        self.outcomes.insert(id.to_string(), Err(failure));
        self
    }

    fn delay(mut self, id: &str, delay: Duration) -> Self {
        self.delays.insert(id.to_string(), delay);
        self
    }

    fn cancel_after(mut self, id: &str, flag: CancelFlag) -> Self {
        self.cancel_after = Some((id.to_string(), flag));
        self
    }

    /// Handle onto the attempt log, usable after the dispatch moves
    /// into an engine.
    fn call_log(&self) -> CallLog {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl AdapterDispatch for ScriptedDispatch {
    async fn generate(
        &self,
        descriptor: &ProviderDescriptor,
        _prompt: &str,
        _params: &RenderParams,
    ) -> Result<ImageData, AttemptFailure> {
        self.calls.lock().unwrap().push(descriptor.id.clone());

        if let Some(delay) = self.delays.get(&descriptor.id) {
            tokio::time::sleep(*delay).await;
        }
        if let Some((id, flag)) = &self.cancel_after {
            if id == &descriptor.id {
                flag.cancel();
            }
        }

        self.outcomes
            .get(&descriptor.id)
            .cloned()
            .unwrap_or_else(|| {
                Err(AttemptFailure::Transport {
                    message: "unscripted provider".to_string(),
                })
            })
    }
}

fn png() -> ImageData {
    ImageData {
        format: "png".to_string(),
        bytes: b"\x89PNG".to_vec(),
    }
}

fn transport(message: &str) -> AttemptFailure {
    AttemptFailure::Transport {
        message: message.to_string(),
    }
}

fn admin_entry(name: &str, priority: u8) -> AdminProviderEntry {
    AdminProviderEntry {
        name: name.to_string(),
        family: ProviderFamily::StableDiffusion,
        enabled: true,
        credential: "token".to_string(),
        endpoint: Some("http://127.0.0.1:7860".to_string()),
        model: Some("sd_xl".to_string()),
        priority,
    }
}

fn env_descriptor() -> ProviderDescriptor {
    ProviderDescriptor {
        id: "env-openai".to_string(),
        display_name: "OpenAI (environment)".to_string(),
        family: ProviderFamily::OpenAi,
        origin: ProviderOrigin::Environment,
        credential: "sk-env".to_string(),
        endpoint: "https://api.openai.com/v1".to_string(),
        model: "dall-e-3".to_string(),
        enabled: true,
        priority: ENVIRONMENT_PRIORITY,
    }
}

fn config_store_with(entries: Vec<AdminProviderEntry>) -> MockConfigStore {
    let mut store = MockConfigStore::new();
    let config = AdminConfig { providers: entries };
    store
        .expect_load()
        .returning(move || Ok(Some(config.clone())));
    store
}

fn empty_config_store() -> MockConfigStore {
    let mut store = MockConfigStore::new();
    store.expect_load().returning(|| Ok(None));
    store
}

fn engine_with<D: AdapterDispatch>(
    env: Option<ProviderDescriptor>,
    store: MockConfigStore,
    dispatch: D,
) -> Engine<MockConfigStore, D> {
    Engine::new(
        env,
        store,
        dispatch,
        Arc::new(HealthTracker::new()),
        EngineSettings::default(),
    )
}

fn attempted(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

fn statuses(trace: &[shared::AttemptRecord]) -> Vec<(String, AttemptStatus)> {
    trace
        .iter()
        .map(|r| (r.provider_id.clone(), r.status))
        .collect()
}

#[tokio::test]
async fn first_success_wins_after_earlier_failures() {
    let dispatch = ScriptedDispatch::new()
        .fail("admin-a", transport("connection refused"))
        .fail("admin-b", transport("connection refused"))
        .succeed("admin-c");
    let calls = dispatch.call_log();
    let engine = engine_with(
        None,
        config_store_with(vec![
            admin_entry("a", 1),
            admin_entry("b", 2),
            admin_entry("c", 3),
            admin_entry("d", 4),
        ]),
        dispatch,
    );

    let outcome = engine
        .generate(&GenerationRequest::new("a castle"), &CancelFlag::new())
        .await
        .unwrap();

    match outcome {
        GenerationOutcome::Success {
            provider_id, trace, ..
        } => {
            assert_eq!(provider_id, "admin-c");
            assert_eq!(
                statuses(&trace),
                vec![
                    ("admin-a".to_string(), AttemptStatus::Failed),
                    ("admin-b".to_string(), AttemptStatus::Failed),
                    ("admin-c".to_string(), AttemptStatus::Success),
                ]
            );
        }
        other => panic!("expected success, got {other:?}"),
    }

    // Nothing after the first success: "d" was never dispatched
    assert_eq!(attempted(&calls), vec!["admin-a", "admin-b", "admin-c"]);
}

#[tokio::test]
async fn exhaustion_reports_every_provider_in_order() {
    let dispatch = ScriptedDispatch::new()
        .fail("admin-alpha", transport("down"))
        .fail(
            "admin-beta",
            AttemptFailure::Auth {
                message: "HTTP 401: bad key".to_string(),
            },
        )
        .fail(
            "admin-gamma",
            AttemptFailure::ModelRefused {
                message: "no image in response".to_string(),
            },
        );
    let engine = engine_with(
        None,
        config_store_with(vec![
            admin_entry("alpha", 1),
            admin_entry("beta", 2),
            admin_entry("gamma", 3),
        ]),
        dispatch,
    );

    let outcome = engine
        .generate(&GenerationRequest::new("a castle"), &CancelFlag::new())
        .await
        .unwrap();

    match outcome {
        GenerationOutcome::Failure { failure, trace } => {
            assert_eq!(trace.len(), 3);
            assert!(trace.iter().all(|r| r.status == AttemptStatus::Failed));
            assert!(trace.iter().all(|r| r.error_summary.is_some()));
            match failure {
                TerminalFailure::AllProvidersExhausted { message } => {
                    for name in ["alpha", "beta", "gamma"] {
                        assert!(message.contains(name), "missing {name} in: {message}");
                    }
                }
                other => panic!("expected exhaustion, got {other:?}"),
            }
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn zero_providers_is_terminal_with_empty_trace() {
    let engine = engine_with(None, empty_config_store(), ScriptedDispatch::new());

    let outcome = engine
        .generate(&GenerationRequest::new("anything"), &CancelFlag::new())
        .await
        .unwrap();

    match outcome {
        GenerationOutcome::Failure { failure, trace } => {
            assert_eq!(failure, TerminalFailure::NoProvidersConfigured);
            assert!(trace.is_empty());
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn environment_provider_is_tried_first() {
    let dispatch = ScriptedDispatch::new()
        .fail("env-openai", transport("rate limited"))
        .succeed("admin-three");
    let calls = dispatch.call_log();
    let engine = engine_with(
        Some(env_descriptor()),
        config_store_with(vec![admin_entry("three", 3), admin_entry("five", 5)]),
        dispatch,
    );

    let outcome = engine
        .generate(&GenerationRequest::new("a castle"), &CancelFlag::new())
        .await
        .unwrap();

    match outcome {
        GenerationOutcome::Success {
            provider_id, trace, ..
        } => {
            assert_eq!(provider_id, "admin-three");
            assert_eq!(trace.len(), 2);
            assert_eq!(trace[0].provider_id, "env-openai");
        }
        other => panic!("expected success, got {other:?}"),
    }
    assert_eq!(attempted(&calls), vec!["env-openai", "admin-three"]);
}

#[tokio::test]
async fn excluded_providers_never_reach_the_trace() {
    let dispatch = ScriptedDispatch::new().succeed("admin-b");
    let calls = dispatch.call_log();
    let engine = engine_with(
        None,
        config_store_with(vec![admin_entry("a", 1), admin_entry("b", 2)]),
        dispatch,
    );

    let mut request = GenerationRequest::new("a castle");
    request.exclude_providers.insert("admin-a".to_string());

    let outcome = engine.generate(&request, &CancelFlag::new()).await.unwrap();

    assert!(outcome.is_success());
    assert!(outcome.trace().iter().all(|r| r.provider_id != "admin-a"));
    assert_eq!(attempted(&calls), vec!["admin-b"]);
}

#[tokio::test]
async fn cancellation_skips_remaining_candidates() {
    let cancel = CancelFlag::new();
    let dispatch = ScriptedDispatch::new()
        .fail("admin-a", transport("down"))
        .cancel_after("admin-a", cancel.clone());
    let engine = engine_with(
        None,
        config_store_with(vec![
            admin_entry("a", 1),
            admin_entry("b", 2),
            admin_entry("c", 3),
        ]),
        dispatch,
    );

    let outcome = engine
        .generate(&GenerationRequest::new("a castle"), &cancel)
        .await
        .unwrap();

    match outcome {
        GenerationOutcome::Failure { failure, trace } => {
            assert_eq!(failure, TerminalFailure::Cancelled);
            assert_eq!(
                statuses(&trace),
                vec![
                    ("admin-a".to_string(), AttemptStatus::Failed),
                    ("admin-b".to_string(), AttemptStatus::Skipped),
                    ("admin-c".to_string(), AttemptStatus::Skipped),
                ]
            );
        }
        other => panic!("expected cancellation, got {other:?}"),
    }

    // Untried candidates keep pristine health records
    let health = engine.health();
    assert_eq!(health.record("admin-a").await.consecutive_errors, 1);
    assert_eq!(health.record("admin-b").await.consecutive_errors, 0);
}

#[tokio::test]
async fn slow_attempts_time_out_and_fall_through() {
    let dispatch = ScriptedDispatch::new()
        .succeed("admin-slow")
        .delay("admin-slow", Duration::from_millis(300))
        .succeed("admin-fast");
    let engine = Engine::new(
        None,
        config_store_with(vec![admin_entry("slow", 1), admin_entry("fast", 2)]),
        dispatch,
        Arc::new(HealthTracker::new()),
        EngineSettings {
            attempt_timeout: Duration::from_millis(50),
        },
    );

    let outcome = engine
        .generate(&GenerationRequest::new("a castle"), &CancelFlag::new())
        .await
        .unwrap();

    match outcome {
        GenerationOutcome::Success {
            provider_id, trace, ..
        } => {
            assert_eq!(provider_id, "admin-fast");
            assert_eq!(trace[0].status, AttemptStatus::Failed);
            let summary = trace[0].error_summary.as_deref().unwrap();
            assert!(summary.contains("timed out"), "got: {summary}");
        }
        other => panic!("expected success via fallback, got {other:?}"),
    }

    // The timeout counted against the slow provider's health
    assert_eq!(
        engine.health().record("admin-slow").await.consecutive_errors,
        1
    );
}

#[tokio::test]
async fn three_failures_trip_the_breaker_until_reset() {
    let dispatch = ScriptedDispatch::new().fail("admin-only", transport("down"));
    let engine = engine_with(
        None,
        config_store_with(vec![admin_entry("only", 1)]),
        dispatch,
    );
    let request = GenerationRequest::new("a castle");

    for _ in 0..3 {
        let outcome = engine.generate(&request, &CancelFlag::new()).await.unwrap();
        assert!(!outcome.is_success());
        assert_eq!(outcome.trace().len(), 1);
    }

    // Breaker open: the only provider is excluded, so the candidate
    // list is empty
    let outcome = engine.generate(&request, &CancelFlag::new()).await.unwrap();
    match outcome {
        GenerationOutcome::Failure { failure, trace } => {
            assert_eq!(failure, TerminalFailure::NoProvidersConfigured);
            assert!(trace.is_empty());
        }
        other => panic!("expected open breaker, got {other:?}"),
    }

    // Manual recovery restores eligibility immediately
    engine.reset_provider_health("admin-only").await;
    let outcome = engine.generate(&request, &CancelFlag::new()).await.unwrap();
    assert_eq!(outcome.trace().len(), 1);
}

#[tokio::test]
async fn sparse_admin_entries_fail_fast_but_visibly() {
    // Real dispatch: pre-flight rejects the entry before any network call
    let mut sparse = admin_entry("sparse", 2);
    sparse.endpoint = None;
    sparse.model = None;

    let engine = engine_with(
        None,
        config_store_with(vec![sparse]),
        RealAdapterDispatch::new(),
    );

    let outcome = engine
        .generate(&GenerationRequest::new("a castle"), &CancelFlag::new())
        .await
        .unwrap();

    match outcome {
        GenerationOutcome::Failure { failure, trace } => {
            assert_eq!(trace.len(), 1);
            let summary = trace[0].error_summary.as_deref().unwrap();
            assert!(summary.contains("invalid provider config"), "got: {summary}");
            assert!(matches!(
                failure,
                TerminalFailure::AllProvidersExhausted { .. }
            ));
        }
        other => panic!("expected visible rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn provider_statuses_merge_config_and_health() {
    let dispatch = ScriptedDispatch::new().fail("admin-flaky", transport("down"));
    let mut disabled = admin_entry("off", 4);
    disabled.enabled = false;
    let engine = engine_with(
        Some(env_descriptor()),
        config_store_with(vec![admin_entry("flaky", 2), disabled]),
        dispatch,
    );

    let mut request = GenerationRequest::new("a castle");
    request.exclude_providers.insert("env-openai".to_string());
    let _ = engine.generate(&request, &CancelFlag::new()).await.unwrap();

    let statuses = engine.provider_statuses().await.unwrap();
    assert_eq!(statuses.len(), 3);

    let flaky = statuses.iter().find(|s| s.id == "admin-flaky").unwrap();
    assert_eq!(flaky.consecutive_errors, 1);
    assert!(flaky.last_used_at.is_some());

    let off = statuses.iter().find(|s| s.id == "admin-off").unwrap();
    assert!(!off.enabled);

    let env = statuses.iter().find(|s| s.id == "env-openai").unwrap();
    assert_eq!(env.consecutive_errors, 0);
    assert!(env.last_used_at.is_none());
}
