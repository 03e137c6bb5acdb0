//! Orchestration engine with dependency injection
//!
//! One `generate` call walks the ranked candidate list sequentially,
//! records every attempt in an append-only trace, and stops at the first
//! success. Concurrent calls share the health tracker; everything else
//! is per-call state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::error::EngineResult;
use crate::services::health::{HealthRecord, HealthTracker};
use crate::services::registry;
use crate::traits::{AdapterDispatch, ConfigStore};
use shared::{
    AttemptFailure, AttemptRecord, AttemptStatus, CancelFlag, GenerationOutcome,
    GenerationRequest, ProviderDescriptor, ProviderStatusReport, TerminalFailure,
};

/// Tunables for one engine instance
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Bound on each individual provider attempt. Generation backends
    /// can be slow; an unbounded attempt would stall the whole fallback
    /// chain.
    pub attempt_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            attempt_timeout: Duration::from_secs(30),
        }
    }
}

/// Provider orchestration engine.
///
/// Generic over its configuration store and adapter dispatch so tests
/// can substitute mocks; the health tracker is injected so isolated
/// instances can be constructed per test case.
pub struct Engine<C, D>
where
    C: ConfigStore,
    D: AdapterDispatch,
{
    env_descriptor: Option<ProviderDescriptor>,
    config_store: C,
    dispatch: D,
    health: Arc<HealthTracker>,
    settings: EngineSettings,
}

impl<C, D> Engine<C, D>
where
    C: ConfigStore,
    D: AdapterDispatch,
{
    pub fn new(
        env_descriptor: Option<ProviderDescriptor>,
        config_store: C,
        dispatch: D,
        health: Arc<HealthTracker>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            env_descriptor,
            config_store,
            dispatch,
            health,
            settings,
        }
    }

    pub fn config_store(&self) -> &C {
        &self.config_store
    }

    /// Run one orchestration call.
    ///
    /// Candidates are attempted strictly in ranked order; the first
    /// success wins and no further candidates are tried. Terminal
    /// failures come back as `GenerationOutcome::Failure`, never as
    /// `Err`; only infrastructure problems (config store access)
    /// propagate as errors.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancelFlag,
    ) -> EngineResult<GenerationOutcome> {
        let now = Utc::now();
        // Long-horizon forgiveness pass; see HealthTracker::sweep_expired
        self.health.sweep_expired(now).await;

        let admin = self.config_store.load().await?;
        let merged = registry::list_descriptors(self.env_descriptor.as_ref(), admin.as_ref());
        let health = self.health.snapshot().await;
        let candidates =
            registry::rank_candidates(merged, &health, &request.exclude_providers, now);

        if candidates.is_empty() {
            warn!("no eligible providers for generation request");
            return Ok(GenerationOutcome::Failure {
                failure: TerminalFailure::NoProvidersConfigured,
                trace: Vec::new(),
            });
        }

        let call_start = Instant::now();
        let mut trace: Vec<AttemptRecord> = Vec::with_capacity(candidates.len());
        let mut failures: Vec<String> = Vec::with_capacity(candidates.len());

        for (index, candidate) in candidates.iter().enumerate() {
            if cancel.is_cancelled() {
                // Untried candidates keep their health records untouched
                let offset = call_start.elapsed().as_millis() as u64;
                for skipped in &candidates[index..] {
                    trace.push(AttemptRecord {
                        provider_id: skipped.id.clone(),
                        display_name: skipped.display_name.clone(),
                        status: AttemptStatus::Skipped,
                        start_offset_ms: offset,
                        duration_ms: 0,
                        error_summary: None,
                    });
                }
                info!("generation cancelled after {index} attempt(s)");
                return Ok(GenerationOutcome::Failure {
                    failure: TerminalFailure::Cancelled,
                    trace,
                });
            }

            let start_offset_ms = call_start.elapsed().as_millis() as u64;
            let attempt_start = Instant::now();
            let result = timeout(
                self.settings.attempt_timeout,
                self.dispatch
                    .generate(candidate, &request.prompt, &request.params),
            )
            .await;
            let duration_ms = attempt_start.elapsed().as_millis() as u64;
            let attempted_at = Utc::now();

            let failure = match result {
                Ok(Ok(image)) => {
                    self.health.record_success(&candidate.id, attempted_at).await;
                    trace.push(AttemptRecord {
                        provider_id: candidate.id.clone(),
                        display_name: candidate.display_name.clone(),
                        status: AttemptStatus::Success,
                        start_offset_ms,
                        duration_ms,
                        error_summary: None,
                    });
                    info!(
                        provider = %candidate.id,
                        duration_ms,
                        "image generated"
                    );
                    return Ok(GenerationOutcome::Success {
                        image,
                        provider_id: candidate.id.clone(),
                        trace,
                    });
                }
                Ok(Err(failure)) => failure,
                Err(_elapsed) => AttemptFailure::Timeout {
                    seconds: self.settings.attempt_timeout.as_secs(),
                },
            };

            self.health.record_failure(&candidate.id, attempted_at).await;
            let summary = failure.summary();
            warn!(
                provider = %candidate.id,
                kind = failure.kind(),
                error = %summary,
                "provider attempt failed"
            );
            failures.push(format!(
                "{} ({}): {summary}",
                candidate.display_name, candidate.id
            ));
            trace.push(AttemptRecord {
                provider_id: candidate.id.clone(),
                display_name: candidate.display_name.clone(),
                status: AttemptStatus::Failed,
                start_offset_ms,
                duration_ms,
                error_summary: Some(summary),
            });
        }

        // Operators need the full chain, not just the last error
        let message = failures.join("; ");
        warn!(attempts = trace.len(), "all providers exhausted");
        Ok(GenerationOutcome::Failure {
            failure: TerminalFailure::AllProvidersExhausted { message },
            trace,
        })
    }

    /// Operational view of every configured provider, health merged in.
    /// Bypasses the attempt loop entirely.
    pub async fn provider_statuses(&self) -> EngineResult<Vec<ProviderStatusReport>> {
        let admin = self.config_store.load().await?;
        let descriptors = registry::all_descriptors(self.env_descriptor.as_ref(), admin.as_ref());
        let health = self.health.snapshot().await;

        Ok(descriptors
            .into_iter()
            .map(|descriptor| {
                let record = health
                    .get(&descriptor.id)
                    .cloned()
                    .unwrap_or_else(HealthRecord::default);
                ProviderStatusReport {
                    id: descriptor.id,
                    display_name: descriptor.display_name,
                    family: descriptor.family,
                    origin: descriptor.origin,
                    enabled: descriptor.enabled,
                    priority: descriptor.priority,
                    consecutive_errors: record.consecutive_errors,
                    disabled_until: record.disabled_until,
                    last_used_at: record.last_used_at,
                }
            })
            .collect())
    }

    /// Manual recovery: unconditionally clears a provider's error count
    /// and cooldown.
    pub async fn reset_provider_health(&self, id: &str) {
        self.health.reset(id).await;
        info!(provider = %id, "provider health reset");
    }

    pub fn health(&self) -> &Arc<HealthTracker> {
        &self.health
    }
}
