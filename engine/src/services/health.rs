//! In-memory provider health bookkeeping
//!
//! Process-wide circuit-breaker state keyed by descriptor id. Nothing is
//! persisted: a restart clears all health state, which is the accepted
//! trade-off (fast recovery after deploy, no cross-instance consistency).

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

/// Consecutive failures that trip the short cooldown
pub const TRIP_THRESHOLD: u32 = 3;

/// Short cooldown after tripping; lets transient provider-side issues
/// such as rate limiting clear without intervention
pub const COOLDOWN_SECONDS: i64 = 60;

/// Long-horizon forgiveness window: a trip older than this has its error
/// count cleared so one noisy minute cannot exclude a provider forever
pub const FORGIVENESS_MINUTES: i64 = 30;

/// Per-descriptor mutable health state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthRecord {
    pub consecutive_errors: u32,
    pub last_used_at: Option<DateTime<Utc>>,
    pub disabled_until: Option<DateTime<Utc>>,
    pub tripped_at: Option<DateTime<Utc>>,
}

impl HealthRecord {
    /// Whether ranking must drop this record's descriptor right now.
    ///
    /// An expired cooldown window makes the provider eligible again even
    /// though the counter still reads at the threshold; the next failure
    /// re-arms a fresh window. A counter at the threshold with no window
    /// on record (not produced by normal operation) stays excluded.
    pub fn is_excluded(&self, now: DateTime<Utc>) -> bool {
        match self.disabled_until {
            Some(until) => now < until,
            None => self.consecutive_errors >= TRIP_THRESHOLD,
        }
    }
}

/// Shared health tracker with map-granularity locking.
///
/// One instance per process in production; tests construct isolated
/// instances per case. All mutating operations take an explicit `now`
/// so clocks can be simulated.
#[derive(Debug, Default)]
pub struct HealthTracker {
    records: RwLock<HashMap<String, HealthRecord>>,
}

impl HealthTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the error count and any cooldown window.
    pub async fn record_success(&self, id: &str, now: DateTime<Utc>) {
        let mut records = self.records.write().await;
        let record = records.entry(id.to_string()).or_default();
        record.consecutive_errors = 0;
        record.last_used_at = Some(now);
        record.disabled_until = None;
        record.tripped_at = None;
    }

    /// Increments the error count; reaching the threshold arms the
    /// cooldown window in the same write-lock hold.
    pub async fn record_failure(&self, id: &str, now: DateTime<Utc>) {
        let mut records = self.records.write().await;
        let record = records.entry(id.to_string()).or_default();
        record.consecutive_errors += 1;
        record.last_used_at = Some(now);
        if record.consecutive_errors >= TRIP_THRESHOLD {
            record.disabled_until = Some(now + Duration::seconds(COOLDOWN_SECONDS));
            record.tripped_at = Some(now);
        }
    }

    /// Long-horizon recovery pass: forgives records whose trip happened
    /// more than the forgiveness window ago. Never shortens an active
    /// cooldown; a trip that old is far past its 60-second window.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) {
        let horizon = Duration::minutes(FORGIVENESS_MINUTES);
        let mut records = self.records.write().await;
        for record in records.values_mut() {
            if let Some(tripped_at) = record.tripped_at {
                if now - tripped_at > horizon {
                    record.consecutive_errors = 0;
                    record.disabled_until = None;
                    record.tripped_at = None;
                }
            }
        }
    }

    /// Administrative override: unconditionally zeroes the error count
    /// and clears any cooldown. `last_used_at` is left untouched.
    pub async fn reset(&self, id: &str) {
        let mut records = self.records.write().await;
        let record = records.entry(id.to_string()).or_default();
        record.consecutive_errors = 0;
        record.disabled_until = None;
        record.tripped_at = None;
    }

    /// Point-in-time copy for ranking and status reporting.
    pub async fn snapshot(&self) -> HashMap<String, HealthRecord> {
        self.records.read().await.clone()
    }

    /// Single-record lookup; absent ids read as a pristine record.
    pub async fn record(&self, id: &str) -> HealthRecord {
        self.records.read().await.get(id).cloned().unwrap_or_default()
    }
}
