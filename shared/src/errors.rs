//! Error taxonomy for provider attempts and terminal outcomes

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length of a diagnostic payload excerpt embedded in a summary.
/// Provider error bodies can be large and may echo sensitive request data.
pub const SUMMARY_EXCERPT_LIMIT: usize = 200;

/// Truncate a diagnostic payload to the excerpt limit.
pub fn truncate_excerpt(payload: &str) -> String {
    let trimmed = payload.trim();
    if trimmed.chars().count() <= SUMMARY_EXCERPT_LIMIT {
        trimmed.to_string()
    } else {
        let head: String = trimmed.chars().take(SUMMARY_EXCERPT_LIMIT).collect();
        format!("{head}...")
    }
}

/// Failure of a single provider attempt.
///
/// Every variant counts toward the provider's consecutive-error tally;
/// the kind is kept distinct so operators can tell misconfiguration from
/// a flaky backend.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttemptFailure {
    /// Descriptor missing required dispatch fields; rejected before any
    /// network call
    #[error("invalid provider config: missing {missing}")]
    InvalidProviderConfig { missing: String },

    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("credential rejected: {message}")]
    Auth { message: String },

    /// Well-formed response that carried no usable image data
    #[error("model refused: {message}")]
    ModelRefused { message: String },

    #[error("attempt timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

impl AttemptFailure {
    /// Short operator-facing description, safe to put in a trace entry.
    pub fn summary(&self) -> String {
        self.to_string()
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AttemptFailure::InvalidProviderConfig { .. } => "invalid_provider_config",
            AttemptFailure::Transport { .. } => "transport_error",
            AttemptFailure::Auth { .. } => "auth_error",
            AttemptFailure::ModelRefused { .. } => "model_refused",
            AttemptFailure::Timeout { .. } => "timeout",
        }
    }
}

/// Terminal failure of a whole orchestration call.
///
/// Returned as a value inside `GenerationOutcome::Failure`, never thrown.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerminalFailure {
    /// The merged, filtered candidate list was empty
    #[error("no providers configured")]
    NoProvidersConfigured,

    /// Every candidate was attempted and failed; the message names each
    /// provider and its failure reason, in attempt order
    #[error("all providers exhausted: {message}")]
    AllProvidersExhausted { message: String },

    /// External cancellation between attempts
    #[error("generation cancelled")]
    Cancelled,
}
