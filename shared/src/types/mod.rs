//! Core types used throughout the generation service

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::TerminalFailure;

/// Implicit priority assigned to environment-supplied descriptors.
/// Sits below the admin range (1-10) so ranking stays purely numeric.
pub const ENVIRONMENT_PRIORITY: u8 = 0;

/// Image generation backends supported by the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderFamily {
    #[serde(rename = "openai")]
    OpenAi,
    StableDiffusion,
    Google,
}

impl fmt::Display for ProviderFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderFamily::OpenAi => write!(f, "openai"),
            ProviderFamily::StableDiffusion => write!(f, "stable_diffusion"),
            ProviderFamily::Google => write!(f, "google"),
        }
    }
}

impl std::str::FromStr for ProviderFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ProviderFamily::OpenAi),
            "stable_diffusion" | "sd" => Ok(ProviderFamily::StableDiffusion),
            "google" | "imagen" => Ok(ProviderFamily::Google),
            _ => Err(format!("Unknown provider family: {s}")),
        }
    }
}

/// Where a descriptor was configured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderOrigin {
    /// Supplied through environment variables; immutable for the process lifetime
    Environment,
    /// Managed through the admin configuration store
    Admin,
}

impl fmt::Display for ProviderOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderOrigin::Environment => write!(f, "environment"),
            ProviderOrigin::Admin => write!(f, "admin"),
        }
    }
}

/// Identity and dispatch data for one configured backend.
///
/// Rebuilt from configuration on every orchestration call; never cached.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    pub id: String,
    pub display_name: String,
    pub family: ProviderFamily,
    pub origin: ProviderOrigin,
    pub credential: String,
    pub endpoint: String,
    pub model: String,
    pub enabled: bool,
    pub priority: u8,
}

impl ProviderDescriptor {
    /// Credential shortened for logs; the full value is never logged.
    pub fn redacted_credential(&self) -> String {
        let len = self.credential.chars().count();
        if len <= 4 {
            "****".to_string()
        } else {
            let tail: String = self.credential.chars().skip(len - 4).collect();
            format!("...{tail}")
        }
    }
}

// Manual impl so a debug-logged descriptor cannot leak the credential.
impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("family", &self.family)
            .field("origin", &self.origin)
            .field("credential", &self.redacted_credential())
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("enabled", &self.enabled)
            .field("priority", &self.priority)
            .finish()
    }
}

/// Rendering knobs forwarded to the provider adapters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderParams {
    /// e.g. "1024x1024"
    pub size: Option<String>,
    /// e.g. "vivid", "natural"
    pub style: Option<String>,
    pub negative_prompt: Option<String>,
}

/// One orchestration call's input
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Must be non-empty; callers validate before invoking the engine
    pub prompt: String,
    pub params: RenderParams,
    /// Provider ids to skip entirely (known bad from an outer attempt)
    pub exclude_providers: HashSet<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            params: RenderParams::default(),
            exclude_providers: HashSet::new(),
        }
    }
}

/// Raw image payload returned by an adapter
#[derive(Clone, PartialEq, Eq)]
pub struct ImageData {
    /// "png", "jpg"
    pub format: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageData")
            .field("format", &self.format)
            .field("bytes", &format!("{} bytes", self.bytes.len()))
            .finish()
    }
}

/// Outcome of a single attempt within one orchestration call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Success,
    Failed,
    Skipped,
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptStatus::Success => write!(f, "success"),
            AttemptStatus::Failed => write!(f, "failed"),
            AttemptStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// One entry of the per-call attempt trace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub provider_id: String,
    pub display_name: String,
    pub status: AttemptStatus,
    pub start_offset_ms: u64,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_summary: Option<String>,
}

/// Terminal result of one orchestration call.
///
/// Exactly one branch exists by construction; terminal failures are
/// values, never errors.
#[derive(Debug, Clone)]
pub enum GenerationOutcome {
    Success {
        image: ImageData,
        provider_id: String,
        trace: Vec<AttemptRecord>,
    },
    Failure {
        failure: TerminalFailure,
        trace: Vec<AttemptRecord>,
    },
}

impl GenerationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationOutcome::Success { .. })
    }

    pub fn trace(&self) -> &[AttemptRecord] {
        match self {
            GenerationOutcome::Success { trace, .. } => trace,
            GenerationOutcome::Failure { trace, .. } => trace,
        }
    }
}

/// Operational view of one configured provider, health included
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderStatusReport {
    pub id: String,
    pub display_name: String,
    pub family: ProviderFamily,
    pub origin: ProviderOrigin,
    pub enabled: bool,
    pub priority: u8,
    pub consecutive_errors: u32,
    pub disabled_until: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Cooperative cancellation signal for one orchestration call.
///
/// Checked between attempts; an in-flight attempt is bounded by its own
/// timeout instead.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
