//! Admin-managed provider configuration schema

use serde::{Deserialize, Serialize};

use crate::types::{ProviderDescriptor, ProviderFamily, ProviderOrigin};

/// Admin priorities are clamped into this range on every write.
pub const MIN_ADMIN_PRIORITY: u8 = 1;
pub const MAX_ADMIN_PRIORITY: u8 = 10;
pub const DEFAULT_ADMIN_PRIORITY: u8 = 5;

/// One admin-configured provider entry, as persisted.
///
/// `endpoint` and `model` stay optional here: partially-specified entries
/// are surfaced to the attempt loop (and rejected there) rather than
/// silently dropped, so misconfiguration is visible in traces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminProviderEntry {
    pub name: String,
    pub family: ProviderFamily,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub credential: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: u8,
}

fn default_true() -> bool {
    true
}

fn default_priority() -> u8 {
    DEFAULT_ADMIN_PRIORITY
}

impl AdminProviderEntry {
    /// Stable id derived from origin + name; never reused across
    /// reconfiguration within a process lifetime.
    pub fn descriptor_id(&self) -> String {
        format!("admin-{}", self.name)
    }

    pub fn clamp_priority(&mut self) {
        self.priority = self.priority.clamp(MIN_ADMIN_PRIORITY, MAX_ADMIN_PRIORITY);
    }

    pub fn to_descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor {
            id: self.descriptor_id(),
            display_name: self.name.clone(),
            family: self.family,
            origin: ProviderOrigin::Admin,
            credential: self.credential.clone(),
            endpoint: self.endpoint.clone().unwrap_or_default(),
            model: self.model.clone().unwrap_or_default(),
            enabled: self.enabled,
            priority: self.priority.clamp(MIN_ADMIN_PRIORITY, MAX_ADMIN_PRIORITY),
        }
    }
}

/// The full admin configuration document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub providers: Vec<AdminProviderEntry>,
}

impl AdminConfig {
    /// Applied on every write path.
    pub fn normalize(&mut self) {
        for entry in &mut self.providers {
            entry.clamp_priority();
        }
    }
}
