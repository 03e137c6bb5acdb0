//! Candidate resolution and ranking
//!
//! Merges the environment-supplied descriptor with the admin-configured
//! entries, applies the exclusion filter, and produces the ranked
//! candidate list for one orchestration call. Pure over a health
//! snapshot, so identical inputs always produce identical ordering.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::services::health::HealthRecord;
use shared::{AdminConfig, ProviderDescriptor};

/// Merge the environment descriptor with enabled admin entries.
///
/// The environment descriptor joins only when its credential is
/// non-blank. Admin entries join when enabled with a non-blank
/// credential; entries missing endpoint or model are still listed so the
/// attempt loop rejects them visibly instead of dropping them silently.
pub fn list_descriptors(
    env: Option<&ProviderDescriptor>,
    admin: Option<&AdminConfig>,
) -> Vec<ProviderDescriptor> {
    let mut descriptors = Vec::new();

    if let Some(descriptor) = env {
        if !descriptor.credential.trim().is_empty() {
            descriptors.push(descriptor.clone());
        }
    }

    if let Some(config) = admin {
        for entry in &config.providers {
            if entry.enabled && !entry.credential.trim().is_empty() {
                descriptors.push(entry.to_descriptor());
            }
        }
    }

    descriptors
}

/// List every configured descriptor, disabled ones included, for status
/// reporting.
pub fn all_descriptors(
    env: Option<&ProviderDescriptor>,
    admin: Option<&AdminConfig>,
) -> Vec<ProviderDescriptor> {
    let mut descriptors = Vec::new();
    if let Some(descriptor) = env {
        descriptors.push(descriptor.clone());
    }
    if let Some(config) = admin {
        descriptors.extend(config.providers.iter().map(|e| e.to_descriptor()));
    }
    descriptors
}

/// Filter and rank candidates for one orchestration call.
///
/// Dropped before ranking: ids in the caller's exclusion set, and ids
/// whose health record excludes them (active cooldown, or threshold
/// reached with no window on record). Ranking is ascending by priority,
/// then last-used (never-used first, spreading load and letting recovery
/// windows expire naturally), then consecutive errors, then id.
pub fn rank_candidates(
    candidates: Vec<ProviderDescriptor>,
    health: &HashMap<String, HealthRecord>,
    exclude: &HashSet<String>,
    now: DateTime<Utc>,
) -> Vec<ProviderDescriptor> {
    let mut ranked: Vec<ProviderDescriptor> = candidates
        .into_iter()
        .filter(|descriptor| !exclude.contains(&descriptor.id))
        .filter(|descriptor| {
            health
                .get(&descriptor.id)
                .map_or(true, |record| !record.is_excluded(now))
        })
        .collect();

    ranked.sort_by(|a, b| {
        let record_a = health.get(&a.id);
        let record_b = health.get(&b.id);
        let key = |descriptor: &ProviderDescriptor, record: Option<&HealthRecord>| {
            (
                descriptor.priority,
                record.and_then(|r| r.last_used_at),
                record.map_or(0, |r| r.consecutive_errors),
            )
        };
        key(a, record_a)
            .cmp(&key(b, record_b))
            .then_with(|| a.id.cmp(&b.id))
    });

    ranked
}
