//! Active rule profile — the subset of catalog rules enabled for a run.
//!
//! Read-only input for the duration of an analysis; nothing mutates it after
//! construction.

use std::collections::HashSet;

use crate::rules::RuleCatalog;

#[derive(Debug, Clone, Default)]
pub struct ActiveProfile {
    active: HashSet<String>,
}

impl ActiveProfile {
    /// Profile with each rule's default activation from the catalog.
    pub fn from_catalog(catalog: &RuleCatalog) -> Self {
        let active = catalog
            .iter()
            .filter(|r| r.default_active)
            .map(|r| r.id.clone())
            .collect();
        Self { active }
    }

    /// Profile with per-run overrides applied on top of catalog defaults.
    ///
    /// Ids not present in the catalog are ignored with a diagnostic — an
    /// override for an unknown rule usually means a stale config.
    pub fn with_overrides(catalog: &RuleCatalog, activate: &[String], deactivate: &[String]) -> Self {
        let mut profile = Self::from_catalog(catalog);
        for id in activate {
            if catalog.get(id).is_some() {
                profile.active.insert(id.clone());
            } else {
                tracing::warn!(rule = %id, "activate override for rule not in catalog");
            }
        }
        for id in deactivate {
            if catalog.get(id).is_none() {
                tracing::warn!(rule = %id, "deactivate override for rule not in catalog");
            }
            profile.active.remove(id);
        }
        profile
    }

    pub fn is_active(&self, rule_id: &str) -> bool {
        self.active.contains(rule_id)
    }

    /// Active rule ids, sorted for deterministic command lines.
    pub fn active_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.active.iter().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
