//! Mapping raw findings to platform issues.
//!
//! A finding survives only if its rule is active in the current profile and
//! its file resolves inside the analyzed scope; everything else is dropped
//! with a diagnostic and counted by the sensor.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::report::RawFinding;
use crate::rules::ActiveProfile;

/// A platform-level defect record attached to a resolved source location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    pub repository_key: String,
    pub rule_id: String,
    /// Scope-relative path of the resource the issue is attached to.
    pub resource: PathBuf,
    /// Absent for file-level issues.
    pub line: Option<u32>,
    pub message: String,
}

impl Issue {
    /// Platform rule key, `repository:rule` convention.
    pub fn rule_key(&self) -> String {
        format!("{}:{}", self.repository_key, self.rule_id)
    }
}

/// Resolves a tool-reported path to a resource inside the analyzed scope.
pub trait FileResolver {
    fn resolve(&self, raw_path: &str) -> Option<PathBuf>;
}

/// Destination for emitted issues — the host platform's issue store.
///
/// Ownership of each issue transfers on `report`; the pipeline never retains
/// emitted issues.
pub trait IssueSink {
    fn report(&mut self, issue: Issue);
}

/// Sink that collects issues in memory, for the CLI and tests.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub issues: Vec<Issue>,
}

impl IssueSink for CollectingSink {
    fn report(&mut self, issue: Issue) {
        self.issues.push(issue);
    }
}

/// Why a finding did not become an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapOutcome {
    Emitted,
    InactiveRule,
    UnresolvedFile,
}

/// Map one finding against the active profile and file scope.
///
/// The caller is expected to have filtered out records that are not
/// well-formed; this function assumes rule id and file path are present.
pub fn map_finding(
    finding: &RawFinding,
    profile: &ActiveProfile,
    resolver: &dyn FileResolver,
    repository_key: &str,
    sink: &mut dyn IssueSink,
) -> MapOutcome {
    if !profile.is_active(&finding.rule_id) {
        tracing::info!(
            rule = %finding.rule_id,
            file = %finding.file_path,
            "dropping finding for inactive or unknown rule"
        );
        return MapOutcome::InactiveRule;
    }

    let Some(resource) = resolver.resolve(&finding.file_path) else {
        tracing::warn!(
            rule = %finding.rule_id,
            file = %finding.file_path,
            "dropping finding for file outside the analyzed scope"
        );
        return MapOutcome::UnresolvedFile;
    };

    sink.report(Issue {
        repository_key: repository_key.to_string(),
        rule_id: finding.rule_id.clone(),
        resource,
        line: clamp_line(finding.line),
        message: finding.message.clone(),
    });
    MapOutcome::Emitted
}

/// Zero, negative, or absent line numbers become file-level issues.
pub fn clamp_line(raw: Option<i64>) -> Option<u32> {
    raw.filter(|&l| l > 0).and_then(|l| u32::try_from(l).ok())
}

/// File index over the analyzed module, for resolving tool-reported paths.
///
/// Analyzers report absolute OS paths with platform separators; we match by
/// case-insensitive suffix against the relative paths of indexed files.
#[derive(Debug)]
pub struct ScopeResolver {
    // normalized relative path -> relative path as found on disk
    index: BTreeMap<String, PathBuf>,
}

impl ScopeResolver {
    /// Walk `base` and index every file underneath it.
    pub fn index(base: &Path) -> Result<Self> {
        let mut index = BTreeMap::new();
        for entry in walkdir::WalkDir::new(base)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let relative = entry
                .path()
                .strip_prefix(base)
                .unwrap_or(entry.path())
                .to_path_buf();
            index.insert(normalize(&relative.to_string_lossy()), relative);
        }
        Ok(Self { index })
    }

    #[cfg(test)]
    fn from_paths(paths: &[&str]) -> Self {
        let index = paths
            .iter()
            .map(|p| (normalize(p), PathBuf::from(p)))
            .collect();
        Self { index }
    }
}

impl FileResolver for ScopeResolver {
    fn resolve(&self, raw_path: &str) -> Option<PathBuf> {
        let needle = normalize(raw_path);
        if needle.is_empty() {
            return None;
        }
        if let Some(found) = self.index.get(&needle) {
            return Some(found.clone());
        }
        let mut matches = self.index.iter().filter(|(key, _)| {
            needle.ends_with(&format!("/{key}")) || key.ends_with(&format!("/{needle}"))
        });
        let first = matches.next();
        if matches.next().is_some() {
            tracing::warn!(path = %raw_path, "ambiguous path in analyzed scope");
        }
        first.map(|(_, path)| path.clone())
    }
}

fn normalize(path: &str) -> String {
    path.trim().replace('\\', "/").to_lowercase()
}
