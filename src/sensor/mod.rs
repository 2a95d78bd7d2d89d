//! One analysis pass: resolve settings, invoke the tool, parse the report,
//! map findings, report counts.
//!
//! The pipeline is strictly sequential — the external process dominates the
//! cost. A sensor with either setting blank completes as a no-op; that is
//! the normal way an analyzer is configured off.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{AnalysisConfig, Settings};
use crate::error::Result;
use crate::invoke::{CancelToken, ToolInvoker};
use crate::issue::{map_finding, FileResolver, IssueSink, MapOutcome};
use crate::report;
use crate::rules::ActiveProfile;

/// Counts surfaced after a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub emitted: usize,
    pub dropped_inactive_rule: usize,
    pub dropped_unresolved_file: usize,
    pub skipped_malformed: usize,
}

/// How a run ended, short of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing to analyze — a required setting is blank. Not an error.
    Skipped { reason: String },
    Completed(RunSummary),
}

pub struct Sensor<'a> {
    pub config: &'a AnalysisConfig,
    pub settings: &'a Settings,
    pub profile: &'a ActiveProfile,
    pub timeout: Duration,
    /// Pass the active rule ids to the tool as `--active-rules id,id,...`.
    pub pass_active_rules: bool,
}

impl<'a> Sensor<'a> {
    pub fn new(
        config: &'a AnalysisConfig,
        settings: &'a Settings,
        profile: &'a ActiveProfile,
        timeout: Duration,
    ) -> Self {
        Self {
            config,
            settings,
            profile,
            timeout,
            pass_active_rules: false,
        }
    }

    /// Run one analysis pass over `module_dir`, emitting issues to `sink`.
    ///
    /// `ToolNotFound`, `ToolTimeout`, `Cancelled`, and `ReportParse` abort
    /// this run only; the caller decides whether sibling analyzers proceed.
    pub fn execute(
        &self,
        module_dir: &Path,
        resolver: &dyn FileResolver,
        sink: &mut dyn IssueSink,
        cancel: &CancelToken,
    ) -> Result<RunOutcome> {
        let language = self.config.language_key();

        let Some(targets) = self.settings.get(self.config.targets_setting_key()) else {
            tracing::debug!(language, "targets setting blank, skipping analyzer");
            return Ok(RunOutcome::Skipped {
                reason: format!("setting '{}' is not set", self.config.targets_setting_key()),
            });
        };
        let Some(tool_path) = self.settings.get(self.config.tool_path_setting_key()) else {
            tracing::debug!(language, "tool path setting blank, skipping analyzer");
            return Ok(RunOutcome::Skipped {
                reason: format!(
                    "setting '{}' is not set",
                    self.config.tool_path_setting_key()
                ),
            });
        };

        let args = self.build_args(targets);
        let invoker = ToolInvoker::new(
            PathBuf::from(tool_path),
            module_dir.to_path_buf(),
            self.timeout,
        );
        let run = invoker.run(&args, cancel)?;

        if run.exit_code != Some(0) {
            // Advisory only: the report decides whether the run produced
            // usable output.
            tracing::warn!(
                language,
                exit_code = ?run.exit_code,
                stderr = %run.stderr.trim(),
                "analyzer exited non-zero, parsing report anyway"
            );
        }

        let findings = report::parse_report(&run.report_path)?;
        drop(run);

        let mut summary = RunSummary::default();
        for finding in &findings {
            if !finding.is_well_formed() {
                tracing::warn!(language, ?finding, "skipping malformed finding record");
                summary.skipped_malformed += 1;
                continue;
            }
            match map_finding(
                finding,
                self.profile,
                resolver,
                self.config.repository_key(),
                sink,
            ) {
                MapOutcome::Emitted => summary.emitted += 1,
                MapOutcome::InactiveRule => summary.dropped_inactive_rule += 1,
                MapOutcome::UnresolvedFile => summary.dropped_unresolved_file += 1,
            }
        }

        tracing::info!(
            language,
            emitted = summary.emitted,
            dropped_inactive_rule = summary.dropped_inactive_rule,
            dropped_unresolved_file = summary.dropped_unresolved_file,
            skipped_malformed = summary.skipped_malformed,
            "analysis run complete"
        );

        Ok(RunOutcome::Completed(summary))
    }

    fn build_args(&self, targets: &str) -> Vec<String> {
        let mut args: Vec<String> = split_targets(targets);
        if self.pass_active_rules && !self.profile.is_empty() {
            args.push("--active-rules".into());
            args.push(self.profile.active_ids().join(","));
        }
        args
    }
}

/// Split a targets setting on commas and semicolons, dropping blanks.
fn split_targets(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
