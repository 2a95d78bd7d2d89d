//! lintbridge — external analyzer integration for quality platforms.
//!
//! Loads rule catalogs from XML rule-definition documents, invokes external
//! command-line analyzers under a bounded timeout, parses their XML reports,
//! and maps findings against an active rule profile into issues attached to
//! resolved source locations. The pipeline never parses source code itself;
//! it is parameterized entirely by configuration.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use lintbridge::{analyze, AnalyzeOptions};
//!
//! let options = AnalyzeOptions::default();
//! let reports = analyze(Path::new("./my-module"), &options).unwrap();
//! for report in &reports {
//!     println!("{}: {} issue(s)", report.language_key, report.issues.len());
//! }
//! ```

pub mod config;
pub mod error;
pub mod invoke;
pub mod issue;
pub mod output;
pub mod report;
pub mod rules;
pub mod sensor;

use std::path::Path;
use std::time::Duration;

use config::{AnalyzerConfig, Config, Settings};
use error::{BridgeError, Result};
use invoke::CancelToken;
use issue::{CollectingSink, Issue, ScopeResolver};
use rules::{ActiveProfile, RuleCatalog};
use sensor::{RunOutcome, RunSummary, Sensor};

/// Options for an analysis invocation.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Path to config file (defaults to `lintbridge.toml` in the module dir).
    pub config_path: Option<std::path::PathBuf>,
    /// CLI override for the tool timeout.
    pub timeout_override: Option<Duration>,
    /// Host-driven cancellation; kills any in-flight tool process.
    pub cancel: CancelToken,
}

/// How one analyzer's run ended.
#[derive(Debug)]
pub enum ModuleOutcome {
    /// Configured off — a required setting is blank. Not an error.
    Skipped { reason: String },
    Completed(RunSummary),
    /// This analyzer failed; sibling analyzers are unaffected.
    Failed(BridgeError),
}

/// Result of running one configured analyzer over the module.
#[derive(Debug)]
pub struct ModuleReport {
    pub language_key: String,
    pub repository_key: String,
    pub issues: Vec<Issue>,
    pub outcome: ModuleOutcome,
}

impl ModuleReport {
    pub fn failed(&self) -> bool {
        matches!(self.outcome, ModuleOutcome::Failed(_))
    }
}

/// Run every configured analyzer over `module_dir`, one report per analyzer.
///
/// A failure in one analyzer never aborts the others; it is recorded in that
/// analyzer's report and surfaced through the exit code by the CLI.
pub fn analyze(module_dir: &Path, options: &AnalyzeOptions) -> Result<Vec<ModuleReport>> {
    let config_path = options
        .config_path
        .clone()
        .unwrap_or_else(|| module_dir.join("lintbridge.toml"));
    let config = Config::load(&config_path)?;
    let config_dir = config_path.parent().unwrap_or(module_dir).to_path_buf();

    let settings = config.settings();
    let timeout = options
        .timeout_override
        .unwrap_or(Duration::from_secs(config.timeout_secs));

    // One file index shared read-only by every analyzer.
    let resolver = ScopeResolver::index(module_dir)?;

    let mut reports = Vec::new();
    for analyzer in &config.analyzer {
        let mut sink = CollectingSink::default();
        let outcome = match run_analyzer(
            analyzer,
            &settings,
            &config_dir,
            module_dir,
            &resolver,
            &mut sink,
            timeout,
            &options.cancel,
        ) {
            Ok(RunOutcome::Skipped { reason }) => ModuleOutcome::Skipped { reason },
            Ok(RunOutcome::Completed(summary)) => ModuleOutcome::Completed(summary),
            Err(error) => {
                tracing::error!(
                    language = %analyzer.language,
                    %error,
                    "analyzer run failed"
                );
                ModuleOutcome::Failed(error)
            }
        };
        reports.push(ModuleReport {
            language_key: analyzer.language.clone(),
            repository_key: analyzer.repository.clone(),
            issues: sink.issues,
            outcome,
        });
    }

    Ok(reports)
}

#[allow(clippy::too_many_arguments)]
fn run_analyzer(
    analyzer: &AnalyzerConfig,
    settings: &Settings,
    config_dir: &Path,
    module_dir: &Path,
    resolver: &ScopeResolver,
    sink: &mut CollectingSink,
    timeout: Duration,
    cancel: &CancelToken,
) -> Result<RunOutcome> {
    let analysis = analyzer.analysis_config()?;

    // Relative rule-document paths resolve against the config file location.
    let rules_path = if analyzer.rules.is_absolute() {
        analyzer.rules.clone()
    } else {
        config_dir.join(&analyzer.rules)
    };
    let catalog = RuleCatalog::load_file(analysis.repository_key(), &rules_path)?;
    let profile = ActiveProfile::with_overrides(&catalog, &analyzer.activate, &analyzer.deactivate);

    let mut sensor = Sensor::new(&analysis, settings, &profile, timeout);
    sensor.pass_active_rules = analyzer.pass_active_rules;
    sensor.execute(module_dir, resolver, sink, cancel)
}
