use serde::Serialize;

use crate::error::Result;
use crate::issue::Issue;
use crate::sensor::RunSummary;
use crate::{ModuleOutcome, ModuleReport};

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    modules: Vec<JsonModule<'a>>,
}

#[derive(Serialize)]
struct JsonModule<'a> {
    language: &'a str,
    repository: &'a str,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a RunSummary>,
    issues: &'a [Issue],
}

/// Render reports as a JSON document.
pub fn render(reports: &[ModuleReport]) -> Result<String> {
    let modules = reports
        .iter()
        .map(|report| {
            let (outcome, reason, error, summary) = match &report.outcome {
                ModuleOutcome::Skipped { reason } => {
                    ("skipped", Some(reason.as_str()), None, None)
                }
                ModuleOutcome::Failed(err) => ("failed", None, Some(err.to_string()), None),
                ModuleOutcome::Completed(summary) => ("completed", None, None, Some(summary)),
            };
            JsonModule {
                language: &report.language_key,
                repository: &report.repository_key,
                outcome,
                reason,
                error,
                summary,
                issues: &report.issues,
            }
        })
        .collect();

    let report = JsonReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        modules,
    };
    let json = serde_json::to_string_pretty(&report)?;
    Ok(json)
}
