use crate::{ModuleOutcome, ModuleReport};

/// Render reports as console output, one block per analyzer.
pub fn render(reports: &[ModuleReport]) -> String {
    let mut output = String::new();

    if reports.is_empty() {
        output.push_str("\n  No analyzers configured.\n\n");
        return output;
    }

    for report in reports {
        output.push_str(&format!(
            "\n  {} (repository {})\n",
            report.language_key, report.repository_key
        ));

        match &report.outcome {
            ModuleOutcome::Skipped { reason } => {
                output.push_str(&format!("  skipped: {reason}\n"));
            }
            ModuleOutcome::Failed(error) => {
                output.push_str(&format!("  failed: {error}\n"));
            }
            ModuleOutcome::Completed(summary) => {
                for issue in &report.issues {
                    let location = match issue.line {
                        Some(line) => format!("{}:{}", issue.resource.display(), line),
                        None => issue.resource.display().to_string(),
                    };
                    output.push_str(&format!("    {} {}\n", issue.rule_key(), location));
                    if !issue.message.is_empty() {
                        output.push_str(&format!("        {}\n", issue.message));
                    }
                }
                output.push_str(&format!(
                    "  {} issue(s) emitted, {} dropped (inactive rule), {} dropped (unresolved file), {} malformed\n",
                    summary.emitted,
                    summary.dropped_inactive_rule,
                    summary.dropped_unresolved_file,
                    summary.skipped_malformed,
                ));
            }
        }
    }
    output.push('\n');

    output
}
