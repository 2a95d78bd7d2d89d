//! End-to-end pipeline tests driving a fake analyzer script.

use std::fs;
use std::path::{Path, PathBuf};

use lintbridge::{analyze, AnalyzeOptions, ModuleOutcome};

const RULES_DOC: &str = r#"
<rules>
  <rule key="CA1000">
    <name>Do not declare static members on generic types</name>
    <severity>MAJOR</severity>
    <activeByDefault>true</activeByDefault>
  </rule>
  <rule key="CA2200">
    <name>Rethrow to preserve stack details</name>
    <severity>CRITICAL</severity>
    <activeByDefault>false</activeByDefault>
  </rule>
</rules>
"#;

/// Lay out a module dir: sources, rule document, and a lintbridge.toml whose
/// settings point at `tool_path`.
fn write_module(dir: &Path, tool_path: &str) {
    fs::create_dir_all(dir.join("src")).unwrap();
    fs::write(dir.join("src/Foo.cs"), "class Foo {}\n").unwrap();
    fs::create_dir_all(dir.join("rules")).unwrap();
    fs::write(dir.join("rules/ca.xml"), RULES_DOC).unwrap();

    let config = format!(
        r#"
[[analyzer]]
language = "cs"
repository = "cs-ca"
rules = "rules/ca.xml"
targets_key = "cs.analyzer.targets"
tool_path_key = "cs.analyzer.path"

[settings]
"cs.analyzer.targets" = "bin/App.dll"
"cs.analyzer.path" = "{tool_path}"
"#
    );
    fs::write(dir.join("lintbridge.toml"), config).unwrap();
}

#[test]
fn blank_tool_path_is_a_noop_run() {
    let dir = tempfile::tempdir().unwrap();
    write_module(dir.path(), "");

    let reports = analyze(dir.path(), &AnalyzeOptions::default()).unwrap();
    assert_eq!(reports.len(), 1);
    assert!(matches!(reports[0].outcome, ModuleOutcome::Skipped { .. }));
    assert!(reports[0].issues.is_empty());
}

#[test]
fn nonexistent_tool_fails_that_analyzer_only() {
    let dir = tempfile::tempdir().unwrap();
    write_module(dir.path(), "/definitely/not/here/analyzer");

    let reports = analyze(dir.path(), &AnalyzeOptions::default()).unwrap();
    assert_eq!(reports.len(), 1);
    match &reports[0].outcome {
        ModuleOutcome::Failed(err) => {
            assert!(matches!(
                err,
                lintbridge::error::BridgeError::ToolNotFound(_)
            ));
        }
        other => panic!("expected Failed, got {other:?}"),
    }
    assert!(reports[0].issues.is_empty());
}

#[test]
fn no_config_means_no_analyzers() {
    let dir = tempfile::tempdir().unwrap();
    let reports = analyze(dir.path(), &AnalyzeOptions::default()).unwrap();
    assert!(reports.is_empty());
}

#[cfg(unix)]
mod with_fake_tool {
    use super::*;
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;
    use std::time::Duration;

    /// A fake analyzer: prints a canned report to stdout.
    fn fake_tool(dir: &Path, report: &str) -> PathBuf {
        let path = dir.join("fake-analyzer.sh");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "#!/bin/sh\ncat <<'REPORT'\n{report}\nREPORT").unwrap();
        let mut perms = file.metadata().unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    #[test]
    fn active_rule_is_emitted_and_unknown_rule_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let report = r#"<analysis>
  <finding rule="CA1000" file="src/Foo.cs" line="10">
    <message>Do not declare static members on generic types</message>
  </finding>
  <finding rule="CA9999" file="src/Foo.cs" line="12">
    <message>Unknown rule</message>
  </finding>
</analysis>"#;
        let tool = fake_tool(dir.path(), report);
        write_module(dir.path(), &tool.display().to_string());

        let reports = analyze(dir.path(), &AnalyzeOptions::default()).unwrap();
        assert_eq!(reports.len(), 1);

        let report = &reports[0];
        match &report.outcome {
            ModuleOutcome::Completed(summary) => {
                assert_eq!(summary.emitted, 1);
                assert_eq!(summary.dropped_inactive_rule, 1);
                assert_eq!(summary.dropped_unresolved_file, 0);
            }
            other => panic!("expected Completed, got {other:?}"),
        }

        assert_eq!(report.issues.len(), 1);
        let issue = &report.issues[0];
        assert_eq!(issue.rule_key(), "cs-ca:CA1000");
        assert_eq!(issue.resource, PathBuf::from("src/Foo.cs"));
        assert_eq!(issue.line, Some(10));
    }

    #[test]
    fn zero_line_maps_to_file_level_issue() {
        let dir = tempfile::tempdir().unwrap();
        let report =
            r#"<analysis><finding rule="CA1000" file="src/Foo.cs" line="0" message="m"/></analysis>"#;
        let tool = fake_tool(dir.path(), report);
        write_module(dir.path(), &tool.display().to_string());

        let reports = analyze(dir.path(), &AnalyzeOptions::default()).unwrap();
        assert_eq!(reports[0].issues.len(), 1);
        assert_eq!(reports[0].issues[0].line, None);
    }

    #[test]
    fn file_outside_scope_is_dropped_and_counted() {
        let dir = tempfile::tempdir().unwrap();
        let report = r#"<analysis>
  <finding rule="CA1000" file="/somewhere/else/Other.cs" line="3" message="m"/>
</analysis>"#;
        let tool = fake_tool(dir.path(), report);
        write_module(dir.path(), &tool.display().to_string());

        let reports = analyze(dir.path(), &AnalyzeOptions::default()).unwrap();
        match &reports[0].outcome {
            ModuleOutcome::Completed(summary) => {
                assert_eq!(summary.emitted, 0);
                assert_eq!(summary.dropped_unresolved_file, 1);
            }
            other => panic!("expected Completed, got {other:?}"),
        }
        assert!(reports[0].issues.is_empty());
    }

    #[test]
    fn malformed_report_fails_with_position() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake_tool(dir.path(), "<analysis><finding rule=\"CA1000\"</analysis>");
        write_module(dir.path(), &tool.display().to_string());

        let reports = analyze(dir.path(), &AnalyzeOptions::default()).unwrap();
        match &reports[0].outcome {
            ModuleOutcome::Failed(err) => {
                assert!(matches!(
                    err,
                    lintbridge::error::BridgeError::ReportParse { .. }
                ));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn slow_tool_ends_the_run_in_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slow-analyzer.sh");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "#!/bin/sh\nsleep 30").unwrap();
        let mut perms = file.metadata().unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        drop(file);
        write_module(dir.path(), &path.display().to_string());

        let options = AnalyzeOptions {
            timeout_override: Some(Duration::from_millis(300)),
            ..AnalyzeOptions::default()
        };
        let reports = analyze(dir.path(), &options).unwrap();
        match &reports[0].outcome {
            ModuleOutcome::Failed(err) => {
                assert!(matches!(
                    err,
                    lintbridge::error::BridgeError::ToolTimeout { .. }
                ));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
        assert!(reports[0].issues.is_empty());
    }

    #[test]
    fn failing_analyzer_does_not_abort_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let report =
            r#"<analysis><finding rule="CA1000" file="src/Foo.cs" line="1" message="m"/></analysis>"#;
        let tool = fake_tool(dir.path(), report);

        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/Foo.cs"), "class Foo {}\n").unwrap();
        fs::create_dir_all(dir.path().join("rules")).unwrap();
        fs::write(dir.path().join("rules/ca.xml"), RULES_DOC).unwrap();

        let config = format!(
            r#"
[[analyzer]]
language = "vb"
repository = "vb-ca"
rules = "rules/ca.xml"
targets_key = "vb.analyzer.targets"
tool_path_key = "vb.analyzer.path"

[[analyzer]]
language = "cs"
repository = "cs-ca"
rules = "rules/ca.xml"
targets_key = "cs.analyzer.targets"
tool_path_key = "cs.analyzer.path"

[settings]
"vb.analyzer.targets" = "bin/App.dll"
"vb.analyzer.path" = "/definitely/not/here/analyzer"
"cs.analyzer.targets" = "bin/App.dll"
"cs.analyzer.path" = "{}"
"#,
            tool.display()
        );
        fs::write(dir.path().join("lintbridge.toml"), config).unwrap();

        let reports = analyze(dir.path(), &AnalyzeOptions::default()).unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports[0].failed());
        match &reports[1].outcome {
            ModuleOutcome::Completed(summary) => assert_eq!(summary.emitted, 1),
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[test]
    fn active_rules_are_passed_to_the_tool_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        // Echo the args back as the report so the test can observe them.
        let path = dir.path().join("echo-args.sh");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(
            file,
            "#!/bin/sh\nprintf '<analysis><finding rule=\"CA1000\" file=\"src/Foo.cs\" line=\"1\" message=\"%s\"/></analysis>' \"$*\""
        )
        .unwrap();
        let mut perms = file.metadata().unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        drop(file);

        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/Foo.cs"), "class Foo {}\n").unwrap();
        fs::create_dir_all(dir.path().join("rules")).unwrap();
        fs::write(dir.path().join("rules/ca.xml"), RULES_DOC).unwrap();
        let config = format!(
            r#"
[[analyzer]]
language = "cs"
repository = "cs-ca"
rules = "rules/ca.xml"
targets_key = "cs.analyzer.targets"
tool_path_key = "cs.analyzer.path"
pass_active_rules = true

[settings]
"cs.analyzer.targets" = "bin/App.dll"
"cs.analyzer.path" = "{}"
"#,
            path.display()
        );
        fs::write(dir.path().join("lintbridge.toml"), config).unwrap();

        let reports = analyze(dir.path(), &AnalyzeOptions::default()).unwrap();
        let issue = &reports[0].issues[0];
        assert!(issue.message.contains("bin/App.dll"));
        assert!(issue.message.contains("--active-rules CA1000"));
    }
}
