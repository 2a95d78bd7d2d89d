//! Analyzer report parsing.
//!
//! Reports are flat XML: a root element wrapping `<finding>` records.
//!
//! ```xml
//! <analysis>
//!   <finding rule="CA1000" file="src/Foo.cs" line="10" severity="warning">
//!     <message>Do not declare static members on generic types</message>
//!   </finding>
//! </analysis>
//! ```
//!
//! The message is accepted as an attribute or a `<message>` child (attribute
//! wins). Unknown attributes and elements are ignored so newer tool versions
//! keep parsing. Structural errors are fatal with byte/line position; a
//! record missing its rule or file is returned as-is and skipped downstream.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{BridgeError, Result};

/// One raw defect record as reported by the external analyzer, pre-mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFinding {
    pub rule_id: String,
    pub file_path: String,
    /// Raw line from the tool; zero or negative means file-level.
    pub line: Option<i64>,
    pub message: String,
    /// Severity string as the tool reported it, informational only.
    pub tool_severity: Option<String>,
}

impl RawFinding {
    /// A record without a rule id or file path cannot become an issue.
    pub fn is_well_formed(&self) -> bool {
        !self.rule_id.trim().is_empty() && !self.file_path.trim().is_empty()
    }
}

/// Parse a report file. Re-invocation re-reads from disk.
pub fn parse_report(path: &Path) -> Result<Vec<RawFinding>> {
    let content = std::fs::read_to_string(path)?;
    parse_str(&content)
}

/// Parse report content already in memory.
pub fn parse_str(content: &str) -> Result<Vec<RawFinding>> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let line_starts: Vec<usize> = std::iter::once(0)
        .chain(content.match_indices('\n').map(|(i, _)| i + 1))
        .collect();
    let line_of = |offset: u64| line_starts.partition_point(|&start| start <= offset as usize);

    let mut findings = Vec::new();
    let mut current: Option<RawFinding> = None;
    let mut in_message = false;
    let mut buf = Vec::new();

    loop {
        let offset = reader.buffer_position();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"finding" => current = Some(finding_from_attrs(&e)),
                b"message" if current.is_some() => in_message = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"finding" {
                    findings.push(finding_from_attrs(&e));
                }
            }
            Ok(Event::Text(e)) => {
                if in_message {
                    if let Some(finding) = current.as_mut() {
                        if finding.message.is_empty() {
                            let text = e.unescape().map_err(|err| BridgeError::ReportParse {
                                offset,
                                line: line_of(offset),
                                message: err.to_string(),
                            })?;
                            finding.message = text.trim().to_string();
                        }
                    }
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"finding" => {
                    if let Some(finding) = current.take() {
                        findings.push(finding);
                    }
                }
                b"message" => in_message = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                let offset = reader.buffer_position();
                return Err(BridgeError::ReportParse {
                    offset,
                    line: line_of(offset),
                    message: err.to_string(),
                });
            }
        }
        buf.clear();
    }

    Ok(findings)
}

fn finding_from_attrs(e: &BytesStart<'_>) -> RawFinding {
    let mut finding = RawFinding::default();
    for attr in e.attributes().flatten() {
        let value = String::from_utf8_lossy(&attr.value).to_string();
        match attr.key.as_ref() {
            b"rule" => finding.rule_id = value,
            b"file" => finding.file_path = value,
            b"line" => finding.line = value.trim().parse::<i64>().ok(),
            b"severity" => finding.tool_severity = Some(value),
            b"message" => finding.message = value,
            // Forward-compatible: unknown attributes are ignored.
            _ => {}
        }
    }
    finding
}
