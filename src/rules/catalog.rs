//! Rule-definition document loader.
//!
//! The catalog is the in-memory form of an analyzer's rule repository: one
//! `RuleDefinition` per `<rule>` entry, keyed by a fixed repository key.
//!
//! Document format:
//!
//! ```xml
//! <rules>
//!   <rule key="CA1000">
//!     <name>Do not declare static members on generic types</name>
//!     <description>...</description>
//!     <severity>MAJOR</severity>
//!     <activeByDefault>true</activeByDefault>
//!   </rule>
//! </rules>
//! ```
//!
//! Missing `<severity>` defaults to major, missing `<activeByDefault>` to
//! true. Unknown child elements are ignored.

use std::collections::HashSet;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{BridgeError, Result};
use crate::rules::{RuleDefinition, Severity};

/// Immutable rule repository for one analyzer.
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    repository_key: String,
    rules: Vec<RuleDefinition>,
}

impl RuleCatalog {
    /// Load a catalog from a rule-definition XML document.
    pub fn load(repository_key: &str, document: &str) -> Result<Self> {
        let rules = parse_rules(document)?;
        let mut seen: HashSet<&str> = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.id.as_str()) {
                return Err(BridgeError::RuleDoc(format!(
                    "duplicate rule id '{}'",
                    rule.id
                )));
            }
        }
        Ok(Self {
            repository_key: repository_key.to_string(),
            rules,
        })
    }

    /// Load a catalog from a rule-definition file on disk.
    pub fn load_file(repository_key: &str, path: &Path) -> Result<Self> {
        let document = std::fs::read_to_string(path)?;
        Self::load(repository_key, &document)
    }

    pub fn repository_key(&self) -> &str {
        &self.repository_key
    }

    pub fn get(&self, id: &str) -> Option<&RuleDefinition> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Rules in document order.
    pub fn iter(&self) -> impl Iterator<Item = &RuleDefinition> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[derive(Default)]
struct RuleEntry {
    key: Option<String>,
    name: Option<String>,
    description: String,
    severity: Option<Severity>,
    active: Option<bool>,
}

impl RuleEntry {
    fn finish(self) -> Result<RuleDefinition> {
        let id = self
            .key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| BridgeError::RuleDoc("rule entry has no key".into()))?;
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| BridgeError::RuleDoc(format!("rule '{id}' has no name")))?;
        Ok(RuleDefinition {
            id,
            name,
            description: self.description,
            default_severity: self.severity.unwrap_or(Severity::Major),
            default_active: self.active.unwrap_or(true),
        })
    }
}

fn parse_rules(document: &str) -> Result<Vec<RuleDefinition>> {
    let mut reader = Reader::from_str(document);
    reader.config_mut().trim_text(true);

    let mut rules = Vec::new();
    let mut entry: Option<RuleEntry> = None;
    // Child element of <rule> currently being read, if any.
    let mut field: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "rule" {
                    if entry.is_some() {
                        return Err(BridgeError::RuleDoc("nested <rule> element".into()));
                    }
                    entry = Some(entry_from_attrs(&e));
                } else if entry.is_some() {
                    field = Some(name);
                }
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "rule" {
                    if entry.is_some() {
                        return Err(BridgeError::RuleDoc("nested <rule> element".into()));
                    }
                    // Self-closing rule: no children, validated as-is.
                    rules.push(entry_from_attrs(&e).finish()?);
                }
            }
            Ok(Event::Text(e)) => {
                if let (Some(entry), Some(field)) = (entry.as_mut(), field.as_deref()) {
                    let text = e
                        .unescape()
                        .map_err(|err| BridgeError::RuleDoc(err.to_string()))?;
                    apply_field(entry, field, text.trim())?;
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "rule" {
                    let finished = entry
                        .take()
                        .ok_or_else(|| BridgeError::RuleDoc("stray </rule>".into()))?;
                    rules.push(finished.finish()?);
                } else {
                    field = None;
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(BridgeError::RuleDoc(format!(
                    "not well-formed at byte {}: {}",
                    reader.buffer_position(),
                    err
                )));
            }
        }
        buf.clear();
    }

    if entry.is_some() {
        return Err(BridgeError::RuleDoc("unterminated <rule> element".into()));
    }

    Ok(rules)
}

fn entry_from_attrs(e: &quick_xml::events::BytesStart<'_>) -> RuleEntry {
    let mut entry = RuleEntry::default();
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"key" {
            entry.key = Some(String::from_utf8_lossy(&attr.value).to_string());
        }
    }
    entry
}

fn apply_field(entry: &mut RuleEntry, field: &str, text: &str) -> Result<()> {
    match field {
        "name" => entry.name = Some(text.to_string()),
        "description" => entry.description = text.to_string(),
        "severity" => {
            let severity = Severity::from_str_lenient(text).ok_or_else(|| {
                BridgeError::RuleDoc(format!("unknown severity '{text}'"))
            })?;
            entry.severity = Some(severity);
        }
        "activeByDefault" => {
            let active = match text.to_lowercase().as_str() {
                "true" => true,
                "false" => false,
                other => {
                    return Err(BridgeError::RuleDoc(format!(
                        "invalid activeByDefault '{other}'"
                    )))
                }
            };
            entry.active = Some(active);
        }
        // Forward-compatible: unknown children are ignored.
        _ => {}
    }
    Ok(())
}
