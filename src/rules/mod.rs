pub mod catalog;
pub mod profile;

use serde::{Deserialize, Serialize};

pub use catalog::RuleCatalog;
pub use profile::ActiveProfile;

/// Severity scale used by the host quality platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Minor,
    Major,
    Critical,
    Blocker,
}

impl Severity {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "info" => Some(Self::Info),
            "minor" => Some(Self::Minor),
            "major" => Some(Self::Major),
            "critical" | "crit" => Some(Self::Critical),
            "blocker" => Some(Self::Blocker),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Minor => write!(f, "minor"),
            Self::Major => write!(f, "major"),
            Self::Critical => write!(f, "critical"),
            Self::Blocker => write!(f, "blocker"),
        }
    }
}

/// A single rule entry loaded from a rule-definition document.
///
/// Immutable after catalog load; safe to share read-only across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDefinition {
    /// Rule identifier within its repository (e.g., "CA1000").
    pub id: String,
    /// Human-readable rule name.
    pub name: String,
    /// Longer description, may be empty.
    pub description: String,
    /// Severity assigned when the rule has no profile override.
    pub default_severity: Severity,
    /// Whether the rule is active in the default profile.
    pub default_active: bool,
}
