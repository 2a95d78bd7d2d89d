use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

/// Immutable configuration bundle for one analyzer binding.
///
/// One value configures one invocation of the generic pipeline — there is no
/// per-language subclassing anywhere; everything downstream reads these keys.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    language_key: String,
    repository_key: String,
    targets_setting_key: String,
    tool_path_setting_key: String,
}

impl AnalysisConfig {
    pub fn new(
        language_key: &str,
        repository_key: &str,
        targets_setting_key: &str,
        tool_path_setting_key: &str,
    ) -> Result<Self> {
        for (label, value) in [
            ("language key", language_key),
            ("repository key", repository_key),
            ("targets setting key", targets_setting_key),
            ("tool path setting key", tool_path_setting_key),
        ] {
            if value.trim().is_empty() {
                return Err(BridgeError::Config(format!("{label} must not be empty")));
            }
        }
        if targets_setting_key == tool_path_setting_key {
            return Err(BridgeError::Config(
                "targets and tool path setting keys must be distinct".into(),
            ));
        }
        Ok(Self {
            language_key: language_key.to_string(),
            repository_key: repository_key.to_string(),
            targets_setting_key: targets_setting_key.to_string(),
            tool_path_setting_key: tool_path_setting_key.to_string(),
        })
    }

    pub fn language_key(&self) -> &str {
        &self.language_key
    }

    pub fn repository_key(&self) -> &str {
        &self.repository_key
    }

    pub fn targets_setting_key(&self) -> &str {
        &self.targets_setting_key
    }

    pub fn tool_path_setting_key(&self) -> &str {
        &self.tool_path_setting_key
    }
}

/// Project/module-scoped settings store.
///
/// Flat string map; blank values count as unset, which is how a sensor gets
/// configured off.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: BTreeMap<String, String>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    /// Value for `key`, with blank treated as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

fn default_timeout_secs() -> u64 {
    600
}

/// One `[[analyzer]]` section of `lintbridge.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Language key the host platform files issues under (e.g., "cs").
    pub language: String,
    /// Rule repository key (e.g., "cs-ca").
    pub repository: String,
    /// Path to the rule-definition XML document.
    pub rules: PathBuf,
    /// Settings key naming the targets to analyze.
    pub targets_key: String,
    /// Settings key naming the analyzer executable.
    pub tool_path_key: String,
    /// Pass `--active-rules <id,...>` to the tool.
    #[serde(default)]
    pub pass_active_rules: bool,
    /// Rule ids activated on top of catalog defaults.
    #[serde(default)]
    pub activate: Vec<String>,
    /// Rule ids deactivated despite catalog defaults.
    #[serde(default)]
    pub deactivate: Vec<String>,
}

impl AnalyzerConfig {
    pub fn analysis_config(&self) -> Result<AnalysisConfig> {
        AnalysisConfig::new(
            &self.language,
            &self.repository,
            &self.targets_key,
            &self.tool_path_key,
        )
    }
}

/// Top-level configuration from `lintbridge.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analyzer: Vec<AnalyzerConfig>,
    #[serde(default)]
    pub settings: BTreeMap<String, String>,
    /// Per-invocation timeout for the external tool.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analyzer: Vec::new(),
            settings: BTreeMap::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn settings(&self) -> Settings {
        Settings::from_map(self.settings.clone())
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r#"# lintbridge configuration
# See https://github.com/limaronaldo/lintbridge for documentation.

# Per-invocation timeout for the external analyzer, in seconds.
timeout_secs = 600

[[analyzer]]
language = "cs"
repository = "cs-ca"
rules = "rules/ca.xml"
targets_key = "cs.analyzer.targets"
tool_path_key = "cs.analyzer.path"
# pass_active_rules = true
# activate = ["CA2000"]
# deactivate = ["CA1000"]

[settings]
# Blank values disable the analyzer (no-op run, not an error).
"cs.analyzer.targets" = ""
"cs.analyzer.path" = ""
"#
    }
}
