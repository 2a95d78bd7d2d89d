use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BridgeError>;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed rule definition: {0}")]
    RuleDoc(String),

    #[error("Configured tool path does not exist or is not executable: {}", .0.display())]
    ToolNotFound(PathBuf),

    #[error("Analyzer did not finish within {}s and was killed", .timeout.as_secs())]
    ToolTimeout { timeout: Duration },

    #[error("Analysis cancelled")]
    Cancelled,

    #[error("Report parse error at byte {offset} (line {line}): {message}")]
    ReportParse {
        offset: u64,
        line: usize,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl BridgeError {
    pub fn exit_code(&self) -> i32 {
        2
    }
}
