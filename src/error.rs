//! Error types for the portfolio pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for repository discovery, analysis and configuration.
#[derive(Error, Debug)]
pub enum VitaeError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML encoding error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot scan {}: {reason}", path.display())]
    ScanRoot { path: PathBuf, reason: String },

    #[error("Analysis pool error: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, VitaeError>;

impl VitaeError {
    /// Build a scan-root error from any displayable cause.
    pub fn scan_root(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        VitaeError::ScanRoot {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
