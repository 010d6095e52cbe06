//! Configuration management for repository discovery and analysis.

use crate::error::{Result, VitaeError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Main configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Repository discovery settings
    #[serde(default)]
    pub scan: ScanConfig,

    /// Per-repository analysis settings
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Anonymization and aggregation settings
    #[serde(default)]
    pub privacy: PrivacyConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Worker pool settings
    #[serde(default)]
    pub concurrency: ConcurrencyConfig,
}

/// Repository discovery configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Directory to scan (current directory if not set)
    #[serde(default)]
    pub scan_path: Option<PathBuf>,

    /// Maximum recursion depth below the scan root (root = 0)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Descend into directories whose name starts with a dot
    #[serde(default)]
    pub include_hidden: bool,

    /// Keep repositories classified as private
    #[serde(default = "default_true")]
    pub include_private: bool,

    /// Path substrings that exclude a directory
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,

    /// Remote hosts treated as public
    #[serde(default = "default_public_hosts")]
    pub public_hosts: Vec<String>,
}

/// Analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Most recent commits diffed for the line-change estimate
    #[serde(default = "default_line_sample_size")]
    pub line_sample_size: usize,

    /// Maximum README description length in characters
    #[serde(default = "default_description_max_chars")]
    pub description_max_chars: usize,
}

/// Anonymization configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivacyConfig {
    /// Languages kept in the portfolio distribution
    #[serde(default = "default_top_languages")]
    pub top_languages: usize,

    /// Projects with more commits than this count as active
    #[serde(default = "default_active_commit_threshold")]
    pub active_commit_threshold: u64,
}

/// Output configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Output file path (stdout if not specified)
    #[serde(default)]
    pub output_path: Option<PathBuf>,
}

/// Concurrency configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConcurrencyConfig {
    /// Threads analyzing repositories in parallel (0 = auto)
    #[serde(default)]
    pub analysis_threads: usize,
}

/// Output format enumeration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON format
    Json,
}

// Default value functions
fn default_max_depth() -> usize {
    3
}

fn default_true() -> bool {
    true
}

fn default_ignore_patterns() -> Vec<String> {
    ["node_modules", ".git", "__pycache__", ".venv", "venv"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_public_hosts() -> Vec<String> {
    vec!["github.com".to_string()]
}

fn default_line_sample_size() -> usize {
    50
}

fn default_description_max_chars() -> usize {
    500
}

fn default_top_languages() -> usize {
    10
}

fn default_active_commit_threshold() -> u64 {
    5
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scan_path: None,
            max_depth: default_max_depth(),
            include_hidden: false,
            include_private: true,
            ignore_patterns: default_ignore_patterns(),
            public_hosts: default_public_hosts(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            line_sample_size: default_line_sample_size(),
            description_max_chars: default_description_max_chars(),
        }
    }
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            top_languages: default_top_languages(),
            active_commit_threshold: default_active_commit_threshold(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, else the default location if it exists,
    /// else built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(default_path) if default_path.is_file() => {
                debug!("Loading configuration from {}", default_path.display());
                Self::from_file(&default_path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Default configuration file location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("repo-vitae").join("config.toml"))
    }

    /// Write this configuration as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.analysis.line_sample_size == 0 {
            return Err(VitaeError::Config(
                "analysis.line_sample_size must be at least 1".to_string(),
            ));
        }
        if self.privacy.top_languages == 0 {
            return Err(VitaeError::Config(
                "privacy.top_languages must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Create a configuration builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for creating configurations programmatically.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn scan_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.scan.scan_path = Some(path.into());
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.scan.max_depth = depth;
        self
    }

    pub fn include_hidden(mut self, include: bool) -> Self {
        self.config.scan.include_hidden = include;
        self
    }

    pub fn include_private(mut self, include: bool) -> Self {
        self.config.scan.include_private = include;
        self
    }

    pub fn ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.config.scan.ignore_patterns = patterns;
        self
    }

    pub fn public_hosts(mut self, hosts: Vec<String>) -> Self {
        self.config.scan.public_hosts = hosts;
        self
    }

    pub fn line_sample_size(mut self, size: usize) -> Self {
        self.config.analysis.line_sample_size = size;
        self
    }

    pub fn top_languages(mut self, count: usize) -> Self {
        self.config.privacy.top_languages = count;
        self
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output.format = format;
        self
    }

    pub fn output_path(mut self, path: PathBuf) -> Self {
        self.config.output.output_path = Some(path);
        self
    }

    pub fn analysis_threads(mut self, threads: usize) -> Self {
        self.config.concurrency.analysis_threads = threads;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
