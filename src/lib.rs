//! repo_vitae - Portfolio summaries from local Git repositories
//!
//! Discovers repositories under a directory, extracts per-repository
//! metrics (languages, commit history, estimated line changes, frameworks)
//! and folds them into an anonymized portfolio summary that is safe to hand
//! to external text generation.
//!
//! # Architecture
//!
//! - **Crawler**: depth-bounded directory walk and git2 access
//! - **Analyzer**: per-repository metrics; failures degrade, never abort
//! - **Privacy**: sanitized records and the cross-project aggregate
//!
//! Repositories are analyzed in parallel on a dedicated Rayon pool; the CLI
//! drives the blocking pipeline from Tokio so it can react to Ctrl-C.
//!
//! # Example Usage
//!
//! ```no_run
//! use repo_vitae::{Config, Pipeline};
//! use std::path::Path;
//!
//! fn main() -> repo_vitae::Result<()> {
//!     let pipeline = Pipeline::new(Config::default())?;
//!     let payload = pipeline.summarize(Path::new("~/code"))?;
//!     println!("{} projects", payload.summary.summary_statistics.total_projects);
//!     Ok(())
//! }
//! ```

pub mod analyzer;
pub mod concurrency;
pub mod config;
pub mod crawler;
pub mod error;
pub mod models;
pub mod privacy;
pub mod reporter;

// Re-export commonly used types
pub use config::{Config, OutputFormat};
pub use error::{Result, VitaeError};
pub use models::{
    AggregateSummary, AnonymizedRecord, PortfolioPayload, RepositoryHandle, RepositoryMetrics,
};

use analyzer::RepoAnalyzer;
use concurrency::AnalysisPool;
use crawler::RepoScanner;
use privacy::PortfolioAnonymizer;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Scan, analyze and anonymize, wired from one configuration.
pub struct Pipeline {
    config: Config,
    scanner: RepoScanner,
    analyzer: RepoAnalyzer,
    anonymizer: PortfolioAnonymizer,
    pool: AnalysisPool,
}

impl Pipeline {
    /// Build every stage from `config`.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let scanner = RepoScanner::new(&config.scan);
        let analyzer = RepoAnalyzer::new(&config.analysis);
        let anonymizer = PortfolioAnonymizer::new(&config.privacy);
        let pool = AnalysisPool::new(&config.concurrency)?;

        Ok(Self {
            config,
            scanner,
            analyzer,
            anonymizer,
            pool,
        })
    }

    /// Scan root: the explicit path, else the configured one, else `.`.
    pub fn resolve_root(&self, explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.config.scan.scan_path.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Discover repositories, dropping private ones unless configured to keep them.
    pub fn discover(&self, root: &Path) -> Result<Vec<RepositoryHandle>> {
        let mut handles = self.scanner.scan(root)?;

        if !self.config.scan.include_private {
            let before = handles.len();
            handles.retain(|h| !h.is_private);
            info!("Excluded {} private repositories", before - handles.len());
        }

        Ok(handles)
    }

    /// Analyze already discovered repositories in parallel.
    pub fn analyze(&self, handles: &[RepositoryHandle]) -> Vec<RepositoryMetrics> {
        let start = Instant::now();
        let metrics = self.pool.analyze_all(&self.analyzer, handles);
        info!(
            "Analyzed {} repositories in {}ms",
            metrics.len(),
            start.elapsed().as_millis()
        );
        metrics
    }

    /// Discover and analyze everything under `root`.
    pub fn analyze_path(&self, root: &Path) -> Result<Vec<RepositoryMetrics>> {
        let handles = self.discover(root)?;
        Ok(self.analyze(&handles))
    }

    /// Discover, analyze and anonymize everything under `root`.
    pub fn summarize(&self, root: &Path) -> Result<PortfolioPayload> {
        let metrics = self.analyze_path(root)?;
        Ok(self.anonymizer.payload(&metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::test_support::{commit_files, init_repo};
    use crate::models::ProjectType;

    const JAN_2024: i64 = 1_704_067_200;

    fn workspace() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let me = ("Local Dev", "dev@example.com");

        let public = init_repo(&dir.path().join("web-shop"));
        public
            .remote("origin", "https://github.com/jdoe/web-shop.git")
            .unwrap();
        commit_files(
            &public,
            &[
                ("index.js", "console.log(1)\n"),
                ("package.json", r#"{"dependencies": {"react": "18", "express": "4"}}"#),
            ],
            me,
            JAN_2024,
        );

        let private = init_repo(&dir.path().join("clients").join("acme-secret"));
        commit_files(&private, &[("main.rs", "fn main() {}\n")], me, JAN_2024);

        dir
    }

    #[test]
    fn test_summarize_end_to_end() {
        let dir = workspace();
        let pipeline = Pipeline::new(Config::default()).unwrap();

        let payload = pipeline.summarize(dir.path()).unwrap();
        assert_eq!(payload.records.len(), 2);
        assert_eq!(payload.summary.summary_statistics.total_commits, 2);

        let json = serde_json::to_string(&payload).unwrap();
        for leaked in ["acme", "secret", "web-shop", "jdoe", "Local Dev", "dev@example.com"] {
            assert!(!json.contains(leaked), "leaked {:?}", leaked);
        }

        let types: Vec<ProjectType> = payload.records.iter().map(|r| r.project_type).collect();
        assert!(types.contains(&ProjectType::FullstackWeb));
        assert!(types.contains(&ProjectType::SystemsProgramming));
    }

    #[test]
    fn test_exclude_private() {
        let dir = workspace();
        let config = Config::builder().include_private(false).build();
        let pipeline = Pipeline::new(config).unwrap();

        let handles = pipeline.discover(dir.path()).unwrap();
        assert_eq!(handles.len(), 1);
        assert_eq!(handles[0].name, "web-shop");
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::new(Config::default()).unwrap();
        assert!(matches!(
            pipeline.analyze_path(&dir.path().join("nope")),
            Err(VitaeError::ScanRoot { .. })
        ));
    }

    #[test]
    fn test_resolve_root() {
        let pipeline = Pipeline::new(Config::builder().scan_path("/configured").build()).unwrap();
        assert_eq!(
            pipeline.resolve_root(Some(Path::new("/explicit"))),
            PathBuf::from("/explicit")
        );
        assert_eq!(pipeline.resolve_root(None), PathBuf::from("/configured"));

        let pipeline = Pipeline::new(Config::default()).unwrap();
        assert_eq!(pipeline.resolve_root(None), PathBuf::from("."));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = Config::builder().top_languages(0).build();
        assert!(matches!(Pipeline::new(config), Err(VitaeError::Config(_))));
    }
}
