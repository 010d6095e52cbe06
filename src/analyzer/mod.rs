//! Per-repository analysis: files, history and metadata.
//!
//! Analysis never fails. Whatever cannot be read is left at its default and
//! recorded in [`MetricsStatus`](crate::models::MetricsStatus), so one
//! broken repository never affects the others.

mod files;
mod history;
mod metadata;
mod tables;

pub use files::*;
pub use history::*;
pub use metadata::*;
pub use tables::*;

use crate::config::AnalysisConfig;
use crate::crawler::{CommitLog, GitCommitLog};
use crate::models::{DataStatus, RepositoryHandle, RepositoryMetrics};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Analyzer for individual repositories.
pub struct RepoAnalyzer {
    tables: Arc<HeuristicTables>,
    metadata: MetadataExtractor,
    line_sample_size: usize,
}

impl RepoAnalyzer {
    /// Create an analyzer with the default heuristic tables.
    pub fn new(config: &AnalysisConfig) -> Self {
        Self::with_tables(config, Arc::new(HeuristicTables::default()))
    }

    pub fn with_tables(config: &AnalysisConfig, tables: Arc<HeuristicTables>) -> Self {
        Self {
            tables,
            metadata: MetadataExtractor::new(config.description_max_chars),
            line_sample_size: config.line_sample_size,
        }
    }

    /// Analyze the repository behind `handle` using its git history.
    pub fn analyze(&self, handle: &RepositoryHandle) -> RepositoryMetrics {
        match GitCommitLog::open(&handle.path) {
            Ok(log) => self.analyze_with_log(handle, Some(&log)),
            Err(e) => {
                warn!("Cannot open repository {}: {}", handle.path.display(), e);
                self.analyze_with_log(handle, None)
            }
        }
    }

    /// Analyze with an explicit commit log; `None` marks history unavailable.
    pub fn analyze_with_log(
        &self,
        handle: &RepositoryHandle,
        log: Option<&dyn CommitLog>,
    ) -> RepositoryMetrics {
        info!("Analyzing repository: {}", handle.name);
        let mut metrics = RepositoryMetrics::empty(handle.clone());

        let breakdown = classify_files(&handle.path, &self.tables);
        metrics.languages = breakdown.percentages();
        metrics.file_count = breakdown.file_count;
        metrics.status.files = breakdown.status;

        match log {
            Some(log) => {
                let history = aggregate_history(log);
                metrics.total_commits = history.total_commits;
                metrics.contributors = history.contributors;
                metrics.commit_stats = history.commit_stats;
                metrics.status.history = history.status;

                if metrics.status.history.is_available() {
                    let (estimate, status) =
                        estimate_line_changes(log, metrics.total_commits, self.line_sample_size);
                    metrics.line_changes = estimate;
                    metrics.status.line_changes = status;
                } else {
                    metrics.status.line_changes =
                        DataStatus::unavailable("commit history unavailable");
                }
            }
            None => {
                metrics.status.history = DataStatus::unavailable("repository could not be opened");
                metrics.status.line_changes = DataStatus::unavailable("repository could not be opened");
            }
        }

        let metadata = self.metadata.extract(&handle.path, &self.tables);
        metrics.description = metadata.description;
        metrics.frameworks = metadata.frameworks;
        metrics.topics = metadata.topics;
        metrics.status.metadata = metadata.status;

        debug!(
            "{}: {} files, {} commits, {} frameworks",
            handle.name,
            metrics.file_count,
            metrics.total_commits,
            metrics.frameworks.len()
        );

        metrics
    }
}
