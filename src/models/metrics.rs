//! Per-repository metrics produced by the analyzer.

use super::RepositoryHandle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Availability of one data source feeding the metrics.
///
/// Lets consumers tell "no commits" (complete, zero) apart from
/// "commit data unavailable".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DataStatus {
    /// All data was read.
    #[default]
    Complete,
    /// Some units were skipped; the remaining data is usable.
    Partial { reason: String },
    /// Nothing could be read; fields hold defaults.
    Unavailable { reason: String },
}

impl DataStatus {
    pub fn partial(reason: impl Into<String>) -> Self {
        DataStatus::Partial {
            reason: reason.into(),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        DataStatus::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, DataStatus::Complete)
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, DataStatus::Unavailable { .. })
    }

    /// Downgrade a complete status to partial. Existing degradations keep
    /// their first reason.
    pub fn degrade(&mut self, reason: impl Into<String>) {
        if self.is_complete() {
            *self = DataStatus::partial(reason);
        }
    }
}

/// Status of each data source for one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsStatus {
    pub files: DataStatus,
    pub history: DataStatus,
    pub line_changes: DataStatus,
    pub metadata: DataStatus,
}

impl MetricsStatus {
    /// True when every source was read completely.
    pub fn is_complete(&self) -> bool {
        self.files.is_complete()
            && self.history.is_complete()
            && self.line_changes.is_complete()
            && self.metadata.is_complete()
    }
}

/// Commit history statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitStats {
    pub total_commits: u64,

    /// Commits whose author matches the locally configured identity
    pub author_commits: u64,

    pub first_commit: Option<DateTime<Utc>>,
    pub last_commit: Option<DateTime<Utc>>,

    /// `YYYY-MM` bucket -> commit count
    pub commits_by_month: BTreeMap<String, u64>,

    pub average_commits_per_month: f64,
}

impl CommitStats {
    /// Number of calendar months with at least one commit.
    pub fn active_months(&self) -> usize {
        self.commits_by_month.len()
    }
}

/// Lines added/removed extrapolated from a window of recent commits.
///
/// These are estimates, not exact totals: only the most recent commits are
/// diffed and the sum is scaled by `total_commits / sampled_commits`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineChangeEstimate {
    pub added: u64,
    pub removed: u64,
    pub sampled_commits: u64,
    pub total_commits: u64,
}

impl LineChangeEstimate {
    /// Scale sampled insertion/deletion sums to the full history.
    pub fn extrapolate(
        sampled_added: u64,
        sampled_removed: u64,
        sampled_commits: u64,
        total_commits: u64,
    ) -> Self {
        if sampled_commits == 0 {
            return Self {
                total_commits,
                ..Self::default()
            };
        }

        let scale = |sum: u64| -> u64 {
            let scaled = sum as u128 * total_commits as u128 / sampled_commits as u128;
            u64::try_from(scaled).unwrap_or(u64::MAX)
        };

        Self {
            added: scale(sampled_added),
            removed: scale(sampled_removed),
            sampled_commits,
            total_commits,
        }
    }
}

/// Everything extracted from one repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryMetrics {
    pub repository: RepositoryHandle,

    /// Language name -> share of counted files (percent, 1 decimal)
    pub languages: BTreeMap<String, f64>,

    pub total_commits: u64,
    pub file_count: u64,
    pub contributors: BTreeSet<String>,
    pub description: Option<String>,
    pub topics: BTreeSet<String>,
    pub frameworks: BTreeSet<String>,
    pub commit_stats: Option<CommitStats>,

    #[serde(rename = "line_changes_estimate")]
    pub line_changes: LineChangeEstimate,

    pub status: MetricsStatus,
}

impl RepositoryMetrics {
    /// Empty metrics for a handle; every field holds its default.
    pub fn empty(repository: RepositoryHandle) -> Self {
        Self {
            repository,
            languages: BTreeMap::new(),
            total_commits: 0,
            file_count: 0,
            contributors: BTreeSet::new(),
            description: None,
            topics: BTreeSet::new(),
            frameworks: BTreeSet::new(),
            commit_stats: None,
            line_changes: LineChangeEstimate::default(),
            status: MetricsStatus::default(),
        }
    }

    /// Estimated lines added across the full history.
    pub fn lines_added(&self) -> u64 {
        self.line_changes.added
    }

    /// Estimated lines removed across the full history.
    pub fn lines_removed(&self) -> u64 {
        self.line_changes.removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extrapolate_doubles_sample() {
        // insertions [10, 11, 12], deletions [5, 6, 7], history twice the sample
        let estimate = LineChangeEstimate::extrapolate(33, 18, 3, 6);
        assert_eq!(estimate.added, 66);
        assert_eq!(estimate.removed, 36);
        assert_eq!(estimate.sampled_commits, 3);
        assert_eq!(estimate.total_commits, 6);
    }

    #[test]
    fn test_extrapolate_truncates() {
        let estimate = LineChangeEstimate::extrapolate(10, 1, 3, 4);
        // 10 * 4 / 3 = 13.33, 1 * 4 / 3 = 1.33
        assert_eq!(estimate.added, 13);
        assert_eq!(estimate.removed, 1);
    }

    #[test]
    fn test_extrapolate_empty_sample() {
        let estimate = LineChangeEstimate::extrapolate(0, 0, 0, 12);
        assert_eq!(estimate.added, 0);
        assert_eq!(estimate.removed, 0);
        assert_eq!(estimate.total_commits, 12);
    }

    #[test]
    fn test_status_degrade_keeps_first_reason() {
        let mut status = DataStatus::Complete;
        status.degrade("first");
        status.degrade("second");
        assert_eq!(status, DataStatus::partial("first"));

        let mut unavailable = DataStatus::unavailable("gone");
        unavailable.degrade("ignored");
        assert!(!unavailable.is_available());
    }

    #[test]
    fn test_empty_metrics() {
        let metrics = RepositoryMetrics::empty(RepositoryHandle::new("/tmp/x"));
        assert!(metrics.languages.is_empty());
        assert_eq!(metrics.total_commits, 0);
        assert!(metrics.status.is_complete());
    }

    #[test]
    fn test_status_serializes_with_state_tag() {
        let json = serde_json::to_value(DataStatus::partial("skipped 2 files")).unwrap();
        assert_eq!(json["state"], "partial");
        assert_eq!(json["reason"], "skipped 2 files");
    }
}
