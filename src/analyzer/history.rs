//! Commit history aggregation and line-change estimation.

use crate::crawler::{CommitLog, CommitRecord, Identity};
use crate::models::{round_to_tenth, CommitStats, DataStatus, LineChangeEstimate};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Result of a single pass over the commit log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistorySummary {
    pub total_commits: u64,
    pub contributors: BTreeSet<String>,
    /// `None` when the history is empty or unreadable
    pub commit_stats: Option<CommitStats>,
    pub status: DataStatus,
}

/// Accumulates commit records into [`CommitStats`].
#[derive(Debug, Default)]
struct HistoryAccumulator {
    identity: Option<Identity>,
    stats: CommitStats,
    contributors: BTreeSet<String>,
}

impl HistoryAccumulator {
    fn new(identity: Option<Identity>) -> Self {
        Self {
            identity,
            ..Self::default()
        }
    }

    fn record(&mut self, commit: CommitRecord) {
        let stats = &mut self.stats;
        stats.total_commits += 1;

        let month = commit.timestamp.format("%Y-%m").to_string();
        *stats.commits_by_month.entry(month).or_insert(0) += 1;

        if self
            .identity
            .as_ref()
            .is_some_and(|id| id.matches(&commit.author_name, commit.author_email.as_deref()))
        {
            stats.author_commits += 1;
        }

        stats.first_commit = Some(match stats.first_commit {
            Some(first) => first.min(commit.timestamp),
            None => commit.timestamp,
        });
        stats.last_commit = Some(match stats.last_commit {
            Some(last) => last.max(commit.timestamp),
            None => commit.timestamp,
        });

        self.contributors.insert(commit.author_name);
    }

    fn finish(mut self) -> HistorySummary {
        let total = self.stats.total_commits;
        if total == 0 {
            return HistorySummary::default();
        }

        self.stats.average_commits_per_month =
            average_per_month(total, self.stats.first_commit, self.stats.last_commit);

        HistorySummary {
            total_commits: total,
            contributors: self.contributors,
            commit_stats: Some(self.stats),
            status: DataStatus::Complete,
        }
    }
}

/// `total / max(1, whole_days / 30)`, rounded to one decimal.
fn average_per_month(
    total: u64,
    first: Option<DateTime<Utc>>,
    last: Option<DateTime<Utc>>,
) -> f64 {
    let days = match (first, last) {
        (Some(first), Some(last)) => (last - first).num_days().max(0),
        _ => 0,
    };
    let months = (days / 30).max(1);
    round_to_tenth(total as f64 / months as f64)
}

/// Walk the full history once and summarize it.
///
/// An unreadable log yields an empty summary marked unavailable.
pub fn aggregate_history(log: &dyn CommitLog) -> HistorySummary {
    let mut acc = HistoryAccumulator::new(log.local_identity());

    let walked = log.walk_commits(&mut |commit| acc.record(commit));
    match walked {
        Ok(()) => acc.finish(),
        Err(e) => {
            warn!("Could not read commit history: {}", e);
            HistorySummary {
                status: DataStatus::unavailable(e.to_string()),
                ..HistorySummary::default()
            }
        }
    }
}

/// Estimate lifetime lines added/removed from the most recent commits.
///
/// Returns the estimate together with the status of the sampled window.
pub fn estimate_line_changes(
    log: &dyn CommitLog,
    total_commits: u64,
    sample_size: usize,
) -> (LineChangeEstimate, DataStatus) {
    let window = match log.recent_diff_stats(sample_size) {
        Ok(window) => window,
        Err(e) => {
            warn!("Could not read recent commits: {}", e);
            return (
                LineChangeEstimate::extrapolate(0, 0, 0, total_commits),
                DataStatus::unavailable(e.to_string()),
            );
        }
    };

    let mut added = 0u64;
    let mut removed = 0u64;
    let mut sampled = 0u64;
    let mut failed = 0usize;

    for stat in window {
        match stat {
            Ok(stat) => {
                added = added.saturating_add(stat.insertions);
                removed = removed.saturating_add(stat.deletions);
                sampled += 1;
            }
            Err(e) => {
                debug!("Skipping commit stats: {}", e);
                failed += 1;
            }
        }
    }

    let status = match (sampled, failed) {
        (_, 0) => DataStatus::Complete,
        (0, _) => DataStatus::unavailable(format!("stats unreadable for {} commits", failed)),
        _ => DataStatus::partial(format!("stats unreadable for {} commits", failed)),
    };
    if failed > 0 {
        warn!("Skipped {} commits while sampling line changes", failed);
    }

    (
        LineChangeEstimate::extrapolate(added, removed, sampled, total_commits),
        status,
    )
}

#[cfg(test)]
pub(crate) mod fake {
    use crate::crawler::{CommitLog, CommitRecord, DiffStat, Identity};
    use crate::error::{Result, VitaeError};

    /// In-memory commit log.
    #[derive(Debug, Default, Clone)]
    pub struct FakeLog {
        pub commits: Vec<CommitRecord>,
        /// Newest first; `None` entries fail to compute
        pub diffs: Vec<Option<DiffStat>>,
        pub identity: Option<Identity>,
        pub broken: bool,
    }

    impl CommitLog for FakeLog {
        fn walk_commits(&self, visit: &mut dyn FnMut(CommitRecord)) -> Result<()> {
            if self.broken {
                return Err(VitaeError::Config("corrupt object database".to_string()));
            }
            for commit in &self.commits {
                visit(commit.clone());
            }
            Ok(())
        }

        fn recent_diff_stats(&self, limit: usize) -> Result<Vec<Result<DiffStat>>> {
            if self.broken {
                return Err(VitaeError::Config("corrupt object database".to_string()));
            }
            Ok(self
                .diffs
                .iter()
                .take(limit)
                .map(|d| d.ok_or_else(|| VitaeError::Config("missing tree".to_string())))
                .collect())
        }

        fn local_identity(&self) -> Option<Identity> {
            self.identity.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeLog;
    use super::*;
    use crate::crawler::DiffStat;
    use chrono::TimeZone;

    fn commit(name: &str, email: &str, y: i32, m: u32, d: u32) -> CommitRecord {
        CommitRecord {
            author_name: name.to_string(),
            author_email: Some(email.to_string()),
            timestamp: Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap(),
        }
    }

    fn diff(insertions: u64, deletions: u64) -> Option<DiffStat> {
        Some(DiffStat {
            insertions,
            deletions,
        })
    }

    #[test]
    fn test_aggregate_history() {
        let log = FakeLog {
            commits: vec![
                commit("Dev", "dev@example.com", 2024, 1, 5),
                commit("Dev", "DEV@example.com", 2024, 1, 20),
                commit("Pat", "pat@example.org", 2024, 3, 1),
                commit("Dev", "dev@example.com", 2024, 7, 4),
            ],
            identity: Some(Identity {
                name: Some("Dev".to_string()),
                email: Some("dev@example.com".to_string()),
            }),
            ..FakeLog::default()
        };

        let summary = aggregate_history(&log);
        assert_eq!(summary.total_commits, 4);
        assert!(summary.status.is_complete());
        assert_eq!(
            summary.contributors,
            BTreeSet::from(["Dev".to_string(), "Pat".to_string()])
        );

        let stats = summary.commit_stats.unwrap();
        assert_eq!(stats.author_commits, 3);
        assert_eq!(stats.commits_by_month["2024-01"], 2);
        assert_eq!(stats.commits_by_month["2024-03"], 1);
        assert_eq!(stats.active_months(), 3);
        // 182 days -> 6 months
        assert_eq!(stats.average_commits_per_month, 0.7);
    }

    #[test]
    fn test_short_history_counts_as_one_month() {
        let log = FakeLog {
            commits: vec![
                commit("A", "a@x.io", 2024, 2, 1),
                commit("A", "a@x.io", 2024, 2, 2),
                commit("B", "b@x.io", 2024, 2, 3),
            ],
            ..FakeLog::default()
        };

        let stats = aggregate_history(&log).commit_stats.unwrap();
        assert_eq!(stats.average_commits_per_month, 3.0);
        assert_eq!(stats.author_commits, 0);
    }

    #[test]
    fn test_empty_history_is_complete() {
        let summary = aggregate_history(&FakeLog::default());
        assert_eq!(summary.total_commits, 0);
        assert!(summary.commit_stats.is_none());
        assert!(summary.status.is_complete());
    }

    #[test]
    fn test_unreadable_history_is_unavailable() {
        let log = FakeLog {
            broken: true,
            ..FakeLog::default()
        };
        let summary = aggregate_history(&log);
        assert_eq!(summary.total_commits, 0);
        assert!(!summary.status.is_available());
    }

    #[test]
    fn test_line_estimate_scales_sample() {
        let log = FakeLog {
            diffs: vec![diff(10, 5), diff(11, 6), diff(12, 7)],
            ..FakeLog::default()
        };

        let (estimate, status) = estimate_line_changes(&log, 6, 50);
        assert!(status.is_complete());
        assert_eq!(estimate.added, 66);
        assert_eq!(estimate.removed, 36);
        assert_eq!(estimate.sampled_commits, 3);
    }

    #[test]
    fn test_line_estimate_respects_window() {
        let log = FakeLog {
            diffs: vec![diff(4, 0); 10],
            ..FakeLog::default()
        };

        let (estimate, _) = estimate_line_changes(&log, 10, 5);
        assert_eq!(estimate.sampled_commits, 5);
        assert_eq!(estimate.added, 40);
    }

    #[test]
    fn test_line_estimate_skips_failed_commits() {
        let log = FakeLog {
            diffs: vec![diff(8, 2), None, diff(4, 2)],
            ..FakeLog::default()
        };

        let (estimate, status) = estimate_line_changes(&log, 4, 50);
        assert!(matches!(status, DataStatus::Partial { .. }));
        assert_eq!(estimate.sampled_commits, 2);
        assert_eq!(estimate.added, 24);
        assert_eq!(estimate.removed, 8);
    }

    #[test]
    fn test_line_estimate_all_failed() {
        let log = FakeLog {
            diffs: vec![None, None],
            ..FakeLog::default()
        };

        let (estimate, status) = estimate_line_changes(&log, 2, 50);
        assert!(!status.is_available());
        assert_eq!(estimate.added, 0);
    }
}
