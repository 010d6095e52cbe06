//! Anonymization of repository metrics into portfolio records.
//!
//! Records keep only counts, allow-listed language names, non-sensitive
//! framework names and categorical labels. Project identifiers are
//! positional and never derived from names, paths or remotes.

use super::{ClassificationRules, SensitiveMatcher};
use crate::config::PrivacyConfig;
use crate::models::{
    round_to_tenth, AggregateSummary, AnonymizedRecord, CodeProductivity, CommitRhythm,
    DevelopmentPatterns, LanguageShare, PortfolioPayload, RepositoryMetrics, SummaryStatistics,
    TechnicalProfile,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Turns per-repository metrics into anonymized records and an aggregate.
pub struct PortfolioAnonymizer {
    matcher: SensitiveMatcher,
    rules: ClassificationRules,
    top_languages: usize,
    active_commit_threshold: u64,
}

impl PortfolioAnonymizer {
    /// Anonymizer with default sensitive tables and classification rules.
    pub fn new(config: &PrivacyConfig) -> Self {
        Self::with_parts(config, SensitiveMatcher::new(), ClassificationRules::default())
    }

    pub fn with_parts(
        config: &PrivacyConfig,
        matcher: SensitiveMatcher,
        rules: ClassificationRules,
    ) -> Self {
        Self {
            matcher,
            rules,
            top_languages: config.top_languages,
            active_commit_threshold: config.active_commit_threshold,
        }
    }

    /// Redact free text destined for the aggregate.
    pub fn sanitize_text(&self, text: &str) -> String {
        self.matcher.sanitize_text(text)
    }

    /// Anonymize every repository and build the aggregate.
    pub fn anonymize(&self, metrics: &[RepositoryMetrics]) -> (Vec<AnonymizedRecord>, AggregateSummary) {
        let records: Vec<AnonymizedRecord> = metrics
            .iter()
            .enumerate()
            .map(|(index, m)| self.anonymize_record(index, m))
            .collect();

        let summary = self.summarize(&records);
        info!("Anonymized {} projects", records.len());
        (records, summary)
    }

    /// Convenience wrapper producing the serializable payload.
    pub fn payload(&self, metrics: &[RepositoryMetrics]) -> PortfolioPayload {
        let (records, summary) = self.anonymize(metrics);
        PortfolioPayload { records, summary }
    }

    /// Sanitized record for the repository at `index` (0-based).
    pub fn anonymize_record(&self, index: usize, metrics: &RepositoryMetrics) -> AnonymizedRecord {
        let languages: BTreeMap<String, f64> = metrics
            .languages
            .iter()
            .filter(|(name, pct)| pct.is_finite() && self.matcher.is_known_language(name))
            .map(|(name, pct)| (name.clone(), *pct))
            .collect();

        let frameworks: Vec<String> = metrics
            .frameworks
            .iter()
            .filter(|name| !self.matcher.contains_sensitive_info(name))
            .cloned()
            .collect();

        let dropped = metrics.frameworks.len() - frameworks.len();
        if dropped > 0 {
            debug!("Dropped {} sensitive framework names", dropped);
        }

        let project_type = self.rules.project_type(
            languages.keys().map(String::as_str),
            frameworks.iter().map(String::as_str),
        );

        AnonymizedRecord {
            project_id: format!("project_{}", index + 1),
            languages,
            frameworks,
            total_commits: metrics.total_commits,
            file_count: metrics.file_count,
            contributor_count: metrics.contributors.len(),
            estimated_lines_added: metrics.lines_added(),
            estimated_lines_removed: metrics.lines_removed(),
            project_type,
            activity_level: self.rules.activity_tier(metrics.total_commits),
            size_category: self.rules.size_tier(metrics.file_count),
            commit_stats: metrics.commit_stats.as_ref().map(|stats| CommitRhythm {
                total_commits: stats.total_commits,
                average_commits_per_month: stats.average_commits_per_month,
                active_months: stats.active_months(),
            }),
        }
    }

    /// Roll records up into portfolio totals, distributions and ratios.
    pub fn summarize(&self, records: &[AnonymizedRecord]) -> AggregateSummary {
        let total_projects = records.len();
        let total_commits: u64 = records.iter().map(|r| r.total_commits).sum();
        let total_files: u64 = records.iter().map(|r| r.file_count).sum();
        let lines_added: u64 = records.iter().map(|r| r.estimated_lines_added).sum();
        let lines_removed: u64 = records.iter().map(|r| r.estimated_lines_removed).sum();

        let mut profile = TechnicalProfile {
            primary_languages: self.language_distribution(records),
            ..TechnicalProfile::default()
        };

        let frameworks: BTreeSet<&String> = records.iter().flat_map(|r| &r.frameworks).collect();
        profile.frameworks_and_tools = frameworks.into_iter().cloned().collect();

        for record in records {
            *profile
                .project_type_distribution
                .entry(record.project_type)
                .or_insert(0) += 1;
            *profile
                .activity_level_distribution
                .entry(record.activity_level)
                .or_insert(0) += 1;
            *profile
                .project_size_distribution
                .entry(record.size_category)
                .or_insert(0) += 1;
        }

        let statistics = SummaryStatistics {
            total_projects,
            total_commits,
            estimated_total_lines_added: lines_added,
            estimated_total_lines_removed: lines_removed,
            active_projects: records
                .iter()
                .filter(|r| r.total_commits > self.active_commit_threshold)
                .count(),
        };

        let patterns = DevelopmentPatterns {
            average_commits_per_project: ratio(total_commits, total_projects as u64),
            average_files_per_project: ratio(total_files, total_projects as u64),
            code_productivity: CodeProductivity {
                lines_per_commit: ratio(lines_added, total_commits),
                net_lines: net_lines(lines_added, lines_removed),
            },
        };

        AggregateSummary {
            summary_statistics: statistics,
            technical_profile: profile,
            development_patterns: patterns,
        }
    }

    /// Summed per-project shares re-normalized to 100, highest first.
    fn language_distribution(&self, records: &[AnonymizedRecord]) -> Vec<LanguageShare> {
        let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
        for record in records {
            for (language, pct) in &record.languages {
                *totals.entry(language.as_str()).or_insert(0.0) += pct;
            }
        }

        let grand_total: f64 = totals.values().sum();
        if grand_total <= 0.0 || !grand_total.is_finite() {
            return Vec::new();
        }

        let mut shares: Vec<LanguageShare> = totals
            .into_iter()
            .map(|(language, sum)| LanguageShare {
                language: language.to_string(),
                percentage: round_to_tenth(sum / grand_total * 100.0),
            })
            .collect();

        shares.sort_by(|a, b| {
            b.percentage
                .total_cmp(&a.percentage)
                .then_with(|| a.language.cmp(&b.language))
        });
        shares.truncate(self.top_languages);
        shares
    }
}

/// `numerator / denominator` to one decimal; 0 when the denominator is 0.
fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round_to_tenth(numerator as f64 / denominator as f64)
}

fn net_lines(added: u64, removed: u64) -> i64 {
    let net = added as i128 - removed as i128;
    net.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}
