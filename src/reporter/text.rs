//! Human-readable text reporter.

use super::{Report, Reporter};
use crate::models::{DataStatus, PortfolioPayload, RepositoryHandle, RepositoryMetrics};
use std::collections::BTreeMap;
use std::fmt::Display;

/// Text format reporter for terminal output.
pub struct TextReporter {
    /// Use colors in output
    use_colors: bool,

    /// Languages listed per repository (0 = unlimited)
    max_languages: usize,
}

impl TextReporter {
    /// Create a new text reporter.
    pub fn new() -> Self {
        Self {
            use_colors: true,
            max_languages: 5,
        }
    }

    /// Disable colors.
    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    fn reset(&self) -> &'static str {
        if self.use_colors {
            "\x1b[0m"
        } else {
            ""
        }
    }

    fn bold(&self) -> &'static str {
        if self.use_colors {
            "\x1b[1m"
        } else {
            ""
        }
    }

    fn dim(&self) -> &'static str {
        if self.use_colors {
            "\x1b[2m"
        } else {
            ""
        }
    }

    fn warn(&self) -> &'static str {
        if self.use_colors {
            "\x1b[33m"
        } else {
            ""
        }
    }

    fn heading(&self, output: &mut String, title: &str) {
        output.push_str(&format!("\n{}=== {} ==={}\n\n", self.bold(), title, self.reset()));
    }

    fn section(&self, output: &mut String, title: &str) {
        output.push_str(&format!("{}--- {} ---{}\n", self.bold(), title, self.reset()));
    }

    fn field(&self, output: &mut String, label: &str, value: impl Display) {
        output.push_str(&format!("  {}{}:{} {}\n", self.dim(), label, self.reset(), value));
    }

    fn repositories(&self, output: &mut String, handles: &[RepositoryHandle]) {
        self.heading(output, "Repositories");

        if handles.is_empty() {
            output.push_str(&format!("{}No repositories found.{}\n", self.dim(), self.reset()));
            return;
        }

        for handle in handles {
            let visibility = if handle.is_private { "private" } else { "public" };
            output.push_str(&format!(
                "{}{}{} ({})\n",
                self.bold(),
                handle.name,
                self.reset(),
                visibility
            ));
            self.field(output, "Path", handle.path.display());
            if let Some(remote) = &handle.remote_url {
                self.field(output, "Remote", remote);
            }
            if let Some(last) = handle.last_commit {
                self.field(output, "Last commit", last.format("%Y-%m-%d"));
            }
        }

        output.push_str(&format!("\nFound {} repositories\n", handles.len()));
    }

    fn metrics(&self, output: &mut String, all: &[RepositoryMetrics]) {
        self.heading(output, "Repository Analysis");

        if all.is_empty() {
            output.push_str(&format!("{}No repositories analyzed.{}\n", self.dim(), self.reset()));
            return;
        }

        for metrics in all {
            self.section(output, &metrics.repository.name);
            self.field(output, "Path", metrics.repository.path.display());
            if let Some(description) = &metrics.description {
                self.field(output, "Description", description);
            }
            self.field(output, "Files", metrics.file_count);
            if !metrics.languages.is_empty() {
                self.field(output, "Languages", self.language_list(&metrics.languages));
            }
            self.field(output, "Commits", metrics.total_commits);
            if let Some(stats) = &metrics.commit_stats {
                self.field(output, "Own commits", stats.author_commits);
                self.field(
                    output,
                    "Commits/month",
                    format!("{} over {} active months", stats.average_commits_per_month, stats.active_months()),
                );
            }
            self.field(output, "Contributors", metrics.contributors.len());
            self.field(
                output,
                "Lines (est.)",
                format!(
                    "+{} / -{} (sampled {} of {} commits)",
                    metrics.line_changes.added,
                    metrics.line_changes.removed,
                    metrics.line_changes.sampled_commits,
                    metrics.line_changes.total_commits
                ),
            );
            if !metrics.frameworks.is_empty() {
                self.field(output, "Frameworks", join(&metrics.frameworks));
            }
            if !metrics.topics.is_empty() {
                self.field(output, "Topics", join(&metrics.topics));
            }

            let status = &metrics.status;
            for (source, state) in [
                ("files", &status.files),
                ("history", &status.history),
                ("line changes", &status.line_changes),
                ("metadata", &status.metadata),
            ] {
                if let Some(note) = status_note(state) {
                    output.push_str(&format!(
                        "  {}! {} {}{}\n",
                        self.warn(),
                        source,
                        note,
                        self.reset()
                    ));
                }
            }
            output.push('\n');
        }
    }

    fn portfolio(&self, output: &mut String, payload: &PortfolioPayload) {
        let summary = &payload.summary;
        let stats = &summary.summary_statistics;
        let profile = &summary.technical_profile;
        let patterns = &summary.development_patterns;

        self.heading(output, "Portfolio Summary");

        self.section(output, "Totals");
        self.field(output, "Projects", stats.total_projects);
        self.field(output, "Active projects", stats.active_projects);
        self.field(output, "Commits", stats.total_commits);
        self.field(output, "Lines added (est.)", stats.estimated_total_lines_added);
        self.field(output, "Lines removed (est.)", stats.estimated_total_lines_removed);
        output.push('\n');

        self.section(output, "Technical Profile");
        for share in &profile.primary_languages {
            output.push_str(&format!("  {:<14} {:>5.1}%\n", share.language, share.percentage));
        }
        if !profile.frameworks_and_tools.is_empty() {
            self.field(output, "Frameworks & tools", profile.frameworks_and_tools.join(", "));
        }
        self.field(output, "Project types", histogram(&profile.project_type_distribution));
        self.field(output, "Activity", histogram(&profile.activity_level_distribution));
        self.field(output, "Size", histogram(&profile.project_size_distribution));
        output.push('\n');

        self.section(output, "Development Patterns");
        self.field(output, "Commits per project", patterns.average_commits_per_project);
        self.field(output, "Files per project", patterns.average_files_per_project);
        self.field(
            output,
            "Lines per commit (est.)",
            patterns.code_productivity.lines_per_commit,
        );
        self.field(output, "Net lines (est.)", patterns.code_productivity.net_lines);
    }

    fn language_list(&self, languages: &BTreeMap<String, f64>) -> String {
        let mut sorted: Vec<(&String, &f64)> = languages.iter().collect();
        sorted.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));
        if self.max_languages > 0 {
            sorted.truncate(self.max_languages);
        }

        sorted
            .iter()
            .map(|(lang, pct)| format!("{} {:.1}%", lang, pct))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for TextReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for TextReporter {
    fn generate(&self, report: &Report<'_>) -> String {
        let mut output = String::new();
        match report {
            Report::Repositories(handles) => self.repositories(&mut output, handles),
            Report::Metrics(metrics) => self.metrics(&mut output, metrics),
            Report::Portfolio(payload) => self.portfolio(&mut output, payload),
        }
        output
    }
}

fn join<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    items
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn histogram<K: Display>(counts: &BTreeMap<K, usize>) -> String {
    if counts.is_empty() {
        return "-".to_string();
    }
    counts
        .iter()
        .map(|(label, count)| format!("{} {}", label, count))
        .collect::<Vec<_>>()
        .join(", ")
}

fn status_note(status: &DataStatus) -> Option<String> {
    match status {
        DataStatus::Complete => None,
        DataStatus::Partial { reason } => Some(format!("partial: {}", reason)),
        DataStatus::Unavailable { reason } => Some(format!("unavailable: {}", reason)),
    }
}
