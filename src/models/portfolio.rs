//! Anonymized per-project records and the cross-project aggregate.
//!
//! Nothing in this module carries repository names, paths, remotes or
//! contributor identities; these are the only types handed to external
//! text generation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Coarse project category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    FullstackWeb,
    FrontendWeb,
    WebDevelopment,
    MobileDevelopment,
    DataScience,
    SystemsProgramming,
    DevopsInfrastructure,
    DesktopApplication,
    GeneralSoftware,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::FullstackWeb => "fullstack_web",
            ProjectType::FrontendWeb => "frontend_web",
            ProjectType::WebDevelopment => "web_development",
            ProjectType::MobileDevelopment => "mobile_development",
            ProjectType::DataScience => "data_science",
            ProjectType::SystemsProgramming => "systems_programming",
            ProjectType::DevopsInfrastructure => "devops_infrastructure",
            ProjectType::DesktopApplication => "desktop_application",
            ProjectType::GeneralSoftware => "general_software",
        }
    }
}

/// Activity tier derived from total commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ActivityTier {
    #[serde(rename = "minimal_activity")]
    Minimal,
    #[serde(rename = "low_activity")]
    Low,
    #[serde(rename = "medium_activity")]
    Medium,
    #[serde(rename = "high_activity")]
    High,
}

impl ActivityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityTier::Minimal => "minimal_activity",
            ActivityTier::Low => "low_activity",
            ActivityTier::Medium => "medium_activity",
            ActivityTier::High => "high_activity",
        }
    }
}

/// Size tier derived from file count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SizeTier {
    #[serde(rename = "minimal_project")]
    Minimal,
    #[serde(rename = "small_project")]
    Small,
    #[serde(rename = "medium_project")]
    Medium,
    #[serde(rename = "large_project")]
    Large,
}

impl SizeTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeTier::Minimal => "minimal_project",
            SizeTier::Small => "small_project",
            SizeTier::Medium => "medium_project",
            SizeTier::Large => "large_project",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(ProjectType, ActivityTier, SizeTier);

/// Commit rhythm of one project, without timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRhythm {
    pub total_commits: u64,
    pub average_commits_per_month: f64,
    pub active_months: usize,
}

/// Sanitized summary of one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnonymizedRecord {
    /// Positional identifier (`project_1`, `project_2`, ...)
    pub project_id: String,

    pub languages: BTreeMap<String, f64>,
    pub frameworks: Vec<String>,
    pub total_commits: u64,
    pub file_count: u64,
    pub contributor_count: usize,
    pub estimated_lines_added: u64,
    pub estimated_lines_removed: u64,
    pub project_type: ProjectType,
    pub activity_level: ActivityTier,
    pub size_category: SizeTier,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_stats: Option<CommitRhythm>,
}

/// Portfolio-wide totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub total_projects: usize,
    pub total_commits: u64,
    pub estimated_total_lines_added: u64,
    pub estimated_total_lines_removed: u64,

    /// Projects with more than five commits
    pub active_projects: usize,
}

/// One entry of the portfolio language distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageShare {
    pub language: String,
    pub percentage: f64,
}

/// Languages, tools and category histograms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalProfile {
    /// Highest share first
    pub primary_languages: Vec<LanguageShare>,
    pub frameworks_and_tools: Vec<String>,
    pub project_type_distribution: BTreeMap<ProjectType, usize>,
    pub activity_level_distribution: BTreeMap<ActivityTier, usize>,
    pub project_size_distribution: BTreeMap<SizeTier, usize>,
}

/// Output volume per commit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeProductivity {
    /// Estimated lines added per commit
    pub lines_per_commit: f64,
    /// Estimated added minus removed
    pub net_lines: i64,
}

/// Derived ratios over the portfolio.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DevelopmentPatterns {
    pub average_commits_per_project: f64,
    pub average_files_per_project: f64,
    pub code_productivity: CodeProductivity,
}

/// Cross-project rollup handed to external text generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub summary_statistics: SummaryStatistics,
    pub technical_profile: TechnicalProfile,
    pub development_patterns: DevelopmentPatterns,
}

/// Records plus aggregate, as emitted by the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPayload {
    pub records: Vec<AnonymizedRecord>,
    pub summary: AggregateSummary,
}
