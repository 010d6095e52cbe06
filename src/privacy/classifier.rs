//! Project type, activity and size classification.
//!
//! Each classification is an ordered list of rules; the first rule that
//! matches decides the label.

use crate::models::{ActivityTier, ProjectType, SizeTier};
use std::collections::HashSet;

/// Condition over a project's lower-cased language and framework names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// At least one of the languages is present
    AnyLanguage(Vec<String>),
    /// At least one of the frameworks is present
    AnyFramework(Vec<String>),
    /// Every inner predicate holds
    All(Vec<Predicate>),
}

impl Predicate {
    fn any_language(names: &[&str]) -> Self {
        Predicate::AnyLanguage(names.iter().map(|s| s.to_string()).collect())
    }

    fn any_framework(names: &[&str]) -> Self {
        Predicate::AnyFramework(names.iter().map(|s| s.to_string()).collect())
    }

    /// Evaluate against lower-cased name sets.
    pub fn matches(&self, languages: &HashSet<String>, frameworks: &HashSet<String>) -> bool {
        match self {
            Predicate::AnyLanguage(names) => names.iter().any(|n| languages.contains(n)),
            Predicate::AnyFramework(names) => names.iter().any(|n| frameworks.contains(n)),
            Predicate::All(inner) => inner.iter().all(|p| p.matches(languages, frameworks)),
        }
    }
}

/// Ordered classification tables.
#[derive(Debug, Clone)]
pub struct ClassificationRules {
    /// First match wins
    pub project_types: Vec<(Predicate, ProjectType)>,
    /// Label when no type rule matches
    pub fallback_type: ProjectType,
    /// Minimum commit count per tier, highest threshold first
    pub activity_tiers: Vec<(u64, ActivityTier)>,
    /// Minimum file count per tier, highest threshold first
    pub size_tiers: Vec<(u64, SizeTier)>,
}

impl Default for ClassificationRules {
    fn default() -> Self {
        let web = Predicate::any_language(&["javascript", "typescript", "html", "css"]);
        let frontend = Predicate::any_framework(&["react", "vue", "vue.js", "angular", "next.js"]);
        let backend =
            Predicate::any_framework(&["express", "express.js", "fastapi", "django", "flask"]);

        let project_types = vec![
            (
                Predicate::All(vec![web.clone(), frontend.clone(), backend.clone()]),
                ProjectType::FullstackWeb,
            ),
            (
                Predicate::All(vec![web.clone(), frontend]),
                ProjectType::FrontendWeb,
            ),
            (
                Predicate::All(vec![web.clone(), backend]),
                ProjectType::FullstackWeb,
            ),
            (web, ProjectType::WebDevelopment),
            (
                Predicate::any_language(&["swift", "kotlin", "dart"]),
                ProjectType::MobileDevelopment,
            ),
            (
                Predicate::any_framework(&[
                    "pandas",
                    "numpy",
                    "tensorflow",
                    "pytorch",
                    "scikit-learn",
                ]),
                ProjectType::DataScience,
            ),
            (
                Predicate::any_language(&["c", "c++", "rust", "go"]),
                ProjectType::SystemsProgramming,
            ),
            (
                Predicate::any_framework(&["docker", "kubernetes", "terraform"]),
                ProjectType::DevopsInfrastructure,
            ),
            (
                Predicate::any_language(&["java", "c#", "python"]),
                ProjectType::DesktopApplication,
            ),
        ];

        Self {
            project_types,
            fallback_type: ProjectType::GeneralSoftware,
            activity_tiers: vec![
                (500, ActivityTier::High),
                (100, ActivityTier::Medium),
                (10, ActivityTier::Low),
                (0, ActivityTier::Minimal),
            ],
            size_tiers: vec![
                (1000, SizeTier::Large),
                (100, SizeTier::Medium),
                (10, SizeTier::Small),
                (0, SizeTier::Minimal),
            ],
        }
    }
}

impl ClassificationRules {
    /// Project type from language and framework names (any case).
    pub fn project_type<'a>(
        &self,
        languages: impl IntoIterator<Item = &'a str>,
        frameworks: impl IntoIterator<Item = &'a str>,
    ) -> ProjectType {
        let languages: HashSet<String> = languages.into_iter().map(str::to_lowercase).collect();
        let frameworks: HashSet<String> = frameworks.into_iter().map(str::to_lowercase).collect();

        self.project_types
            .iter()
            .find(|(predicate, _)| predicate.matches(&languages, &frameworks))
            .map(|(_, label)| *label)
            .unwrap_or(self.fallback_type)
    }

    pub fn activity_tier(&self, total_commits: u64) -> ActivityTier {
        first_tier(&self.activity_tiers, total_commits).unwrap_or(ActivityTier::Minimal)
    }

    pub fn size_tier(&self, file_count: u64) -> SizeTier {
        first_tier(&self.size_tiers, file_count).unwrap_or(SizeTier::Minimal)
    }
}

fn first_tier<T: Copy>(tiers: &[(u64, T)], value: u64) -> Option<T> {
    tiers
        .iter()
        .find(|(threshold, _)| value >= *threshold)
        .map(|(_, tier)| *tier)
}
