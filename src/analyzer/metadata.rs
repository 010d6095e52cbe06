//! README description, framework and topic extraction.

use super::{HeuristicTables, ManifestKind, ManifestRule, Marker, MarkerRule};
use crate::models::DataStatus;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// README lines kept for the description.
const DESCRIPTION_LINES: usize = 3;

/// Descriptive metadata of one repository.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepositoryMetadata {
    pub description: Option<String>,
    pub frameworks: BTreeSet<String>,
    pub topics: BTreeSet<String>,
    pub status: DataStatus,
}

/// Extracts metadata from files at the repository root.
pub struct MetadataExtractor {
    /// Markdown cleanup passes, applied in order
    markdown_rules: Vec<(Regex, &'static str)>,
    description_max_chars: usize,
}

impl MetadataExtractor {
    pub fn new(description_max_chars: usize) -> Self {
        let markdown_rules = [
            (r"\[([^\]]+)\]\([^)]+\)", "$1"),
            (r"\*\*([^*]+)\*\*", "$1"),
            (r"\*([^*]+)\*", "$1"),
            (r"`([^`]+)`", "$1"),
        ]
        .into_iter()
        .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
        .collect();

        Self {
            markdown_rules,
            description_max_chars,
        }
    }

    /// Read all metadata for the repository at `root`.
    pub fn extract(&self, root: &Path, tables: &HeuristicTables) -> RepositoryMetadata {
        let mut status = DataStatus::Complete;

        let description = self.description(root, tables, &mut status);

        let mut frameworks = BTreeSet::new();
        for rule in &tables.manifest_rules {
            detect_manifest(root, rule, &mut frameworks, &mut status);
        }
        frameworks.extend(
            tables
                .marker_rules
                .iter()
                .filter(|rule| marker_present(root, rule))
                .map(|rule| rule.label.clone()),
        );

        let topics = infer_topics(root, tables);

        RepositoryMetadata {
            description,
            frameworks,
            topics,
            status,
        }
    }

    /// Description from the first readable README candidate.
    fn description(
        &self,
        root: &Path,
        tables: &HeuristicTables,
        status: &mut DataStatus,
    ) -> Option<String> {
        for name in &tables.readme_names {
            let path = root.join(name);
            if !path.is_file() {
                continue;
            }

            match fs::read_to_string(&path) {
                Ok(content) => return self.describe(&content),
                Err(e) => {
                    warn!("Cannot read {}: {}", path.display(), e);
                    status.degrade(format!("unreadable {}", name));
                }
            }
        }
        None
    }

    /// First prose lines of a README, stripped of markdown and truncated.
    pub fn describe(&self, content: &str) -> Option<String> {
        let lines: Vec<&str> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| !line.starts_with('#') && !line.starts_with("![") && !line.starts_with("[!["))
            .take(DESCRIPTION_LINES)
            .collect();

        let mut text = lines.join(" ");
        for (regex, replacement) in &self.markdown_rules {
            text = regex.replace_all(&text, *replacement).into_owned();
        }

        let text: String = text.chars().take(self.description_max_chars).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

fn detect_manifest(
    root: &Path,
    rule: &ManifestRule,
    frameworks: &mut BTreeSet<String>,
    status: &mut DataStatus,
) {
    let path = root.join(&rule.file);
    if !path.is_file() {
        return;
    }

    if let Some(tool) = &rule.presence {
        frameworks.insert(tool.clone());
    }

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Cannot read {}: {}", path.display(), e);
            status.degrade(format!("unreadable {}", rule.file));
            return;
        }
    };

    let found = match rule.kind {
        ManifestKind::PackageJson => match package_names(&content) {
            Ok(names) => match_names(&names, &rule.dependencies),
            Err(e) => {
                warn!("Cannot parse {}: {}", path.display(), e);
                status.degrade(format!("unparseable {}", rule.file));
                return;
            }
        },
        ManifestKind::PlainText => {
            let content = content.to_lowercase();
            rule.dependencies
                .iter()
                .filter(|(needle, _)| content.contains(needle.as_str()))
                .map(|(_, framework)| framework.clone())
                .collect()
        }
    };

    debug!("{} frameworks detected from {}", found.len(), rule.file);
    frameworks.extend(found);
}

/// Keys of `dependencies` and `devDependencies`, lower-cased.
fn package_names(content: &str) -> serde_json::Result<Vec<String>> {
    let manifest: serde_json::Value = serde_json::from_str(content)?;

    Ok(["dependencies", "devDependencies"]
        .iter()
        .filter_map(|section| manifest.get(section).and_then(|deps| deps.as_object()))
        .flat_map(|deps| deps.keys().map(|name| name.to_lowercase()))
        .collect())
}

fn match_names(names: &[String], dependencies: &[(String, String)]) -> Vec<String> {
    dependencies
        .iter()
        .filter(|(needle, _)| names.iter().any(|name| name.contains(needle.as_str())))
        .map(|(_, framework)| framework.clone())
        .collect()
}

fn marker_present(root: &Path, rule: &MarkerRule) -> bool {
    rule.any_of.iter().any(|marker| match marker {
        Marker::Path(rel) => root.join(rel).exists(),
        Marker::Extension(ext) => has_root_file_with_extension(root, ext),
    })
}

fn has_root_file_with_extension(root: &Path, ext: &str) -> bool {
    let Ok(entries) = fs::read_dir(root) else {
        return false;
    };

    entries.flatten().any(|entry| {
        let path = entry.path();
        path.is_file()
            && path
                .extension()
                .is_some_and(|e| e.to_string_lossy().eq_ignore_ascii_case(ext))
    })
}

fn infer_topics(root: &Path, tables: &HeuristicTables) -> BTreeSet<String> {
    if !root.join(&tables.topic_gate).is_dir() {
        return BTreeSet::new();
    }

    tables
        .topic_rules
        .iter()
        .filter(|rule| marker_present(root, rule))
        .map(|rule| rule.label.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn extract(root: &Path) -> RepositoryMetadata {
        MetadataExtractor::new(500).extract(root, &HeuristicTables::default())
    }

    #[test]
    fn test_describe_skips_headings_and_badges() {
        let extractor = MetadataExtractor::new(500);
        let readme = "# Tool\n\n[![CI](https://ci/badge.svg)](https://ci)\n![logo](logo.png)\n\
                      A **fast** tool for [parsing](https://docs.example) `logs`.\n\
                      Works *offline*.\n\nSecond paragraph.\nIgnored fourth line.\n";

        assert_eq!(
            extractor.describe(readme).as_deref(),
            Some("A fast tool for parsing logs. Works offline. Second paragraph.")
        );
    }

    #[test]
    fn test_describe_truncates_by_characters() {
        let extractor = MetadataExtractor::new(5);
        assert_eq!(extractor.describe("héllo wörld").as_deref(), Some("héllo"));
    }

    #[test]
    fn test_describe_empty_readme() {
        let extractor = MetadataExtractor::new(500);
        assert_eq!(extractor.describe("# Only a title\n\n"), None);
    }

    #[test]
    fn test_readme_priority() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "README", "plain readme");
        write(dir.path(), "README.md", "markdown readme");

        assert_eq!(extract(dir.path()).description.as_deref(), Some("markdown readme"));
    }

    #[test]
    fn test_package_json_frameworks() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "package.json",
            r#"{"dependencies": {"react-dom": "^18", "express": "4"}, "devDependencies": {"jest": "29"}}"#,
        );

        let metadata = extract(dir.path());
        assert_eq!(
            metadata.frameworks,
            BTreeSet::from(["React".to_string(), "Express.js".to_string(), "Jest".to_string()])
        );
        assert!(metadata.status.is_complete());
    }

    #[test]
    fn test_malformed_package_json_degrades() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "package.json", "{ not json");
        write(dir.path(), "requirements.txt", "Django==4.2\nnumpy\n");

        let metadata = extract(dir.path());
        assert!(matches!(metadata.status, DataStatus::Partial { .. }));
        assert_eq!(
            metadata.frameworks,
            BTreeSet::from(["Django".to_string(), "NumPy".to_string()])
        );
    }

    #[test]
    fn test_presence_and_marker_frameworks() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Cargo.toml", "[dependencies]\ntokio = \"1\"\n");
        write(dir.path(), "go.mod", "require github.com/spf13/cobra v1.8.0\n");
        write(dir.path(), "docker-compose.yaml", "services: {}\n");
        write(dir.path(), "k8s/deploy.yml", "kind: Deployment\n");
        write(dir.path(), "main.tf", "provider \"aws\" {}\n");

        let frameworks = extract(dir.path()).frameworks;
        for expected in ["Cargo", "Tokio", "Cobra", "Docker", "Kubernetes", "Terraform"] {
            assert!(frameworks.contains(expected), "missing {}", expected);
        }
        assert!(!frameworks.contains("Serde"));
    }

    #[test]
    fn test_nested_tf_file_is_not_terraform() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "infra/main.tf", "");
        assert!(!extract(dir.path()).frameworks.contains("Terraform"));
    }

    #[test]
    fn test_topics_require_github_dir() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "Dockerfile", "FROM scratch\n");
        write(dir.path(), "requirements.txt", "flask\n");
        assert!(extract(dir.path()).topics.is_empty());

        write(dir.path(), ".github/workflows/ci.yml", "on: push\n");
        assert_eq!(
            extract(dir.path()).topics,
            BTreeSet::from([
                "docker".to_string(),
                "github-actions".to_string(),
                "python".to_string()
            ])
        );
    }
}
