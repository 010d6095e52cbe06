//! File counting and extension-based language breakdown.

use super::HeuristicTables;
use crate::models::DataStatus;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Counted files of one repository, grouped by language.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileBreakdown {
    pub file_count: u64,
    pub language_counts: BTreeMap<String, u64>,
    pub status: DataStatus,
}

impl FileBreakdown {
    /// Share of counted files per language, in tenths of a percent.
    ///
    /// Shares are floored to one decimal and the leftover tenths go to the
    /// largest remainders (ties in name order), so the values always sum to
    /// 100.0 and each stays within 0.1 of the exact share. Empty when no
    /// file was counted.
    pub fn percentages(&self) -> BTreeMap<String, f64> {
        if self.file_count == 0 {
            return BTreeMap::new();
        }

        let total = u128::from(self.file_count);
        let mut tenths: Vec<(&String, u128, u128)> = self
            .language_counts
            .iter()
            .map(|(lang, count)| {
                let scaled = u128::from(*count) * 1000;
                (lang, scaled / total, scaled % total)
            })
            .collect();

        let assigned: u128 = tenths.iter().map(|(_, floor, _)| floor).sum();
        let leftover = 1000u128.saturating_sub(assigned) as usize;

        let mut order: Vec<usize> = (0..tenths.len()).collect();
        order.sort_by(|&a, &b| tenths[b].2.cmp(&tenths[a].2));
        for &idx in order.iter().take(leftover) {
            if tenths[idx].2 > 0 {
                tenths[idx].1 += 1;
            }
        }

        tenths
            .into_iter()
            .map(|(lang, share, _)| (lang.clone(), share as f64 / 10.0))
            .collect()
    }
}

/// Walk the repository and classify every counted file.
pub fn classify_files(repo_path: &Path, tables: &HeuristicTables) -> FileBreakdown {
    let mut breakdown = FileBreakdown::default();
    let mut unreadable = 0usize;

    let walker = WalkDir::new(repo_path)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_ignored_dir(entry, tables));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry under {}: {}", repo_path.display(), e);
                unreadable += 1;
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_counted_file(entry.path(), tables) {
            continue;
        }

        let extension = entry.path().extension().and_then(|e| e.to_str());
        let language = tables.language_for_extension(extension);

        breakdown.file_count += 1;
        *breakdown
            .language_counts
            .entry(language.to_string())
            .or_insert(0) += 1;
    }

    if unreadable > 0 {
        warn!(
            "Skipped {} unreadable entries in {}",
            unreadable,
            repo_path.display()
        );
        breakdown
            .status
            .degrade(format!("{} unreadable entries skipped", unreadable));
    }

    breakdown
}

fn is_ignored_dir(entry: &DirEntry, tables: &HeuristicTables) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && tables
            .ignored_dirs
            .contains(entry.file_name().to_string_lossy().as_ref())
}

fn is_counted_file(path: &Path, tables: &HeuristicTables) -> bool {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase());

    if let Some(ext) = &extension {
        if tables.ignored_extensions.contains(ext) {
            return false;
        }
    }

    let hidden = path
        .file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false);

    if hidden {
        return extension
            .map(|ext| tables.hidden_source_extensions.contains(&ext))
            .unwrap_or(false);
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;

    fn write(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_counts_languages() {
        let dir = tempfile::tempdir().unwrap();
        for rel in ["src/main.py", "src/util.py", "web/app.js", "README.md"] {
            write(dir.path(), rel);
        }

        let breakdown = classify_files(dir.path(), &HeuristicTables::default());
        assert_eq!(breakdown.file_count, 4);
        assert!(breakdown.status.is_complete());

        let pct = breakdown.percentages();
        assert_eq!(pct["Python"], 50.0);
        assert_eq!(pct["JavaScript"], 25.0);
        assert_eq!(pct["Markdown"], 25.0);
    }

    #[test]
    fn test_excludes_ignored_dirs_extensions_and_hidden() {
        let dir = tempfile::tempdir().unwrap();
        for rel in [
            "main.rs",
            "node_modules/lib/index.js",
            "build/out.rs",
            ".git/config",
            "src/__pycache__/mod.py",
            "native.so",
            "cache.pyc",
            ".env",
            ".eslintrc.js",
            "Makefile",
        ] {
            write(dir.path(), rel);
        }

        let breakdown = classify_files(dir.path(), &HeuristicTables::default());
        // main.rs, .eslintrc.js, Makefile
        assert_eq!(breakdown.file_count, 3);
        assert_eq!(breakdown.language_counts["Rust"], 1);
        assert_eq!(breakdown.language_counts["JavaScript"], 1);
        assert_eq!(breakdown.language_counts["Other"], 1);
    }

    #[test]
    fn test_ignored_name_only_applies_below_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("build");
        write(&root, "lib.go");

        let breakdown = classify_files(&root, &HeuristicTables::default());
        assert_eq!(breakdown.file_count, 1);
    }

    #[test]
    fn test_empty_repository_has_no_languages() {
        let dir = tempfile::tempdir().unwrap();
        let breakdown = classify_files(dir.path(), &HeuristicTables::default());
        assert_eq!(breakdown.file_count, 0);
        assert!(breakdown.percentages().is_empty());
    }

    #[test]
    fn test_percentages_sum_to_hundred_with_many_singletons() {
        let breakdown = FileBreakdown {
            file_count: 6,
            language_counts: (0..6).map(|i| (format!("Lang{}", i), 1)).collect(),
            status: DataStatus::Complete,
        };

        let pct = breakdown.percentages();
        let total: f64 = pct.values().sum();
        assert!((total - 100.0).abs() < 1e-9, "sum was {}", total);
        // 16.666.. each: all floor to 16.6, the first four in name order get the leftover tenths
        assert_eq!(pct.values().filter(|v| **v == 16.7).count(), 4);
        assert_eq!(pct.values().filter(|v| **v == 16.6).count(), 2);
    }

    proptest! {
        #[test]
        fn prop_percentages_sum_to_hundred(counts in prop::collection::vec(1u64..500, 1..12)) {
            let breakdown = FileBreakdown {
                file_count: counts.iter().sum(),
                language_counts: counts
                    .iter()
                    .enumerate()
                    .map(|(i, c)| (format!("Lang{:02}", i), *c))
                    .collect(),
                status: DataStatus::Complete,
            };
            let total_files = breakdown.file_count as f64;

            let pct = breakdown.percentages();
            let total: f64 = pct.values().sum();
            prop_assert!((total - 100.0).abs() <= 0.1, "sum was {}", total);

            for (i, c) in counts.iter().enumerate() {
                let rounded = (*c as f64 / total_files * 1000.0).round() / 10.0;
                let share = pct[&format!("Lang{:02}", i)];
                prop_assert!((share - rounded).abs() <= 0.1 + 1e-9);
            }
        }
    }
}
