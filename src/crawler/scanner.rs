//! Depth-bounded discovery of repositories under a root directory.

use super::GitOperations;
use crate::config::ScanConfig;
use crate::error::{Result, VitaeError};
use crate::models::RepositoryHandle;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Decides whether a directory is a repository root and describes it.
pub trait RepositoryProbe {
    /// Whether `path` is the root of a repository.
    fn is_repository(&self, path: &Path) -> bool;

    /// Build the handle for a confirmed repository root.
    fn describe(&self, path: &Path) -> RepositoryHandle;
}

/// Probe backed by git2.
#[derive(Debug, Clone)]
pub struct GitProbe {
    public_hosts: Vec<String>,
}

impl GitProbe {
    pub fn new(public_hosts: Vec<String>) -> Self {
        Self { public_hosts }
    }
}

impl RepositoryProbe for GitProbe {
    fn is_repository(&self, path: &Path) -> bool {
        GitOperations::is_repository(path)
    }

    fn describe(&self, path: &Path) -> RepositoryHandle {
        GitOperations::describe(path, &self.public_hosts)
    }
}

/// Traversal limits for a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub max_depth: usize,
    pub include_hidden: bool,
    pub ignore_patterns: Vec<String>,
}

impl From<&ScanConfig> for ScanOptions {
    fn from(config: &ScanConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            include_hidden: config.include_hidden,
            ignore_patterns: config.ignore_patterns.clone(),
        }
    }
}

/// Walks a directory tree and collects repository handles.
///
/// Repositories are leaves: once a directory is a repository root, nothing
/// below it is visited.
pub struct RepoScanner<P = GitProbe> {
    options: ScanOptions,
    probe: P,
}

impl RepoScanner<GitProbe> {
    /// Create a git-backed scanner from configuration.
    pub fn new(config: &ScanConfig) -> Self {
        Self::with_probe(
            ScanOptions::from(config),
            GitProbe::new(config.public_hosts.clone()),
        )
    }
}

impl<P: RepositoryProbe> RepoScanner<P> {
    pub fn with_probe(options: ScanOptions, probe: P) -> Self {
        Self { options, probe }
    }

    /// Find all repositories under `root`.
    ///
    /// Only an inaccessible root is an error; unreadable subdirectories are
    /// logged and skipped.
    pub fn scan(&self, root: &Path) -> Result<Vec<RepositoryHandle>> {
        let metadata = fs::metadata(root).map_err(|e| VitaeError::scan_root(root, e))?;
        if !metadata.is_dir() {
            return Err(VitaeError::scan_root(root, "not a directory"));
        }
        let root = fs::canonicalize(root).map_err(|e| VitaeError::scan_root(root, e))?;

        info!("Scanning for repositories in {}", root.display());

        let mut repositories = Vec::new();
        self.scan_dir(&root, 0, &mut repositories)?;

        info!("Found {} repositories", repositories.len());
        Ok(repositories)
    }

    fn scan_dir(&self, path: &Path, depth: usize, out: &mut Vec<RepositoryHandle>) -> Result<()> {
        if depth > self.options.max_depth {
            return Ok(());
        }

        if depth > 0 && !self.options.include_hidden && is_hidden(path) {
            debug!("Skipping hidden directory: {}", path.display());
            return Ok(());
        }

        if self.is_ignored(path) {
            debug!("Skipping ignored directory: {}", path.display());
            return Ok(());
        }

        if self.probe.is_repository(path) {
            debug!("Found repository: {}", path.display());
            out.push(self.probe.describe(path));
            return Ok(());
        }

        for child in self.child_dirs(path, depth)? {
            self.scan_dir(&child, depth + 1, out)?;
        }

        Ok(())
    }

    /// Subdirectories of `path`, sorted by name. Symlinks are not followed.
    fn child_dirs(&self, path: &Path, depth: usize) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(path) {
            Ok(entries) => entries,
            Err(e) if depth == 0 => return Err(VitaeError::scan_root(path, e)),
            Err(e) => {
                warn!("Cannot read directory {}: {}", path.display(), e);
                return Ok(Vec::new());
            }
        };

        let mut dirs = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Error accessing entry in {}: {}", path.display(), e);
                    continue;
                }
            };
            match entry.file_type() {
                Ok(file_type) if file_type.is_dir() => dirs.push(entry.path()),
                Ok(_) => {}
                Err(e) => warn!("Cannot stat {}: {}", entry.path().display(), e),
            }
        }

        dirs.sort();
        Ok(dirs)
    }

    fn is_ignored(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.options
            .ignore_patterns
            .iter()
            .any(|pattern| !pattern.is_empty() && path_str.contains(pattern.as_str()))
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;

    /// Treats directories containing a `REPO` marker file as repositories
    /// and records every probed path.
    #[derive(Default)]
    struct MarkerProbe {
        probed: RefCell<Vec<PathBuf>>,
    }

    impl RepositoryProbe for MarkerProbe {
        fn is_repository(&self, path: &Path) -> bool {
            self.probed.borrow_mut().push(path.to_path_buf());
            path.join("REPO").is_file()
        }

        fn describe(&self, path: &Path) -> RepositoryHandle {
            RepositoryHandle::new(path)
        }
    }

    fn options(max_depth: usize) -> ScanOptions {
        ScanOptions {
            max_depth,
            include_hidden: false,
            ignore_patterns: vec!["node_modules".to_string()],
        }
    }

    fn mkrepo(path: &Path) {
        fs::create_dir_all(path).unwrap();
        fs::write(path.join("REPO"), "").unwrap();
    }

    fn depth_of(root: &Path, path: &Path) -> usize {
        path.strip_prefix(root).unwrap().components().count()
    }

    fn names(handles: &[RepositoryHandle]) -> HashSet<String> {
        handles.iter().map(|h| h.name.clone()).collect()
    }

    #[test]
    fn test_finds_repositories_within_depth() {
        let dir = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        mkrepo(&root.join("alpha"));
        mkrepo(&root.join("group").join("beta"));
        mkrepo(&root.join("a").join("b").join("c").join("gamma"));

        let scanner = RepoScanner::with_probe(options(2), MarkerProbe::default());
        let found = scanner.scan(&root).unwrap();

        assert_eq!(
            names(&found),
            HashSet::from(["alpha".to_string(), "beta".to_string()])
        );
    }

    #[test]
    fn test_never_probes_beyond_max_depth() {
        let dir = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        fs::create_dir_all(root.join("a").join("b").join("c").join("d")).unwrap();

        for max_depth in 0..4 {
            let probe = MarkerProbe::default();
            let scanner = RepoScanner::with_probe(options(max_depth), probe);
            scanner.scan(&root).unwrap();

            let probed = scanner.probe.probed.borrow();
            assert!(!probed.is_empty());
            assert!(probed.iter().all(|p| depth_of(&root, p) <= max_depth));
        }
    }

    #[test]
    fn test_depth_zero_probes_root_only() {
        let dir = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        mkrepo(&root.join("child"));

        let scanner = RepoScanner::with_probe(options(0), MarkerProbe::default());
        assert!(scanner.scan(&root).unwrap().is_empty());
        assert_eq!(*scanner.probe.probed.borrow(), vec![root.clone()]);
    }

    #[test]
    fn test_does_not_descend_into_repositories() {
        let dir = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        let outer = root.join("outer");
        mkrepo(&outer);
        mkrepo(&outer.join("vendor").join("inner"));

        let scanner = RepoScanner::with_probe(options(5), MarkerProbe::default());
        let found = scanner.scan(&root).unwrap();

        assert_eq!(names(&found), HashSet::from(["outer".to_string()]));
        let probed = scanner.probe.probed.borrow();
        assert!(probed.iter().all(|p| !p.starts_with(&outer) || p == &outer));
    }

    #[test]
    fn test_skips_hidden_and_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        mkrepo(&root.join(".hidden-repo"));
        mkrepo(&root.join("node_modules").join("pkg"));
        mkrepo(&root.join("visible"));

        let scanner = RepoScanner::with_probe(options(3), MarkerProbe::default());
        let found = scanner.scan(&root).unwrap();
        assert_eq!(names(&found), HashSet::from(["visible".to_string()]));

        let probed = scanner.probe.probed.borrow();
        assert!(probed.iter().all(|p| !p.to_string_lossy().contains("node_modules")));
        assert!(probed.iter().all(|p| !p.to_string_lossy().contains(".hidden-repo")));
    }

    #[test]
    fn test_include_hidden() {
        let dir = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        mkrepo(&root.join(".dotfiles"));

        let mut opts = options(2);
        opts.include_hidden = true;
        let scanner = RepoScanner::with_probe(opts, MarkerProbe::default());
        let found = scanner.scan(&root).unwrap();
        assert_eq!(names(&found), HashSet::from([".dotfiles".to_string()]));
    }

    #[test]
    fn test_root_itself_may_be_a_repository() {
        let dir = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        mkrepo(&root);
        mkrepo(&root.join("nested"));

        let scanner = RepoScanner::with_probe(options(3), MarkerProbe::default());
        let found = scanner.scan(&root).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, root);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let scanner = RepoScanner::with_probe(options(3), MarkerProbe::default());
        let result = scanner.scan(&dir.path().join("does-not-exist"));
        assert!(matches!(result, Err(VitaeError::ScanRoot { .. })));
    }

    #[test]
    fn test_file_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();

        let scanner = RepoScanner::with_probe(options(3), MarkerProbe::default());
        assert!(matches!(scanner.scan(&file), Err(VitaeError::ScanRoot { .. })));
    }

    #[test]
    fn test_git_scanner_finds_real_repositories() {
        let dir = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        git2::Repository::init(root.join("projects").join("tool")).unwrap();
        fs::create_dir_all(root.join("plain").join("folder")).unwrap();

        let scanner = RepoScanner::new(&ScanConfig::default());
        let found = scanner.scan(&root).unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "tool");
        assert!(found[0].is_private);
    }
}
