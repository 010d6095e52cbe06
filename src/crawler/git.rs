//! Git operations using git2.

use crate::error::Result;
use crate::models::RepositoryHandle;
use chrono::{DateTime, Utc};
use git2::{ErrorCode, Repository, Sort};
use std::path::Path;
use tracing::{debug, warn};

/// One commit as seen by history aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub author_name: String,
    pub author_email: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Insertion/deletion totals of a single commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStat {
    pub insertions: u64,
    pub deletions: u64,
}

/// The author identity configured for the local user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Identity {
    /// Whether a commit author is this identity.
    ///
    /// Emails are compared case-insensitively; names are only used when no
    /// email is configured.
    pub fn matches(&self, name: &str, email: Option<&str>) -> bool {
        match (&self.email, email) {
            (Some(own), Some(theirs)) => own.eq_ignore_ascii_case(theirs),
            (Some(_), None) => false,
            (None, _) => self.name.as_deref().is_some_and(|own| own == name),
        }
    }
}

/// Read access to a repository's commit history.
pub trait CommitLog {
    /// Visit every commit reachable from HEAD exactly once, in any order.
    ///
    /// A repository without commits visits nothing and succeeds.
    fn walk_commits(&self, visit: &mut dyn FnMut(CommitRecord)) -> Result<()>;

    /// Diff statistics for up to `limit` of the most recent commits.
    ///
    /// Individual commits whose stats cannot be computed yield an error
    /// entry rather than failing the whole window.
    fn recent_diff_stats(&self, limit: usize) -> Result<Vec<Result<DiffStat>>>;

    /// Locally configured author identity, if resolvable.
    fn local_identity(&self) -> Option<Identity>;
}

/// Git operations handler.
pub struct GitOperations;

impl GitOperations {
    /// Check if a path is a Git repository root.
    pub fn is_repository(path: &Path) -> bool {
        Repository::open(path).is_ok()
    }

    /// Get repository information from a local path.
    pub fn get_repo_info(path: &Path) -> Result<LocalRepoInfo> {
        let repo = Repository::open(path)?;

        let mut remotes = Vec::new();
        if let Ok(remote_names) = repo.remotes() {
            for name in remote_names.iter().flatten() {
                if let Ok(remote) = repo.find_remote(name) {
                    if let Some(url) = remote.url() {
                        remotes.push((name.to_string(), url.to_string()));
                    }
                }
            }
        }

        let last_commit = match repo.head() {
            Ok(head) => head
                .peel_to_commit()
                .ok()
                .and_then(|commit| to_utc(commit.time())),
            Err(e) if e.code() == ErrorCode::UnbornBranch => None,
            Err(e) => {
                debug!("No readable HEAD in {}: {}", path.display(), e);
                None
            }
        };

        Ok(LocalRepoInfo {
            remotes,
            last_commit,
        })
    }

    /// Build a handle for a repository root.
    ///
    /// Metadata read failures leave the optional fields empty.
    pub fn describe(path: &Path, public_hosts: &[String]) -> RepositoryHandle {
        match Self::get_repo_info(path) {
            Ok(info) => RepositoryHandle::new(path)
                .with_remote(info.primary_remote().map(str::to_string), public_hosts)
                .with_last_commit(info.last_commit),
            Err(e) => {
                warn!("Could not read repository metadata for {}: {}", path.display(), e);
                RepositoryHandle::new(path)
            }
        }
    }
}

/// Information about a local repository.
#[derive(Debug, Clone)]
pub struct LocalRepoInfo {
    pub remotes: Vec<(String, String)>,
    pub last_commit: Option<DateTime<Utc>>,
}

impl LocalRepoInfo {
    /// Get the origin remote URL.
    pub fn origin_url(&self) -> Option<&str> {
        self.remotes
            .iter()
            .find(|(name, _)| name == "origin")
            .map(|(_, url)| url.as_str())
    }

    /// Origin if configured, otherwise the first remote.
    pub fn primary_remote(&self) -> Option<&str> {
        self.origin_url()
            .or_else(|| self.remotes.first().map(|(_, url)| url.as_str()))
    }
}

/// [`CommitLog`] backed by a git2 repository.
pub struct GitCommitLog {
    repo: Repository,
}

impl GitCommitLog {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            repo: Repository::open(path)?,
        })
    }

    /// Revwalk from HEAD, or `None` for a repository without commits.
    fn head_walk(&self, sorting: Sort) -> Result<Option<git2::Revwalk<'_>>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(sorting)?;
        match revwalk.push_head() {
            Ok(()) => Ok(Some(revwalk)),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn diff_stat(&self, oid: git2::Oid) -> Result<DiffStat> {
        let commit = self.repo.find_commit(oid)?;
        let tree = commit.tree()?;
        let parent_tree = if commit.parent_count() > 0 {
            Some(commit.parent(0)?.tree()?)
        } else {
            None
        };

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;
        let stats = diff.stats()?;

        Ok(DiffStat {
            insertions: stats.insertions() as u64,
            deletions: stats.deletions() as u64,
        })
    }
}

impl CommitLog for GitCommitLog {
    fn walk_commits(&self, visit: &mut dyn FnMut(CommitRecord)) -> Result<()> {
        let Some(revwalk) = self.head_walk(Sort::NONE)? else {
            return Ok(());
        };

        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            let author = commit.author();
            let Some(timestamp) = to_utc(commit.time()) else {
                debug!("Skipping commit {} with out-of-range timestamp", commit.id());
                continue;
            };

            visit(CommitRecord {
                author_name: author.name().unwrap_or("Unknown").to_string(),
                author_email: author.email().map(str::to_string),
                timestamp,
            });
        }

        Ok(())
    }

    fn recent_diff_stats(&self, limit: usize) -> Result<Vec<Result<DiffStat>>> {
        let Some(revwalk) = self.head_walk(Sort::TIME)? else {
            return Ok(Vec::new());
        };

        let mut stats = Vec::new();
        for oid in revwalk.take(limit) {
            stats.push(oid.map_err(Into::into).and_then(|oid| self.diff_stat(oid)));
        }
        Ok(stats)
    }

    fn local_identity(&self) -> Option<Identity> {
        let config = self.repo.config().ok()?;
        let identity = Identity {
            name: config.get_string("user.name").ok(),
            email: config.get_string("user.email").ok(),
        };

        if identity.name.is_none() && identity.email.is_none() {
            None
        } else {
            Some(identity)
        }
    }
}

fn to_utc(time: git2::Time) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(time.seconds(), 0)
}
