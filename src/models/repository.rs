//! Repository handle model and the remote privacy heuristic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A discovered local repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryHandle {
    /// Repository root on disk
    pub path: PathBuf,

    /// Display name (final path component)
    pub name: String,

    /// Remote URL, `origin` preferred
    pub remote_url: Option<String>,

    /// No remote, or a remote outside the recognized public hosts
    pub is_private: bool,

    /// Timestamp of the HEAD commit
    pub last_commit: Option<DateTime<Utc>>,
}

impl RepositoryHandle {
    /// Create a handle for a repository without a remote.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = display_name(&path);

        Self {
            path,
            name,
            remote_url: None,
            is_private: true,
            last_commit: None,
        }
    }

    /// Attach a remote URL and recompute the privacy flag.
    pub fn with_remote(mut self, remote_url: Option<String>, public_hosts: &[String]) -> Self {
        self.is_private = is_private_remote(remote_url.as_deref(), public_hosts);
        self.remote_url = remote_url;
        self
    }

    /// Attach the last commit timestamp.
    pub fn with_last_commit(mut self, last_commit: Option<DateTime<Utc>>) -> Self {
        self.last_commit = last_commit;
        self
    }

    /// Host part of the remote URL, if any.
    pub fn remote_host(&self) -> Option<String> {
        self.remote_url.as_deref().and_then(remote_host)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Extract the host from a remote URL.
///
/// Handles both URL remotes (`https://host/owner/repo.git`,
/// `ssh://git@host/owner/repo`) and scp-style remotes (`git@host:owner/repo`).
pub fn remote_host(remote: &str) -> Option<String> {
    let remote = remote.trim();

    if remote.contains("://") {
        return url::Url::parse(remote)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_lowercase()));
    }

    // scp-like syntax: [user@]host:path
    let (before_colon, _) = remote.split_once(':')?;
    if before_colon.contains('/') || before_colon.is_empty() {
        return None;
    }
    let host = before_colon.rsplit('@').next()?;
    if host.is_empty() {
        None
    } else {
        Some(host.to_lowercase())
    }
}

/// Privacy heuristic: a repository is private when it has no remote or
/// its remote is not hosted on one of the recognized public domains.
///
/// Self-hosted mirrors of public projects are reported as private.
pub fn is_private_remote(remote_url: Option<&str>, public_hosts: &[String]) -> bool {
    let Some(url) = remote_url else {
        return true;
    };

    match remote_host(url) {
        Some(host) => !public_hosts.iter().any(|domain| host_matches(&host, domain)),
        None => {
            let lower = url.to_lowercase();
            !public_hosts
                .iter()
                .any(|domain| lower.contains(&domain.to_lowercase()))
        }
    }
}

fn host_matches(host: &str, domain: &str) -> bool {
    let domain = domain.trim().to_lowercase();
    host == domain || host.ends_with(&format!(".{}", domain))
}
