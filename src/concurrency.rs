//! Parallel analysis of discovered repositories.
//!
//! Every repository is analyzed independently, so handles are spread over a
//! dedicated Rayon pool. The pool is separate from Rayon's global pool and
//! from the Tokio runtime that drives the CLI.

use crate::analyzer::RepoAnalyzer;
use crate::config::ConcurrencyConfig;
use crate::error::Result;
use crate::models::{DataStatus, RepositoryHandle, RepositoryMetrics};
use rayon::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

/// Dedicated thread pool for repository analysis.
pub struct AnalysisPool {
    pool: rayon::ThreadPool,
    threads: usize,
}

impl AnalysisPool {
    /// Build a pool sized from configuration.
    pub fn new(config: &ConcurrencyConfig) -> Result<Self> {
        Self::with_threads(config.analysis_threads)
    }

    /// Build a pool with `threads` workers; 0 uses one per CPU.
    pub fn with_threads(threads: usize) -> Result<Self> {
        let threads = if threads == 0 { num_cpus::get() } else { threads };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|idx| format!("analysis-worker-{}", idx))
            .build()?;

        info!("Analysis pool: {} threads", threads);
        Ok(Self { pool, threads })
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Analyze every handle in parallel.
    ///
    /// Results are returned in the order of `handles`.
    pub fn analyze_all(
        &self,
        analyzer: &RepoAnalyzer,
        handles: &[RepositoryHandle],
    ) -> Vec<RepositoryMetrics> {
        self.analyze_each(handles, |handle| analyzer.analyze(handle))
    }

    /// Run `analyze` on every handle in parallel.
    ///
    /// A panic while analyzing one repository yields empty metrics with every
    /// source unavailable for that repository; the rest of the batch goes on.
    fn analyze_each<F>(&self, handles: &[RepositoryHandle], analyze: F) -> Vec<RepositoryMetrics>
    where
        F: Fn(&RepositoryHandle) -> RepositoryMetrics + Sync,
    {
        let total = handles.len();
        let completed = AtomicUsize::new(0);

        self.pool.install(|| {
            handles
                .par_iter()
                .map(|handle| {
                    let metrics = panic::catch_unwind(AssertUnwindSafe(|| analyze(handle)))
                        .unwrap_or_else(|payload| {
                            let reason = panic_reason(payload.as_ref());
                            warn!("Analysis of {} panicked: {}", handle.name, reason);
                            failed_metrics(handle, &reason)
                        });
                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    debug!("Analyzed {}/{}: {}", done, total, handle.name);
                    metrics
                })
                .collect()
        })
    }
}

fn failed_metrics(handle: &RepositoryHandle, reason: &str) -> RepositoryMetrics {
    let mut metrics = RepositoryMetrics::empty(handle.clone());
    let status = DataStatus::unavailable(format!("analysis panicked: {}", reason));
    metrics.status.files = status.clone();
    metrics.status.history = status.clone();
    metrics.status.line_changes = status.clone();
    metrics.status.metadata = status;
    metrics
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
