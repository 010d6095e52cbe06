//! Reporting module for outputting discovery, analysis and portfolio results.

mod text;

pub use text::*;

use crate::config::OutputFormat;
use crate::models::{PortfolioPayload, RepositoryHandle, RepositoryMetrics};
use serde::Serialize;

/// Something a command produced and wants printed.
#[derive(Debug, Clone, Copy)]
pub enum Report<'a> {
    /// Discovered repositories
    Repositories(&'a [RepositoryHandle]),
    /// Full per-repository metrics
    Metrics(&'a [RepositoryMetrics]),
    /// Anonymized records and aggregate
    Portfolio(&'a PortfolioPayload),
}

/// Report generator trait.
pub trait Reporter {
    /// Render a report.
    fn generate(&self, report: &Report<'_>) -> String;
}

/// Create a reporter based on output format.
pub fn create_reporter(format: OutputFormat) -> Box<dyn Reporter> {
    match format {
        OutputFormat::Json => Box::new(JsonReporter::new()),
        OutputFormat::Text => Box::new(TextReporter::new()),
    }
}

/// JSON reporter; the payload is the serde form of the report contents.
pub struct JsonReporter;

impl JsonReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

impl Reporter for JsonReporter {
    fn generate(&self, report: &Report<'_>) -> String {
        match report {
            Report::Repositories(handles) => to_json(handles),
            Report::Metrics(metrics) => to_json(metrics),
            Report::Portfolio(payload) => to_json(payload),
        }
    }
}
