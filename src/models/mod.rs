//! Data models shared by the scanner, analyzer and anonymizer.

mod metrics;
mod portfolio;
mod repository;

pub use metrics::*;
pub use portfolio::*;
pub use repository::*;

/// Round to one decimal place.
pub(crate) fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
