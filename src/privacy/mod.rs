//! Privacy layer between per-repository metrics and anything shared.
//!
//! - Sensitive keyword and pattern detection, plus free-text redaction
//! - Project type, activity and size classification
//! - Anonymized records and the cross-project aggregate

mod anonymizer;
mod classifier;
mod sensitive;

pub use anonymizer::*;
pub use classifier::*;
pub use sensitive::*;
