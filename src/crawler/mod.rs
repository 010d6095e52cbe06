//! Repository discovery and Git access.

mod git;
mod scanner;

pub use git::*;
pub use scanner::*;

#[cfg(test)]
pub(crate) use git::test_support;
