//! DocDrift - detect drift between code signatures and documentation
//!
//! This library extracts structured signatures from source code,
//! recovers documented items from prose documentation, and compares the
//! two under a tolerant-but-precise name-matching policy, emitting typed
//! drift issues.

pub mod cli;
pub mod config;
pub mod drift;
pub mod extract;
pub mod report;

/// Re-export commonly used types
pub use drift::{
    compare_paths, ComparisonResult, CompareConfig, DriftComparator, DriftIssue, DriftSeverity,
    DriftType,
};
pub use extract::{CodeExtractor, DocExtractor};
pub use report::{ReportFormat, Reporter};

/// Application-wide error type
pub use anyhow::Result;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "docdrift";
