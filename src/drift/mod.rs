//! Drift model and comparison engine
//!
//! This module defines the typed issues the comparator emits and the
//! result container handed to reporting, plus:
//! - `comparator`: name indexing, matching policy, per-pair checks
//! - `embedding`: optional semantic-similarity enrichment

pub mod comparator;
pub mod embedding;

pub use comparator::{compare_paths, CompareConfig, DriftComparator};
pub use embedding::{
    cosine_similarity, EmbeddingCache, EmbeddingProvider, HashEmbedding, LocalEmbedding,
    RemoteEmbedding, SemanticDrift, SemanticMatcher,
};

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Severity of a drift issue, ordered by ascending importance
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DriftSeverity {
    /// Minor inconsistency
    Info,
    /// Documentation is stale or incomplete
    Warning,
    /// Documentation actively contradicts the code
    Critical,
}

impl std::fmt::Display for DriftSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriftSeverity::Info => write!(f, "info"),
            DriftSeverity::Warning => write!(f, "warning"),
            DriftSeverity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for DriftSeverity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(DriftSeverity::Info),
            "warning" => Ok(DriftSeverity::Warning),
            "critical" => Ok(DriftSeverity::Critical),
            other => Err(ConfigError::UnknownSeverity(other.to_string())),
        }
    }
}

/// Kind of drift issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftType {
    UndocumentedFunction,
    UndocumentedClass,
    MissingFromCode,
    SignatureMismatch,
    ParameterMismatch,
    ReturnTypeMismatch,
    DeprecatedStillDocumented,
    MissingDeprecationNotice,
    DocstringMissing,
    StaleExample,
}

impl std::fmt::Display for DriftType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DriftType::UndocumentedFunction => "undocumented_function",
            DriftType::UndocumentedClass => "undocumented_class",
            DriftType::MissingFromCode => "missing_from_code",
            DriftType::SignatureMismatch => "signature_mismatch",
            DriftType::ParameterMismatch => "parameter_mismatch",
            DriftType::ReturnTypeMismatch => "return_type_mismatch",
            DriftType::DeprecatedStillDocumented => "deprecated_still_documented",
            DriftType::MissingDeprecationNotice => "missing_deprecation_notice",
            DriftType::DocstringMissing => "docstring_missing",
            DriftType::StaleExample => "stale_example",
        };
        write!(f, "{}", name)
    }
}

/// A single detected drift issue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftIssue {
    /// Kind of drift
    pub drift_type: DriftType,
    /// Severity level
    pub severity: DriftSeverity,
    /// Human-readable description
    pub message: String,
    /// Code-side file, when known
    pub code_location: Option<String>,
    /// Code-side line, when known
    pub code_line: Option<usize>,
    /// Doc-side file, when known
    pub doc_location: Option<String>,
    /// Doc-side line, when known
    pub doc_line: Option<usize>,
    /// Name of the affected item
    pub item_name: String,
    /// Free-form structured details
    pub details: serde_json::Map<String, serde_json::Value>,
    /// Suggested fix, when one is obvious
    pub suggestion: Option<String>,
}

impl DriftIssue {
    /// Create an issue with no locations, details, or suggestion
    pub fn new(
        drift_type: DriftType,
        severity: DriftSeverity,
        message: &str,
        item_name: &str,
    ) -> Self {
        Self {
            drift_type,
            severity,
            message: message.to_string(),
            code_location: None,
            code_line: None,
            doc_location: None,
            doc_line: None,
            item_name: item_name.to_string(),
            details: serde_json::Map::new(),
            suggestion: None,
        }
    }

    /// Attach the code-side location
    pub fn at_code(mut self, filepath: &str, line: usize) -> Self {
        self.code_location = Some(filepath.to_string());
        self.code_line = Some(line);
        self
    }

    /// Attach the doc-side location
    pub fn at_doc(mut self, filepath: &str, line: usize) -> Self {
        self.doc_location = Some(filepath.to_string());
        self.doc_line = Some(line);
        self
    }

    /// Attach a structured detail entry
    pub fn with_detail(mut self, key: &str, value: serde_json::Value) -> Self {
        self.details.insert(key.to_string(), value);
        self
    }

    /// Attach a suggested fix
    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestion = Some(suggestion.to_string());
        self
    }
}

/// Coverage statistics from one comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonStats {
    /// Distinct code functions (methods count once)
    pub total_functions: usize,
    /// Distinct code classes
    pub total_classes: usize,
    /// Distinct documented item names
    pub total_documented: usize,
    /// Distinct doc names matched by some code entity
    pub matched: usize,
    /// Code entities without a matching doc item
    pub undocumented: usize,
}

/// Per-severity issue counts
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct IssueSummary {
    pub total: usize,
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
}

/// Ordered issue list plus coverage stats.
///
/// Issue order is discovery order: code functions, then code classes,
/// then orphan doc items.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub issues: Vec<DriftIssue>,
    pub stats: ComparisonStats,
}

impl ComparisonResult {
    /// Append an issue
    pub fn add_issue(&mut self, issue: DriftIssue) {
        self.issues.push(issue);
    }

    /// Whether any issue is critical
    pub fn has_critical(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == DriftSeverity::Critical)
    }

    /// Whether any issue is a warning
    pub fn has_warnings(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == DriftSeverity::Warning)
    }

    /// Issues at exactly the given severity
    pub fn filter_by_severity(&self, severity: DriftSeverity) -> Vec<&DriftIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == severity)
            .collect()
    }

    /// Per-severity counts
    pub fn summary(&self) -> IssueSummary {
        IssueSummary {
            total: self.issues.len(),
            critical: self.filter_by_severity(DriftSeverity::Critical).len(),
            warning: self.filter_by_severity(DriftSeverity::Warning).len(),
            info: self.filter_by_severity(DriftSeverity::Info).len(),
        }
    }
}
