//! Drift report rendering
//!
//! Renders a `ComparisonResult` as Markdown, JSON, GitHub Actions
//! annotations, or a PR comment body. The drift engine itself knows
//! nothing about output formatting.

use crate::config::ConfigError;
use crate::drift::{ComparisonResult, DriftIssue, DriftSeverity};
use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;

/// Output format for drift reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Markdown,
    Json,
    Github,
    PrComment,
}

impl std::str::FromStr for ReportFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "markdown" => Ok(ReportFormat::Markdown),
            "json" => Ok(ReportFormat::Json),
            "github" => Ok(ReportFormat::Github),
            "pr" => Ok(ReportFormat::PrComment),
            other => Err(ConfigError::UnknownFormat(other.to_string())),
        }
    }
}

/// Configuration for report generation
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Include fix suggestions
    pub include_suggestions: bool,
    /// Include structured details
    pub include_details: bool,
    /// Minimum severity to report
    pub min_severity: DriftSeverity,
    /// Group issues by file rather than by severity
    pub group_by_file: bool,
    /// Include coverage stats
    pub show_stats: bool,
    /// Cap on the number of reported issues
    pub max_issues: Option<usize>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_suggestions: true,
            include_details: true,
            min_severity: DriftSeverity::Info,
            group_by_file: true,
            show_stats: true,
            max_issues: None,
        }
    }
}

fn severity_icon(severity: DriftSeverity) -> &'static str {
    match severity {
        DriftSeverity::Critical => "🔴",
        DriftSeverity::Warning => "🟡",
        DriftSeverity::Info => "🔵",
    }
}

/// Renders comparison results in the configured formats
pub struct Reporter {
    config: ReportConfig,
}

impl Reporter {
    /// Create a reporter with the default configuration
    pub fn new() -> Self {
        Self {
            config: ReportConfig::default(),
        }
    }

    /// Create a reporter with a custom configuration
    pub fn with_config(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Render a report in the given format
    pub fn generate(&self, result: &ComparisonResult, format: ReportFormat) -> String {
        match format {
            ReportFormat::Markdown => self.render_markdown(result),
            ReportFormat::Json => self.render_json(result),
            ReportFormat::Github => self.render_github(result),
            ReportFormat::PrComment => self.render_pr_comment(result),
        }
    }

    /// Write a report to a file, inferring JSON from the extension when
    /// no format is given.
    pub fn write(
        &self,
        result: &ComparisonResult,
        output: &Path,
        format: Option<ReportFormat>,
    ) -> Result<()> {
        let format = format.unwrap_or_else(|| {
            if output.extension().and_then(|e| e.to_str()) == Some("json") {
                ReportFormat::Json
            } else {
                ReportFormat::Markdown
            }
        });

        let content = self.generate(result, format);
        std::fs::write(output, content)
            .with_context(|| format!("Failed to write report to {:?}", output))
    }

    fn filtered_issues<'a>(&self, result: &'a ComparisonResult) -> Vec<&'a DriftIssue> {
        let mut issues: Vec<&DriftIssue> = result
            .issues
            .iter()
            .filter(|i| i.severity >= self.config.min_severity)
            .collect();
        if let Some(max) = self.config.max_issues {
            issues.truncate(max);
        }
        issues
    }

    fn render_markdown(&self, result: &ComparisonResult) -> String {
        let mut lines: Vec<String> = Vec::new();

        lines.push("# Documentation Drift Report".to_string());
        lines.push(String::new());
        lines.push(format!(
            "*Generated: {}*",
            Utc::now().format("%Y-%m-%d %H:%M:%S")
        ));
        lines.push(String::new());

        let summary = result.summary();
        lines.push("## Summary".to_string());
        lines.push(String::new());
        lines.push("| Severity | Count |".to_string());
        lines.push("|----------|-------|".to_string());
        lines.push(format!("| 🔴 Critical | {} |", summary.critical));
        lines.push(format!("| 🟡 Warning | {} |", summary.warning));
        lines.push(format!("| 🔵 Info | {} |", summary.info));
        lines.push(format!("| **Total** | **{}** |", summary.total));
        lines.push(String::new());

        if self.config.show_stats {
            let stats = &result.stats;
            lines.push("### Coverage Stats".to_string());
            lines.push(String::new());
            lines.push(format!("- Total functions: {}", stats.total_functions));
            lines.push(format!("- Total classes: {}", stats.total_classes));
            lines.push(format!("- Documented items: {}", stats.total_documented));
            lines.push(format!("- Matched: {}", stats.matched));
            lines.push(format!("- Undocumented: {}", stats.undocumented));
            lines.push(String::new());
        }

        let issues = self.filtered_issues(result);
        if issues.is_empty() {
            lines.push("## ✅ No Issues Found".to_string());
            lines.push(String::new());
            lines.push("Code and documentation are in sync!".to_string());
            return lines.join("\n");
        }

        lines.push("## Issues".to_string());
        lines.push(String::new());

        if self.config.group_by_file {
            let mut grouped: BTreeMap<&str, Vec<&DriftIssue>> = BTreeMap::new();
            for issue in issues.iter().copied() {
                let filepath = issue
                    .code_location
                    .as_deref()
                    .or(issue.doc_location.as_deref())
                    .unwrap_or("unknown");
                grouped.entry(filepath).or_default().push(issue);
            }

            for (filepath, file_issues) in grouped {
                lines.push(format!("### 📁 `{}`", filepath));
                lines.push(String::new());
                for issue in file_issues {
                    lines.extend(self.format_issue(issue));
                }
                lines.push(String::new());
            }
        } else {
            for severity in [
                DriftSeverity::Critical,
                DriftSeverity::Warning,
                DriftSeverity::Info,
            ] {
                let severity_issues: Vec<&DriftIssue> = issues
                    .iter()
                    .copied()
                    .filter(|i| i.severity == severity)
                    .collect();
                if severity_issues.is_empty() {
                    continue;
                }

                let title = match severity {
                    DriftSeverity::Critical => "Critical",
                    DriftSeverity::Warning => "Warning",
                    DriftSeverity::Info => "Info",
                };
                lines.push(format!("### {} {}", severity_icon(severity), title));
                lines.push(String::new());
                for issue in severity_issues {
                    lines.extend(self.format_issue(issue));
                }
                lines.push(String::new());
            }
        }

        lines.join("\n")
    }

    fn format_issue(&self, issue: &DriftIssue) -> Vec<String> {
        let mut lines = Vec::new();
        let icon = severity_icon(issue.severity);

        lines.push(format!(
            "- {} **{}**: {}",
            icon, issue.item_name, issue.message
        ));

        let mut locations = Vec::new();
        if let (Some(filepath), Some(line)) = (&issue.code_location, issue.code_line) {
            locations.push(format!("Code: `{}:{}`", filepath, line));
        }
        if let (Some(filepath), Some(line)) = (&issue.doc_location, issue.doc_line) {
            locations.push(format!("Doc: `{}:{}`", filepath, line));
        }
        if !locations.is_empty() {
            lines.push(format!("  - Location: {}", locations.join(", ")));
        }

        if self.config.include_suggestions {
            if let Some(ref suggestion) = issue.suggestion {
                lines.push(format!("  - 💡 *{}*", suggestion));
            }
        }

        lines
    }

    fn render_json(&self, result: &ComparisonResult) -> String {
        let issues = self.filtered_issues(result);
        let report = json!({
            "generated_at": Utc::now().to_rfc3339(),
            "summary": result.summary(),
            "stats": result.stats,
            "issues": issues,
        });

        serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
    }

    fn render_github(&self, result: &ComparisonResult) -> String {
        let mut lines: Vec<String> = Vec::new();

        for issue in self.filtered_issues(result) {
            let level = match issue.severity {
                DriftSeverity::Critical => "error",
                DriftSeverity::Warning => "warning",
                DriftSeverity::Info => "notice",
            };
            let file = issue
                .code_location
                .as_deref()
                .or(issue.doc_location.as_deref())
                .unwrap_or("");
            let line = issue.code_line.or(issue.doc_line).unwrap_or(1);

            // GitHub Actions annotation format
            let message = issue.message.replace('\n', "%0A");
            lines.push(format!("::{} file={},line={}::{}", level, file, line, message));
        }

        let summary = result.summary();
        lines.push(String::new());
        lines.push("::group::Documentation Drift Summary".to_string());
        lines.push(format!("Total issues: {}", summary.total));
        lines.push(format!("Critical: {}", summary.critical));
        lines.push(format!("Warnings: {}", summary.warning));
        lines.push(format!("Info: {}", summary.info));
        lines.push("::endgroup::".to_string());

        lines.join("\n")
    }

    fn render_pr_comment(&self, result: &ComparisonResult) -> String {
        let mut lines: Vec<String> = Vec::new();
        let summary = result.summary();

        if summary.critical > 0 {
            lines.push("## ❌ Documentation Drift Detected".to_string());
        } else if summary.warning > 0 {
            lines.push("## ⚠️ Documentation Drift Warnings".to_string());
        } else {
            lines.push("## ✅ Documentation Up to Date".to_string());
        }
        lines.push(String::new());

        lines.push("<details>".to_string());
        lines.push("<summary>📊 Summary</summary>".to_string());
        lines.push(String::new());
        lines.push("| Category | Count |".to_string());
        lines.push("|----------|-------|".to_string());
        lines.push(format!("| ❌ Critical | {} |", summary.critical));
        lines.push(format!("| ⚠️ Warning | {} |", summary.warning));
        lines.push(format!("| ℹ️ Info | {} |", summary.info));
        lines.push(String::new());
        lines.push("</details>".to_string());
        lines.push(String::new());

        let issues = self.filtered_issues(result);
        if issues.is_empty() {
            lines.push("No documentation drift detected. Great job! 🎉".to_string());
            return lines.join("\n");
        }

        let critical: Vec<&DriftIssue> = issues
            .iter()
            .copied()
            .filter(|i| i.severity == DriftSeverity::Critical)
            .collect();
        if !critical.is_empty() {
            lines.push("### ❌ Critical Issues".to_string());
            lines.push(String::new());
            for issue in critical.iter().copied().take(10) {
                lines.push(format_issue_compact(issue));
            }
            if critical.len() > 10 {
                lines.push(format!("*...and {} more*", critical.len() - 10));
            }
            lines.push(String::new());
        }

        let warnings: Vec<&DriftIssue> = issues
            .iter()
            .copied()
            .filter(|i| i.severity == DriftSeverity::Warning)
            .collect();
        if !warnings.is_empty() {
            lines.push("<details>".to_string());
            lines.push(format!("<summary>⚠️ Warnings ({})</summary>", warnings.len()));
            lines.push(String::new());
            for issue in warnings.iter().copied().take(20) {
                lines.push(format_issue_compact(issue));
            }
            if warnings.len() > 20 {
                lines.push(format!("*...and {} more*", warnings.len() - 20));
            }
            lines.push(String::new());
            lines.push("</details>".to_string());
            lines.push(String::new());
        }

        lines.push("---".to_string());
        lines.push("*Generated by docdrift*".to_string());

        lines.join("\n")
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

fn format_issue_compact(issue: &DriftIssue) -> String {
    let icon = match issue.severity {
        DriftSeverity::Critical => "❌",
        DriftSeverity::Warning => "⚠️",
        DriftSeverity::Info => "ℹ️",
    };

    let location = match (&issue.code_location, issue.code_line) {
        (Some(filepath), Some(line)) => format!(" (`{}:{}`)", filepath, line),
        (Some(filepath), None) => format!(" (`{}`)", filepath),
        _ => String::new(),
    };

    format!("- {} **{}**: {}{}", icon, issue.item_name, issue.message, location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drift::DriftType;

    fn sample_result() -> ComparisonResult {
        let mut result = ComparisonResult::default();
        result.add_issue(
            DriftIssue::new(
                DriftType::UndocumentedFunction,
                DriftSeverity::Warning,
                "Function 'parse_config' is not documented",
                "parse_config",
            )
            .at_code("src/config.py", 42)
            .with_suggestion("Add documentation for parse_config() in your docs"),
        );
        result.add_issue(
            DriftIssue::new(
                DriftType::MissingFromCode,
                DriftSeverity::Critical,
                "Documented item 'old_parser' not found in code",
                "old_parser",
            )
            .at_doc("docs/api.md", 15),
        );
        result.stats.total_functions = 5;
        result.stats.total_documented = 2;
        result.stats.matched = 1;
        result
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("json".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert_eq!("pr".parse::<ReportFormat>().unwrap(), ReportFormat::PrComment);

        let err = "yaml".parse::<ReportFormat>().unwrap_err();
        assert!(err.to_string().contains("yaml"));
    }

    #[test]
    fn test_markdown_report() {
        let report = Reporter::new().generate(&sample_result(), ReportFormat::Markdown);

        assert!(report.contains("# Documentation Drift Report"));
        assert!(report.contains("| 🔴 Critical | 1 |"));
        assert!(report.contains("| 🟡 Warning | 1 |"));
        assert!(report.contains("parse_config"));
        assert!(report.contains("`src/config.py`"));
        assert!(report.contains("💡"));
    }

    #[test]
    fn test_markdown_report_empty() {
        let report = Reporter::new().generate(&ComparisonResult::default(), ReportFormat::Markdown);
        assert!(report.contains("No Issues Found"));
    }

    #[test]
    fn test_min_severity_filters_issues() {
        let config = ReportConfig {
            min_severity: DriftSeverity::Critical,
            ..ReportConfig::default()
        };
        let report = Reporter::with_config(config).generate(&sample_result(), ReportFormat::Markdown);

        assert!(report.contains("old_parser"));
        assert!(!report.contains("- 🟡 **parse_config**"));
    }

    #[test]
    fn test_json_report_parses() {
        let report = Reporter::new().generate(&sample_result(), ReportFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&report).unwrap();

        assert_eq!(parsed["summary"]["total"], 2);
        assert_eq!(parsed["stats"]["total_functions"], 5);
        assert_eq!(parsed["issues"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_github_annotations() {
        let report = Reporter::new().generate(&sample_result(), ReportFormat::Github);

        assert!(report.contains("::warning file=src/config.py,line=42::"));
        assert!(report.contains("::error file=docs/api.md,line=15::"));
        assert!(report.contains("::group::Documentation Drift Summary"));
        assert!(report.contains("::endgroup::"));
    }

    #[test]
    fn test_pr_comment_headline() {
        let report = Reporter::new().generate(&sample_result(), ReportFormat::PrComment);
        assert!(report.contains("## ❌ Documentation Drift Detected"));
        assert!(report.contains("old_parser"));

        let clean = Reporter::new().generate(&ComparisonResult::default(), ReportFormat::PrComment);
        assert!(clean.contains("## ✅ Documentation Up to Date"));
    }

    #[test]
    fn test_write_infers_json_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        Reporter::new()
            .write(&sample_result(), &path, None)
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(serde_json::from_str::<serde_json::Value>(&content).is_ok());
    }
}
