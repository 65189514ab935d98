//! Command implementation: extract, compare, report

use crate::cli::Cli;
use crate::config::{default_exclude_patterns, DriftConfig};
use crate::drift::{DriftComparator, DriftSeverity};
use crate::extract::{CodeExtractor, DocExtractor};
use crate::report::{ReportConfig, ReportFormat, Reporter};
use anyhow::{bail, Context, Result};
use tracing::{debug, info};

/// Run a full drift scan and return the process exit code.
pub fn run(cli: &Cli) -> Result<i32> {
    let format: ReportFormat = cli.format.parse()?;
    let min_severity: DriftSeverity = cli.min_severity.parse()?;
    let fail_on = match cli.fail_on.as_str() {
        "none" => None,
        other => Some(other.parse::<DriftSeverity>()?),
    };

    if !cli.code_path.exists() {
        bail!("Code path does not exist: {:?}", cli.code_path);
    }
    if !cli.docs_path.exists() {
        bail!("Docs path does not exist: {:?}", cli.docs_path);
    }

    let config = DriftConfig::load(cli.config.as_deref())?;
    let mut exclude_patterns: Vec<String> = config
        .exclude
        .iter()
        .cloned()
        .chain(cli.exclude.iter().cloned())
        .collect();
    if exclude_patterns.is_empty() {
        exclude_patterns = default_exclude_patterns();
    }

    info!("Scanning code: {:?}", cli.code_path);
    let mut code_extractor = CodeExtractor::new()?;
    let code_results = code_extractor.extract_directory(&cli.code_path, &exclude_patterns);

    let total_functions: usize = code_results.iter().map(|r| r.functions.len()).sum();
    let total_classes: usize = code_results.iter().map(|r| r.classes.len()).sum();
    debug!(
        "Found {} functions and {} classes",
        total_functions, total_classes
    );

    info!("Scanning docs: {:?}", cli.docs_path);
    let doc_extractor = DocExtractor::new();
    let doc_results = doc_extractor.extract_directory(&cli.docs_path, &exclude_patterns);

    let total_items: usize = doc_results.iter().map(|r| r.items.len()).sum();
    debug!("Found {} documented items", total_items);

    // Both extraction passes complete before comparison; matching
    // against a partial index would produce false missing-from-code
    // positives.
    let mut compare_config = config.comparator_config();
    if cli.no_docstrings {
        compare_config.require_docstrings = false;
    }
    let comparator = DriftComparator::with_config(compare_config);
    let result = comparator.compare(&code_results, &doc_results);

    let report_config = ReportConfig {
        include_suggestions: !cli.no_suggestions,
        min_severity,
        ..ReportConfig::default()
    };
    let reporter = Reporter::with_config(report_config);
    let report = reporter.generate(&result, format);

    match &cli.output {
        Some(path) => {
            std::fs::write(path, &report)
                .with_context(|| format!("Failed to write report to {:?}", path))?;
            info!("Report written to {:?}", path);
        }
        None => println!("{}", report),
    }

    if let Some(threshold) = fail_on {
        if result.issues.iter().any(|i| i.severity >= threshold) {
            debug!("Failing: issues at severity {} or higher", threshold);
            return Ok(1);
        }
    }

    Ok(0)
}
