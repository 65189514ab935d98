//! CLI interface using clap
//!
//! Provides the command-line surface for DocDrift

mod commands;

pub use commands::run;

use clap::Parser;
use std::path::PathBuf;

/// DocDrift - detect when code and documentation drift out of sync
#[derive(Parser, Debug)]
#[command(name = "docdrift")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the source code directory
    pub code_path: PathBuf,

    /// Path to the documentation directory
    pub docs_path: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json, github, pr)
    #[arg(short, long, default_value = "markdown")]
    pub format: String,

    /// Minimum severity level to report (info, warning, critical)
    #[arg(long, default_value = "info")]
    pub min_severity: String,

    /// Exit with code 1 if issues at this level or higher are found
    /// (info, warning, critical, none)
    #[arg(long, default_value = "none")]
    pub fail_on: String,

    /// Path patterns to exclude (can be used multiple times)
    #[arg(long = "exclude")]
    pub exclude: Vec<String>,

    /// Don't include fix suggestions
    #[arg(long)]
    pub no_suggestions: bool,

    /// Don't require docstrings in code
    #[arg(long)]
    pub no_docstrings: bool,

    /// Path to a configuration file (.docdrift.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "docdrift",
            "./src",
            "./docs",
            "--format",
            "json",
            "--fail-on",
            "critical",
            "--exclude",
            "generated",
            "--exclude",
            "vendor",
        ]);

        assert_eq!(cli.code_path, PathBuf::from("./src"));
        assert_eq!(cli.docs_path, PathBuf::from("./docs"));
        assert_eq!(cli.format, "json");
        assert_eq!(cli.fail_on, "critical");
        assert_eq!(cli.exclude, vec!["generated", "vendor"]);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["docdrift", "src", "docs"]);
        assert_eq!(cli.format, "markdown");
        assert_eq!(cli.min_severity, "info");
        assert_eq!(cli.fail_on, "none");
        assert!(cli.exclude.is_empty());
    }
}
