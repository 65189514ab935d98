//! DocDrift - documentation drift detection tool
//!
//! Compares a source tree against a documentation tree and reports
//! signatures and documented items that have drifted apart.

use anyhow::Result;
use clap::Parser;
use docdrift::cli::{run, Cli};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; reports go to stdout, logs to stderr
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = run(&cli)?;
    std::process::exit(exit_code)
}
