//! Command execution for the standardizer CLI.
//!
//! QC findings are reported but never block the pipeline; validation
//! failures do. The final summary goes to stdout, diagnostics to the
//! tracing subscriber on stderr.

use std::path::Path;

use colored::Colorize;
use tracing::{info, warn};

use crate::cli::args::Args;
use crate::config::{QcConfig, default_output_path};
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::models::{DataType, ParsedDataset, QcReport};
use crate::qc::QcChecker;
use crate::standardize::{Standardizer, metadata_sidecar_path};

/// Run the full pipeline for the given arguments.
pub fn run(args: Args) -> Result<()> {
    init_logging(args.verbose);

    let dispatcher = Dispatcher::new();
    let mut parser = dispatcher.get_parser(&args.data_type, &args.input)?;
    let data_type = parser.data_type();

    // Validation runs separately below so QC can inspect the parsed table
    // even when validation would fail.
    let dataset = parser.process(true)?;

    let qc_report = if args.skip_qc {
        info!("Skipping QC checks");
        None
    } else {
        let report = QcChecker::new(QcConfig::default()).check(&dataset)?;
        for issue in &report.issues {
            warn!("QC issue: {issue}");
        }
        for warning in &report.warnings {
            info!("QC warning: {warning}");
        }
        Some(report)
    };

    parser.validate(None)?;

    let standardizer = Standardizer::new(args.format);
    let standardized = standardizer.standardize(&dataset, data_type)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input, args.format));
    standardizer.write_output(&standardized, &output, true)?;

    print_summary(&args, data_type, &standardized, qc_report.as_ref(), &output);
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn print_summary(
    args: &Args,
    data_type: DataType,
    dataset: &ParsedDataset,
    qc: Option<&QcReport>,
    output: &Path,
) {
    println!();
    println!("{}", "Standardization complete".green().bold());
    println!("  Input:    {}", args.input.display());
    println!("  Type:     {}", data_type);
    println!("  Records:  {}", dataset.record_count());
    println!("  Format:   {}", args.format);
    println!("  Output:   {}", output.display());
    println!("  Metadata: {}", metadata_sidecar_path(output).display());
    match qc {
        Some(report) => {
            let status = if report.passed {
                "passed".green()
            } else {
                "issues found".yellow()
            };
            println!(
                "  QC:       {} ({} issues, {} warnings)",
                status, report.summary.issues_found, report.summary.warnings_found
            );
        }
        None => println!("  QC:       {}", "skipped".dimmed()),
    }
}
