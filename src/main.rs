//! treescan - concurrent directory tree scanner
//!
//! Entry point for the CLI application.

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use config::{CliArgs, OutputMode, ScanConfig};
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;
use treescan::{ScanReport, TreePrinter};

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    // Parse CLI arguments
    let config = ScanConfig::from_args(CliArgs::parse());

    // Setup logging
    setup_logging(config.verbose, config.suppress_errors)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create async runtime")?;

    runtime.block_on(scan(config))
}

async fn scan(config: ScanConfig) -> Result<ExitCode> {
    let scanner = config
        .scanner()
        .with_context(|| format!("Cannot scan {}", config.root.display()))?;

    info!(
        root = %config.root.display(),
        concurrency = scanner.concurrency(),
        "Starting scan"
    );

    let start = Instant::now();
    let stream = scanner.stream();
    let stats = std::sync::Arc::clone(stream.stats());

    // Setup signal handler for graceful shutdown
    let cancel = stream.cancel_handle();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, stopping scan...");
        cancel.cancel();
    })
    .context("Failed to set signal handler")?;

    let mut printer = TreePrinter::new(BufWriter::new(io::stdout().lock()));
    let report = match config.mode {
        OutputMode::Count => printer.print_count(stream).await,
        OutputMode::List => printer.print_list(stream).await,
    }
    .context("Failed to write output")?;
    printer.flush().context("Failed to write output")?;

    info!(
        entries = report.counts.total(),
        dirs = stats.dirs_read(),
        errors = report.errors.len(),
        peak_reads = stats.peak_active_reads(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Scan completed"
    );

    if stats.cancelled() {
        info!("Scan was interrupted before completion");
    }

    let ok = finish(
        &report,
        stats.cancelled(),
        config.suppress_errors,
        &mut io::stderr().lock(),
    )
    .context("Failed to write errors")?;

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Print collected scan errors unless suppressed. Returns whether the run
/// counts as a success: not cancelled, and no errors or errors suppressed.
fn finish<W: Write>(
    report: &ScanReport,
    cancelled: bool,
    suppress_errors: bool,
    out: &mut W,
) -> io::Result<bool> {
    let report_errors = !report.errors.is_empty() && !suppress_errors;
    if report_errors {
        for err in &report.errors {
            writeln!(out, "error: {err}")?;
        }
        writeln!(out, "{} error(s) occurred during scanning", report.errors.len())?;
    }

    Ok(!cancelled && !report_errors)
}

fn setup_logging(verbose: bool, suppress_errors: bool) -> Result<()> {
    let mut filter = if verbose {
        EnvFilter::new("treescan=debug,warn")
    } else {
        EnvFilter::new("treescan=info,warn")
    };
    if suppress_errors {
        // Per-directory failures are logged by the engine at warn level.
        filter = filter.add_directive(
            "treescan::engine=error"
                .parse::<Directive>()
                .context("Invalid log directive")?,
        );
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(())
}
