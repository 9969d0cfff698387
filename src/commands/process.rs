//! Process command implementation.
//!
//! The process command:
//! 1. Opens the input and the record stream
//! 2. Aggregates records per user
//! 3. Writes the sorted export
//! 4. Validates the export against a reference (optional)

use crate::aggregator::{AggregateOutcome, AggregateStats, Aggregator};
use crate::output::write_export_file;
use crate::parser::RecordStream;
use crate::utils::cancel::CancelToken;
use crate::utils::config::DEFAULT_OUTPUT_PATH;
use crate::verify::validate;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the process command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ProcessArgs {
    /// Newline-delimited JSON records
    pub input: PathBuf,

    /// Destination of the export
    pub output: PathBuf,

    /// Reference export to compare against (optional)
    pub verify: Option<PathBuf>,

    /// Print aggregate statistics to stdout
    pub print_summary: bool,
}

impl Default for ProcessArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: PathBuf::from(DEFAULT_OUTPUT_PATH),
            verify: None,
            print_summary: false,
        }
    }
}

/// What a finished run produced
#[derive(Debug, Clone)]
pub struct ProcessReport {
    pub users: usize,
    pub lines_written: usize,

    /// Input lines the record source could not decode
    pub skipped_lines: usize,

    pub stats: AggregateStats,
}

/// Execute the process command
///
/// **Public** - main entry point called from main.rs
///
/// # Arguments
/// * `args` - Process command arguments
/// * `token` - Cancelled on SIGINT/SIGTERM
///
/// # Errors
/// * Input cannot be opened or is not a record stream
/// * Cancellation observed before the export was written
/// * Output cannot be written
/// * Export differs from the reference file
///
/// A validation failure leaves the written export in place.
pub fn execute_process(args: ProcessArgs, token: &CancelToken) -> Result<ProcessReport> {
    let start_time = Instant::now();

    info!("Start processing: {}", args.input.display());

    // Step 1: Open input
    info!("Step 1/4: Opening record stream...");
    let file = File::open(&args.input)
        .with_context(|| format!("Failed to open input file {}", args.input.display()))?;
    let mut stream =
        RecordStream::open(file, token.clone()).context("Failed to start record stream")?;

    // Step 2: Aggregate
    info!("Step 2/4: Aggregating records...");
    let aggregation = Aggregator::new().aggregate_until(&mut stream, token);

    let source = stream
        .finish()
        .context("Record stream stopped before the end of the input; no output written")?;
    debug!("Record stream delivered {} records", source.records);
    if source.skipped_lines > 0 {
        warn!("Skipped {} undecodable lines", source.skipped_lines);
    }

    if aggregation.outcome == AggregateOutcome::Interrupted || token.is_cancelled() {
        anyhow::bail!(
            "Interrupted after {} records; no output written",
            aggregation.stats.records_seen
        );
    }

    let store = aggregation.store;
    let stats = aggregation.stats;
    info!("Aggregated {} users from {}", store.len(), stats.summary());

    // Step 3: Write export
    info!("Step 3/4: Writing export...");
    let lines_written = write_export_file(&store, &args.output)
        .with_context(|| format!("Failed to write export {}", args.output.display()))?;
    info!("✓ Export written to: {} ({} lines)", args.output.display(), lines_written);

    let report = ProcessReport {
        users: store.len(),
        lines_written,
        skipped_lines: source.skipped_lines,
        stats,
    };

    if args.print_summary {
        println!("\n{}", render_summary(&args, &report));
    }

    // Step 4: Validate (if requested)
    match &args.verify {
        Some(reference) => {
            info!("Step 4/4: Validating against {}...", reference.display());
            let matched = validate(&args.output, reference).with_context(|| {
                format!(
                    "Export {} failed validation against {}",
                    args.output.display(),
                    reference.display()
                )
            })?;
            info!("✓ Successfully validated ({} lines)", matched);
        }
        None => info!("Step 4/4: Skipping validation (no reference file)"),
    }

    let elapsed = start_time.elapsed();
    info!("Processing completed in {:.2}s", elapsed.as_secs_f64());

    Ok(report)
}

/// Text block printed by `--summary`
///
/// **Public** - exposed for tests
pub fn render_summary(args: &ProcessArgs, report: &ProcessReport) -> String {
    let rule = "=".repeat(80);
    let stats = &report.stats;

    let mut lines = vec![
        rule.clone(),
        "AGGREGATE SUMMARY".to_string(),
        rule.clone(),
        format!("Input:          {}", args.input.display()),
        format!("Output:         {}", args.output.display()),
        format!("Users:          {}", report.users),
        format!("Records:        {}", stats.records_seen),
        format!("  attributes:   {}", stats.attribute_updates),
        format!("  events:       {}", stats.event_occurrences),
        format!("  dropped:      {}", stats.dropped_missing_user),
        format!("Skipped lines:  {}", report.skipped_lines),
    ];
    if let Some(reference) = &args.verify {
        lines.push(format!("Verify:         {}", reference.display()));
    }
    lines.push(rule);

    lines.join("\n")
}

/// Validate process arguments
///
/// **Public** - can be called before execute_process for early validation
pub fn validate_args(args: &ProcessArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input path cannot be empty");
    }

    if args.output.as_os_str().is_empty() {
        anyhow::bail!("Output path cannot be empty");
    }

    if args.input == args.output {
        anyhow::bail!("Output path must differ from input path");
    }

    if let Some(reference) = &args.verify {
        if reference.as_os_str().is_empty() {
            anyhow::bail!("Verify path cannot be empty");
        }
        if *reference == args.output {
            anyhow::bail!("Verify path must differ from output path");
        }
    }

    Ok(())
}
