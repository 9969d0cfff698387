//! User Aggregate CLI
//!
//! Aggregates per-user records into a sorted export and optionally
//! validates the export against a reference file.

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use std::path::PathBuf;

use user_aggregate::commands::{
    execute_process, install_signal_handler, validate_args, ProcessArgs,
};
use user_aggregate::utils::config::{DEFAULT_OUTPUT_PATH, ENV_INPUT, ENV_OUTPUT, ENV_VERIFY};
use user_aggregate::utils::CancelToken;

/// User Aggregate - per-user rollup of attribute and event records
#[derive(Parser, Debug)]
#[command(name = "user-aggregate")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input file of newline-delimited JSON records
    #[arg(long = "in", env = ENV_INPUT)]
    input: PathBuf,

    /// Output path for the export
    #[arg(long = "out", env = ENV_OUTPUT, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Reference export to validate the output against
    #[arg(long, env = ENV_VERIFY)]
    verify: Option<PathBuf>,

    /// Print aggregate statistics to stdout
    #[arg(long)]
    summary: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let token = CancelToken::new();
    install_signal_handler(token.clone())?;

    let args = ProcessArgs {
        input: cli.input,
        output: cli.output,
        verify: cli.verify,
        print_summary: cli.summary,
    };

    // Validate args first
    validate_args(&args)?;

    execute_process(args, &token)?;

    Ok(())
}
