use clap::Parser;
use anyhow::Result;
use std::path::PathBuf;
use log::{debug, info};

/// Ephemeral toast notification store driver
#[derive(Parser, Debug)]
#[command(name = "toaststore")]
#[command(about = "Replays a notification script against a bounded toast store and prints every state change")]
#[command(version)]
pub struct Args {
    /// Script file to replay (reads stdin when omitted)
    #[arg(short = 's', long = "script", value_name = "FILE")]
    pub script: Option<PathBuf>,

    /// Verbose output (debug level logging)
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet output (error level logging only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Debug output (trace level logging)
    #[arg(long)]
    pub debug: bool,

    /// Log format: text or json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log file path for file output
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level for file output (independent of console level)
    #[arg(long, value_name = "LEVEL")]
    pub log_file_level: Option<String>,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Configuration section name
    #[arg(long, value_name = "SECTION")]
    pub config_name: Option<String>,

    // ============ STORE CONFIGURATION ============

    /// Maximum number of toasts held at once
    #[arg(short = 'c', long = "capacity", value_name = "N")]
    pub capacity: Option<usize>,

    /// Delay between dismissal and removal, in milliseconds
    #[arg(short = 'd', long = "remove-delay-ms", value_name = "MS")]
    pub remove_delay_ms: Option<u64>,

    /// Use predictable sequential ids instead of UUIDs
    #[arg(long = "sequential-ids")]
    pub sequential_ids: bool,

    // ============ OUTPUT ============

    /// Snapshot output format: text or json
    #[arg(short = 'o', long = "output", value_name = "FORMAT", default_value = "text")]
    pub output: String,

    /// Disable coloured output
    #[arg(long = "no-color")]
    pub no_color: bool,
}

/// Parse command line arguments
pub fn parse_args() -> Args {
    debug!("Parsing command line arguments");
    let args = Args::parse();
    debug!("Parsed CLI arguments: {:?}", args);
    args
}

/// Validate CLI argument combinations
pub fn validate_args(args: &Args) -> Result<()> {
    debug!("Validating CLI argument combinations");

    let log_flags_count = [args.verbose, args.quiet, args.debug]
        .iter()
        .filter(|&&flag| flag)
        .count();

    if log_flags_count > 1 {
        return Err(anyhow::anyhow!(
            "Conflicting log level flags: only one of --verbose, --quiet, or --debug may be specified"
        ));
    }

    match args.log_format.to_lowercase().as_str() {
        "text" | "json" => {},
        _ => return Err(anyhow::anyhow!(
            "Invalid log format '{}'. Valid options: text, json", args.log_format
        )),
    }

    match args.output.to_lowercase().as_str() {
        "text" | "json" => {},
        _ => return Err(anyhow::anyhow!(
            "Invalid output format '{}'. Valid options: text, json", args.output
        )),
    }

    if let Some(ref level) = args.log_file_level {
        match level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {},
            _ => return Err(anyhow::anyhow!(
                "Invalid log file level '{}'. Valid levels: error, warn, info, debug, trace", level
            )),
        }
    }

    if args.log_file_level.is_some() && args.log_file.is_none() {
        return Err(anyhow::anyhow!(
            "--log-file-level requires --log-file to be specified"
        ));
    }

    if args.capacity == Some(0) {
        return Err(anyhow::anyhow!("--capacity must be at least 1"));
    }

    info!("CLI arguments validated successfully");
    Ok(())
}
