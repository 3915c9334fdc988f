use anyhow::Result;
use log::error;
use std::process;
use toaststore::{app, cli, logging};
use toaststore::cli::ScriptError;

fn main() {
    if let Err(e) = run() {
        // Script mistakes are user errors; keep them free of logging noise
        if e.downcast_ref::<ScriptError>().is_some() {
            eprintln!("{}", e);
        } else {
            error!("Application error: {:#}", e);
            eprintln!("Error: {:#}", e);
        }

        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = cli::args::parse_args();

    cli::args::validate_args(&args)?;

    let config_manager = app::load_configuration(&args)?;

    let log_config = app::configure_logging(&args, &config_manager)?;
    logging::init_logger(log_config)?;

    // Timers and script waits share a single-threaded runtime
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(app::run_script(&args, &config_manager))
}
