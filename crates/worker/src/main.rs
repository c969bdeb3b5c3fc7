use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use config::WorkerConfig;
use logging::{Destination, Verbosity, init_logging};

/// The distort worker: registers for a media class and serves client sessions.
#[derive(Parser)]
#[command(name = "worker", version)]
struct Args {
    /// Path to the worker's TOML configuration file.
    config_path: PathBuf,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match WorkerConfig::load(&args.config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("worker: {err}");
            return ExitCode::FAILURE;
        }
    };

    let _guard = match init_logging(Verbosity::from_occurrences(args.verbose), Destination::Stderr) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("worker: {err}");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            tracing::error!(error = %err, "failed to start async runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(distort_worker::run(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "worker exited with an error");
            ExitCode::FAILURE
        }
    }
}
