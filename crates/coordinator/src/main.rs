use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use config::CoordinatorConfig;
use logging::{Destination, Verbosity, init_logging};

/// The distort coordinator: worker/client registry, election, and dispatch.
#[derive(Parser)]
#[command(name = "coordinatord", version)]
struct Args {
    /// Path to the coordinator's TOML configuration file.
    config_path: PathBuf,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match CoordinatorConfig::load(&args.config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("coordinatord: {err}");
            return ExitCode::FAILURE;
        }
    };

    let _guard = match init_logging(Verbosity::from_occurrences(args.verbose), Destination::Stderr) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("coordinatord: {err}");
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

    match runtime.block_on(distort_coordinator::run(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "coordinator exited with an error");
            ExitCode::FAILURE
        }
    }
}
