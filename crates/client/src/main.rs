use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use config::ClientConfig;
use logging::{Destination, Verbosity, init_logging};

/// The distort client: interactive distortion requests against a coordinator.
#[derive(Parser)]
#[command(name = "client", version)]
struct Args {
    /// Path to the client's TOML configuration file.
    config_path: PathBuf,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match ClientConfig::load(&args.config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("client: {err}");
            return ExitCode::FAILURE;
        }
    };

    let _guard = match init_logging(Verbosity::from_occurrences(args.verbose), Destination::Stderr) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("client: {err}");
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

    match runtime.block_on(distort_client::run(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "client exited with an error");
            ExitCode::FAILURE
        }
    }
}
