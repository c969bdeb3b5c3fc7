#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Output destinations for the [`distort-logging`](../distort_logging/index.html)
//! facade, kept separate from verbosity parsing so a caller can swap where
//! log lines land without touching how they are filtered.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};

/// Where log lines are written.
#[derive(Debug, Clone)]
pub enum Destination {
    /// The process's standard error stream (the default for all three
    /// binaries).
    Stderr,
    /// A rolling daily log file under the given directory.
    File(PathBuf),
}

/// Keeps a sink's background flush thread alive. Drop this only at process
/// exit, after logging is no longer needed.
pub struct SinkGuard(#[allow(dead_code)] WorkerGuard);

/// Builds the non-blocking writer for `destination`, along with the guard
/// that must be held for the writer to keep flushing.
#[must_use]
pub fn make_writer(destination: &Destination) -> (NonBlocking, SinkGuard) {
    let (writer, guard) = match destination {
        Destination::Stderr => tracing_appender::non_blocking(std::io::stderr()),
        Destination::File(dir) => {
            let appender = tracing_appender::rolling::daily(dir, log_file_prefix(dir));
            tracing_appender::non_blocking(appender)
        }
    };
    (writer, SinkGuard(guard))
}

fn log_file_prefix(dir: &Path) -> &'static str {
    let _ = dir;
    "distort"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stderr_destination_builds_a_writer() {
        let (_writer, _guard) = make_writer(&Destination::Stderr);
    }
}
