#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `distort-logging` installs one `tracing_subscriber` pipeline, shared by
//! the coordinator, worker, and client binaries, gated by a single
//! `-v`/`-q`-style [`Verbosity`] knob instead of per-module flags.
//!
//! # Design
//!
//! Verbosity parsing ([`Verbosity`]) is kept separate from *where* log
//! lines land ([`logging_sink::Destination`]) so a binary's config can pick
//! a file sink without duplicating the filter logic, and so tests can swap
//! in a sink without touching this crate.
//!
//! # Errors
//!
//! [`LoggingError::AlreadyInitialized`] surfaces if a process calls
//! [`init_logging`] twice (each of the three binaries does this exactly
//! once, at startup, before touching the network — §6, §7.6).

pub use logging_sink::{Destination, SinkGuard};

/// How much detail the shared subscriber emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Warnings and errors only.
    Quiet,
    /// Registrations, elections, dispatches, evictions (the default).
    #[default]
    Normal,
    /// Per-frame send/receive tracing in addition to `Normal`.
    Verbose,
    /// Everything, including heartbeat ticks.
    Debug,
}

impl Verbosity {
    /// Maps a `-v` repeat count (0 = default) to a verbosity level.
    #[must_use]
    pub fn from_occurrences(count: u8) -> Self {
        match count {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    }

    fn filter_directive(self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "debug",
            Verbosity::Debug => "trace",
        }
    }
}

/// Errors from installing the shared subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// `init_logging` was called more than once in this process.
    #[error("logging subscriber already installed")]
    AlreadyInitialized,
}

/// Installs the shared `tracing` subscriber at the given verbosity, writing
/// to `destination`. Returns a guard that must be held for the lifetime of
/// the process — dropping it stops the background flush thread.
pub fn init_logging(verbosity: Verbosity, destination: Destination) -> Result<SinkGuard, LoggingError> {
    let (writer, guard) = logging_sink::make_writer(&destination);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(verbosity.filter_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(true)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occurrence_count_maps_to_increasing_verbosity() {
        assert_eq!(Verbosity::from_occurrences(0), Verbosity::Normal);
        assert_eq!(Verbosity::from_occurrences(1), Verbosity::Verbose);
        assert_eq!(Verbosity::from_occurrences(5), Verbosity::Debug);
    }

    #[test]
    fn each_level_has_a_distinct_filter_directive() {
        let levels = [
            Verbosity::Quiet,
            Verbosity::Normal,
            Verbosity::Verbose,
            Verbosity::Debug,
        ];
        let directives: Vec<_> = levels.iter().map(|v| v.filter_directive()).collect();
        let mut unique = directives.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(directives.len(), unique.len());
    }
}
