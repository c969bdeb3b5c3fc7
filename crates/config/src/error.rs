use std::path::PathBuf;

/// Errors from loading any of the three role configs.
///
/// Loading never panics (§6, §7.6): every failure here maps to an exit code
/// of 1 at the call site, after being logged.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// The path that failed to open.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The config file was not valid TOML, or was missing/mistyped fields.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A worker or client's declared folder does not exist or is not a
    /// directory.
    #[error("folder {0} does not exist or is not a directory")]
    MissingFolder(PathBuf),
    /// A worker's `class` field was not `Text` or `Media`.
    #[error("unknown worker class {0:?}")]
    UnknownClass(String),
}
