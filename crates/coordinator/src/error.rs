/// Fatal startup errors for the coordinator binary (§7.6: exit code 1).
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    /// The config file could not be loaded.
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    /// Installing the shared logging subscriber failed.
    #[error(transparent)]
    Logging(#[from] logging::LoggingError),
    /// A listening socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// The address that could not be bound.
        addr: std::net::SocketAddr,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
