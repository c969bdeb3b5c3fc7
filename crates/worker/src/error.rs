/// Fatal startup errors for the worker binary (§7.6: exit code 1).
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// The config file could not be loaded.
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    /// Installing the shared logging subscriber failed.
    #[error(transparent)]
    Logging(#[from] logging::LoggingError),
    /// The coordinator could not be reached.
    #[error("failed to connect to coordinator at {addr}: {source}")]
    CoordinatorUnreachable {
        /// The coordinator address that refused the connection.
        addr: std::net::SocketAddr,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Registration was rejected by the coordinator.
    #[error("coordinator rejected registration: {0}")]
    RegistrationRejected(String),
    /// The client-facing listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// The address that could not be bound.
        addr: std::net::SocketAddr,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
