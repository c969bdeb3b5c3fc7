/// Fatal startup errors for the client binary (§7.6: exit code 1).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The config file could not be loaded.
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    /// Installing the shared logging subscriber failed.
    #[error(transparent)]
    Logging(#[from] logging::LoggingError),
}

/// Non-fatal errors surfaced to the user during an interactive session
/// (§7: recoverable, never crashes the client).
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The coordinator or a dispatched worker could not be reached.
    #[error("could not reach peer: {0}")]
    PeerUnreachable(#[source] std::io::Error),
    /// The coordinator rejected the connect/registration handshake.
    #[error("coordinator rejected connection: {0}")]
    Rejected(String),
    /// A requested command is invalid in the current session state.
    #[error("{0}")]
    InvalidState(String),
    /// The file extension does not map to a known media class.
    #[error("'{0}' has no recognised media class (expected .txt, .wav, .jpg, or .png)")]
    UnknownExtension(String),
    /// The distortion factor is out of range `0 < factor <= 10`.
    #[error("factor must satisfy 0 < factor <= 10, got {0}")]
    FactorOutOfRange(f64),
    /// The coordinator had no worker available for the requested class.
    #[error("no worker available for this request")]
    NoWorkerAvailable,
    /// A resume attempt was already made for this session.
    #[error("already attempted to resume once; giving up")]
    ResumeExhausted,
    /// A local file could not be read or written.
    #[error("local I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A transport-level failure talking to a worker or the coordinator.
    #[error(transparent)]
    Transport(#[from] transport::TransportError),
    /// A malformed frame payload was received.
    #[error(transparent)]
    Frame(#[from] frame::FrameError),
}
