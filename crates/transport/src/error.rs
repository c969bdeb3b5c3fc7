use frame::FrameError;

/// Errors produced by [`crate::FramedConnection`] I/O.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The underlying stream returned an I/O error other than a clean
    /// close.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A full 256-byte frame could not be decoded.
    #[error("frame decode error: {0}")]
    Frame(#[from] FrameError),
    /// The read or write deadline elapsed. Not automatically fatal; the
    /// caller decides whether to retry (§4.2, §7.2).
    #[error("transport operation timed out")]
    Timeout,
    /// The peer closed the connection (EOF) before a full frame was
    /// received.
    #[error("connection closed by peer")]
    ConnectionClosed,
    /// The connection's cancellation token fired before the operation
    /// completed; the caller asked to abandon in-flight I/O.
    #[error("operation cancelled")]
    Cancelled,
}
