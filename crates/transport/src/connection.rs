use std::cell::Cell;
use std::time::Duration;

use frame::{FRAME_LEN, Frame};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use crate::TransportError;

/// The connection lifecycle states of §4.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Dial in progress; no frames have been exchanged yet.
    Dialing,
    /// The handshake completed; frames flow freely in both directions.
    Established,
    /// One side issued a graceful disconnect; the receiver may keep
    /// consuming in-flight frames but must not initiate new requests.
    Draining,
    /// The connection has been torn down.
    Closed,
}

/// A connection carrying one [`Frame`] per `send`/`recv` call, each bounded
/// by a read/write deadline.
///
/// `FramedConnection` holds its [`ConnectionState`] in a `Cell` rather than
/// behind a lock: per §5, a connection's state is task-local and is never
/// observed from a second task.
pub struct FramedConnection<S> {
    stream: S,
    state: Cell<ConnectionState>,
    timeout: Duration,
    cancel: CancellationToken,
}

impl<S> FramedConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps `stream`, starting in [`ConnectionState::Dialing`], with its
    /// own cancellation token that nothing outside this connection holds a
    /// handle to.
    pub fn new(stream: S, timeout: Duration) -> Self {
        Self::with_cancellation(stream, timeout, CancellationToken::new())
    }

    /// Wraps `stream` with a caller-supplied cancellation token. Every
    /// `send`/`recv` suspension point races this token; a caller holding a
    /// clone can call [`CancellationToken::cancel`] to abandon whichever
    /// I/O is currently in flight (spec.md:157, §4.2).
    pub fn with_cancellation(stream: S, timeout: Duration, cancel: CancellationToken) -> Self {
        Self {
            stream,
            state: Cell::new(ConnectionState::Dialing),
            timeout,
            cancel,
        }
    }

    /// A clone of this connection's cancellation token.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Replaces this connection's cancellation token, e.g. to rejoin it to
    /// a fresh token after its owner's previous one was cancelled.
    pub fn set_cancellation(&mut self, cancel: CancellationToken) {
        self.cancel = cancel;
    }

    /// The connection's current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Marks the connection established, e.g. once a registration/connect
    /// handshake has succeeded.
    pub fn mark_established(&self) {
        self.state.set(ConnectionState::Established);
    }

    /// Marks the connection draining: no new requests may be initiated, but
    /// in-flight frames may still be read until EOF.
    pub fn begin_draining(&self) {
        if self.state.get() != ConnectionState::Closed {
            self.state.set(ConnectionState::Draining);
        }
    }

    /// Marks the connection closed.
    pub fn mark_closed(&self) {
        self.state.set(ConnectionState::Closed);
    }

    /// Sends one frame, enforcing the configured write deadline and racing
    /// the connection's cancellation token.
    pub async fn send(&mut self, frame: &Frame) -> Result<(), TransportError> {
        let wire = frame::encode(frame);
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(TransportError::Cancelled),
            result = tokio::time::timeout(self.timeout, self.stream.write_all(&wire)) => match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(err)) => Err(TransportError::Io(err)),
                Err(_elapsed) => Err(TransportError::Timeout),
            },
        }
    }

    /// Receives one frame, enforcing the configured read deadline and
    /// racing the connection's cancellation token.
    ///
    /// Reads accumulate until a full [`FRAME_LEN`]-byte frame has arrived
    /// or the connection closes (§4.2: "length-exact").
    pub async fn recv(&mut self) -> Result<Frame, TransportError> {
        let mut wire = [0u8; FRAME_LEN];
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(TransportError::Cancelled),
            result = tokio::time::timeout(self.timeout, self.stream.read_exact(&mut wire)) => match result {
                Ok(Ok(_)) => Ok(frame::decode(&wire)?),
                Ok(Err(err)) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
                    Err(TransportError::ConnectionClosed)
                }
                Ok(Err(err)) => Err(TransportError::Io(err)),
                Err(_elapsed) => Err(TransportError::Timeout),
            },
        }
    }

    /// Consumes the connection, returning the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame::MessageType;
    use tokio::io::duplex;

    #[tokio::test]
    async fn send_then_recv_round_trips_a_frame() {
        let (client, server) = duplex(4096);
        let mut client = FramedConnection::new(client, Duration::from_secs(1));
        let mut server = FramedConnection::new(server, Duration::from_secs(1));

        let frame = Frame::new(MessageType::Heartbeat, b"PING", 42).unwrap();
        client.send(&frame).await.unwrap();
        let received = server.recv().await.unwrap();
        assert_eq!(received, frame);
    }

    #[tokio::test]
    async fn recv_on_closed_stream_reports_connection_closed() {
        let (client, server) = duplex(4096);
        drop(client);
        let mut server = FramedConnection::new(server, Duration::from_secs(1));
        let err = server.recv().await.unwrap_err();
        assert!(matches!(err, TransportError::ConnectionClosed));
    }

    #[tokio::test]
    async fn recv_past_deadline_times_out() {
        let (_client, server) = duplex(4096);
        let mut server = FramedConnection::new(server, Duration::from_millis(20));
        let err = server.recv().await.unwrap_err();
        assert!(matches!(err, TransportError::Timeout));
    }

    #[tokio::test]
    async fn cancelling_the_token_abandons_an_in_flight_recv() {
        let (_client, server) = duplex(4096);
        let cancel = CancellationToken::new();
        let mut server =
            FramedConnection::with_cancellation(server, Duration::from_secs(30), cancel.clone());
        cancel.cancel();
        let err = server.recv().await.unwrap_err();
        assert!(matches!(err, TransportError::Cancelled));
    }

    #[tokio::test]
    async fn set_cancellation_allows_further_use_after_a_cancel() {
        let (client, server) = duplex(4096);
        let cancel = CancellationToken::new();
        let mut client =
            FramedConnection::with_cancellation(client, Duration::from_secs(1), cancel.clone());
        let mut server = FramedConnection::new(server, Duration::from_secs(1));
        cancel.cancel();
        client.set_cancellation(CancellationToken::new());

        let frame = Frame::new(MessageType::Heartbeat, b"PING", 42).unwrap();
        client.send(&frame).await.unwrap();
        let received = server.recv().await.unwrap();
        assert_eq!(received, frame);
    }

    #[test]
    fn state_transitions_follow_lifecycle() {
        let (a, _b) = tokio::io::duplex(16);
        let conn = FramedConnection::new(a, Duration::from_secs(1));
        assert_eq!(conn.state(), ConnectionState::Dialing);
        conn.mark_established();
        assert_eq!(conn.state(), ConnectionState::Established);
        conn.begin_draining();
        assert_eq!(conn.state(), ConnectionState::Draining);
        conn.mark_closed();
        assert_eq!(conn.state(), ConnectionState::Closed);
    }
}
