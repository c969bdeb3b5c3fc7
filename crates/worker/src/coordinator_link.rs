use std::net::SocketAddr;
use std::time::Duration;

use frame::{fields, Frame, MediaClass, MessageType};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{info, warn};
use transport::{FramedConnection, HeartbeatClock};

use crate::error::WorkerError;
use crate::time::wire_timestamp;

/// The worker's single persistent connection to the coordinator: carries
/// `WORKER_REG`, periodic `HEARTBEAT`s (doubling as busy/idle reports, see
/// [`crate::client_session`]), and any `NEW_MAIN` promotion.
///
/// Nothing else ever writes to this socket (§5) — a session with a client
/// reports its busy/idle transitions through `status_rx` instead of
/// reaching for this connection directly.
pub struct CoordinatorLink {
    conn: FramedConnection<TcpStream>,
    nickname: &'static str,
}

impl CoordinatorLink {
    /// Dials the coordinator and completes `WORKER_REG`.
    pub async fn connect(
        coordinator_addr: SocketAddr,
        class: MediaClass,
        advertised_addr: SocketAddr,
        timeout: Duration,
    ) -> Result<Self, WorkerError> {
        let stream =
            TcpStream::connect(coordinator_addr)
                .await
                .map_err(|source| WorkerError::CoordinatorUnreachable {
                    addr: coordinator_addr,
                    source,
                })?;
        let mut conn = FramedConnection::new(stream, timeout);

        let payload = fields::build_worker_reg(
            class.as_str(),
            &advertised_addr.ip().to_string(),
            &advertised_addr.port().to_string(),
        );
        let request = Frame::new(MessageType::WorkerReg, &payload, wire_timestamp())
            .expect("worker_reg payload fits in one frame");
        conn.send(&request)
            .await
            .map_err(|err| WorkerError::RegistrationRejected(err.to_string()))?;

        let reply = conn
            .recv()
            .await
            .map_err(|err| WorkerError::RegistrationRejected(err.to_string()))?;
        if reply.msg_type() == MessageType::Error {
            return Err(WorkerError::RegistrationRejected(
                String::from_utf8_lossy(reply.payload()).into_owned(),
            ));
        }

        conn.mark_established();
        let nickname = match class {
            MediaClass::Text => "Enigma",
            MediaClass::Media => "Harley",
        };
        info!(%coordinator_addr, %class, nickname, "registered with coordinator");

        Ok(Self { conn, nickname })
    }

    /// Runs the heartbeat/promotion loop until the connection is lost.
    pub async fn run(mut self, heartbeat_interval: Duration, mut status_rx: mpsc::UnboundedReceiver<bool>) {
        let mut busy = false;
        let mut clock = HeartbeatClock::new(heartbeat_interval);

        loop {
            tokio::select! {
                _ = clock.tick() => {
                    if clock.is_peer_dead() {
                        warn!(nickname = self.nickname, "coordinator silent past the dead-peer threshold");
                        break;
                    }
                    if self.send_heartbeat(busy).await.is_err() {
                        break;
                    }
                }
                status = status_rx.recv() => {
                    match status {
                        Some(new_busy) => {
                            busy = new_busy;
                            if self.send_heartbeat(busy).await.is_err() {
                                break;
                            }
                        }
                        None => {
                            info!(nickname = self.nickname, "draining: notifying coordinator");
                            let frame = Frame::empty(MessageType::Disconnect, wire_timestamp());
                            let _ = self.conn.send(&frame).await;
                            break;
                        }
                    }
                }
                frame = self.conn.recv() => {
                    match frame {
                        Ok(frame) if frame.msg_type() == MessageType::NewMain => {
                            clock.note_traffic();
                            info!(nickname = self.nickname, "promoted to primary");
                        }
                        Ok(frame) if frame.msg_type() == MessageType::Heartbeat => {
                            clock.note_traffic();
                        }
                        Ok(other) => {
                            clock.note_traffic();
                            warn!(nickname = self.nickname, msg_type = ?other.msg_type(), "unexpected frame from coordinator");
                        }
                        Err(err) => {
                            warn!(nickname = self.nickname, error = %err, "lost connection to coordinator");
                            break;
                        }
                    }
                }
            }
        }
    }

    async fn send_heartbeat(&mut self, busy: bool) -> Result<(), transport::TransportError> {
        let payload: &[u8] = if busy { b"BUSY" } else { b"" };
        let frame = Frame::new(MessageType::Heartbeat, payload, wire_timestamp())
            .expect("heartbeat payload fits in one frame");
        self.conn.send(&frame).await
    }
}
