use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Instant;

use frame::{fields, Frame, FrameError, MediaClass, MessageType};
use registry::PeerId;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{info, warn};
use transport::FramedConnection;

use crate::peer_directory::PeerSignal;
use crate::state::AppState;
use crate::time::wire_timestamp;

/// Accepts one connection's first frame and routes it to the client or
/// worker session loop. Closes silently on any error past this point — a
/// malformed or abandoned peer never takes down the coordinator (§7.5).
pub async fn handle_connection<S>(stream: S, peer_addr: SocketAddr, state: AppState)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut conn = FramedConnection::new(stream, state.timeout);
    let first = match conn.recv().await {
        Ok(frame) => frame,
        Err(err) => {
            warn!(%peer_addr, error = %err, "connection closed before a first frame arrived");
            return;
        }
    };

    match first.msg_type() {
        MessageType::ConnectReq => client_session(conn, first, peer_addr, state).await,
        MessageType::WorkerReg => worker_session(conn, first, peer_addr, state).await,
        other => {
            warn!(%peer_addr, ?other, "first frame was neither CONNECT_REQ nor WORKER_REG");
        }
    }
}

async fn client_session<S>(
    mut conn: FramedConnection<S>,
    first: Frame,
    peer_addr: SocketAddr,
    state: AppState,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let username = match fields::parse_connect_req(first.payload()) {
        Ok((username, _ip, _port)) => username.to_string(),
        Err(err) => {
            warn!(%peer_addr, error = %err, "malformed CONNECT_REQ");
            return;
        }
    };

    let client_id = state.registry.register_client(&username, Instant::now());
    let mut signals = state.directory.insert(PeerId::Client(client_id));
    conn.mark_established();
    info!(%peer_addr, %username, "client connected, nicknamed \"Fleck\" in operator logs");
    if conn
        .send(&Frame::empty(MessageType::ConnectReq, wire_timestamp()))
        .await
        .is_err()
    {
        state.directory.remove(PeerId::Client(client_id));
        let _ = state.registry.evict_client(client_id);
        return;
    }

    loop {
        tokio::select! {
            signal = signals.recv() => {
                match signal {
                    Some(PeerSignal::Disconnect) => {
                        info!(%peer_addr, %username, "coordinator shutting down, disconnecting client");
                        let _ = conn.send(&Frame::empty(MessageType::Disconnect, wire_timestamp())).await;
                        break;
                    }
                    Some(PeerSignal::NewMain) | None => break,
                }
            }
            frame = conn.recv() => {
                let frame = match frame {
                    Ok(frame) => frame,
                    Err(err) => {
                        warn!(%peer_addr, %username, error = %err, "client connection lost");
                        break;
                    }
                };

                match frame.msg_type() {
                    MessageType::DistortReq | MessageType::ResumeReq => {
                        if !dispatch_worker_request(&mut conn, &frame, client_id, &state).await {
                            break;
                        }
                    }
                    MessageType::Heartbeat => {
                        let _ = state
                            .registry
                            .touch_heartbeat(PeerId::Client(client_id), Instant::now());
                        if conn
                            .send(&Frame::empty(MessageType::Heartbeat, wire_timestamp()))
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    MessageType::Disconnect => {
                        info!(%peer_addr, %username, "client disconnected");
                        break;
                    }
                    other => {
                        warn!(%peer_addr, %username, ?other, "unexpected frame from client");
                    }
                }
            }
        }
    }

    state.directory.remove(PeerId::Client(client_id));
    let _ = state.registry.evict_client(client_id);
}

/// Handles `DISTORT_REQ`/`RESUME_REQ`, replying with a worker endpoint or
/// an `ERROR` frame. Returns `false` if the connection should be torn down.
async fn dispatch_worker_request<S>(
    conn: &mut FramedConnection<S>,
    frame: &Frame,
    client_id: registry::ClientId,
    state: &AppState,
) -> bool
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let is_resume = frame.msg_type() == MessageType::ResumeReq;
    let (class_str, filename) = match fields::parse_distort_req(frame.payload()) {
        Ok(parts) => parts,
        Err(err) => {
            warn!(error = %err, "malformed DISTORT_REQ/RESUME_REQ");
            return send_error(conn, "malformed request").await;
        }
    };

    let class = match MediaClass::from_str(class_str) {
        Ok(class) => class,
        Err(err) => return send_error(conn, &err.to_string()).await,
    };

    if is_resume && state.registry.client_has_resumed(client_id).unwrap_or(true) {
        return send_error(conn, "resume already attempted for this session").await;
    }

    match state.registry.pick_worker(class) {
        Some(handle) => {
            let _ = state
                .registry
                .set_client_worker(client_id, Some(handle.id));
            if is_resume {
                let _ = state.registry.mark_client_resumed(client_id);
            }
            info!(%class, %filename, worker = ?handle.id, "dispatching to worker");
            let reply = Frame::new(
                frame.msg_type(),
                &fields::build_worker_endpoint(
                    &handle.id.addr.ip().to_string(),
                    &handle.id.addr.port().to_string(),
                ),
                wire_timestamp(),
            )
            .expect("endpoint payload fits in one frame");
            conn.send(&reply).await.is_ok()
        }
        None => send_error(conn, "no idle worker for requested class").await,
    }
}

async fn send_error<S>(conn: &mut FramedConnection<S>, reason: &str) -> bool
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let frame = Frame::new(MessageType::Error, reason.as_bytes(), wire_timestamp())
        .unwrap_or_else(|_| Frame::empty(MessageType::Error, wire_timestamp()));
    conn.send(&frame).await.is_ok()
}

async fn worker_session<S>(
    mut conn: FramedConnection<S>,
    first: Frame,
    peer_addr: SocketAddr,
    state: AppState,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (class_str, ip, port) = match fields::parse_worker_reg(first.payload()) {
        Ok(parts) => parts,
        Err(err) => {
            warn!(%peer_addr, error = %err, "malformed WORKER_REG");
            return;
        }
    };
    let class = match MediaClass::from_str(class_str) {
        Ok(class) => class,
        Err(err) => {
            warn!(%peer_addr, error = %err, "WORKER_REG carried an unknown class");
            return;
        }
    };
    let addr: SocketAddr = match format!("{ip}:{port}").parse() {
        Ok(addr) => addr,
        Err(_) => {
            warn!(%peer_addr, %ip, %port, "WORKER_REG carried an unparseable advertised address");
            return;
        }
    };

    let (id, role) = match state.registry.register_worker(class, addr, Instant::now()) {
        Ok(pair) => pair,
        Err(err) => {
            warn!(%peer_addr, error = %err, "worker registration rejected");
            let _ = conn
                .send(&Frame::new(
                    MessageType::Error,
                    err.to_string().as_bytes(),
                    wire_timestamp(),
                )
                .unwrap_or_else(|_| Frame::empty(MessageType::Error, wire_timestamp())))
                .await;
            return;
        }
    };

    let nickname = match class {
        MediaClass::Text => "Enigma",
        MediaClass::Media => "Harley",
    };
    let mut signals = state.directory.insert(PeerId::Worker(id));
    conn.mark_established();
    info!(%peer_addr, %class, ?role, nickname, "worker registered");

    let ack = if role == registry::Role::Primary {
        Frame::empty(MessageType::NewMain, wire_timestamp())
    } else {
        Frame::empty(MessageType::WorkerReg, wire_timestamp())
    };
    if conn.send(&ack).await.is_err() {
        state.directory.remove(PeerId::Worker(id));
        let _ = state.registry.evict_worker(id);
        return;
    }

    loop {
        tokio::select! {
            signal = signals.recv() => {
                match signal {
                    Some(PeerSignal::NewMain) => {
                        info!(%peer_addr, nickname, "promoted to primary");
                        if conn.send(&Frame::empty(MessageType::NewMain, wire_timestamp())).await.is_err() {
                            break;
                        }
                    }
                    Some(PeerSignal::Disconnect) => {
                        info!(%peer_addr, nickname, "coordinator shutting down, disconnecting worker");
                        let _ = conn.send(&Frame::empty(MessageType::Disconnect, wire_timestamp())).await;
                        break;
                    }
                    None => break,
                }
            }
            frame = conn.recv() => {
                let frame = match frame {
                    Ok(frame) => frame,
                    Err(err) => {
                        warn!(%peer_addr, nickname, error = %err, "worker connection lost");
                        break;
                    }
                };
                match frame.msg_type() {
                    MessageType::Heartbeat => {
                        let _ = state.registry.touch_heartbeat(PeerId::Worker(id), Instant::now());
                        let busy = frame.payload() == b"BUSY";
                        let _ = state.registry.set_worker_busy(id, busy);
                        if conn.send(&Frame::empty(MessageType::Heartbeat, wire_timestamp())).await.is_err() {
                            break;
                        }
                    }
                    MessageType::Disconnect => {
                        info!(%peer_addr, nickname, "worker disconnected");
                        break;
                    }
                    other => {
                        warn!(%peer_addr, nickname, ?other, "unexpected frame from worker");
                    }
                }
            }
        }
    }

    state.directory.remove(PeerId::Worker(id));
    if let Ok(Some(promoted)) = state.registry.evict_worker(id) {
        info!(promoted = ?promoted, "promoted secondary to primary after eviction");
        state.directory.notify(PeerId::Worker(promoted), PeerSignal::NewMain);
    }
}
