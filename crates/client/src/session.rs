use std::net::SocketAddr;
use std::path::Path;

use checksums::Md5;
use config::ClientConfig;
use frame::{DATA_LEN, Frame, MediaClass, MessageType, fields};
use tokio::net::TcpStream;
use tracing::{info, warn};
use transport::{CancellationToken, FramedConnection};

use crate::error::SessionError;
use crate::state::{ClientState, StatusSnapshot};
use crate::time::wire_timestamp;

/// Drives one interactive client's state machine (§4.5): connect, list,
/// distort (with resume-on-failure), logout.
pub struct ClientSession {
    config: ClientConfig,
    username: String,
    timeout: std::time::Duration,
    state: ClientState,
    conn: Option<FramedConnection<TcpStream>>,
    current_worker: Option<SocketAddr>,
    bytes_transferred: u64,
    cancel: CancellationToken,
}

impl ClientSession {
    /// Builds a session from `config`, sanitizing the declared username
    /// (§4.5.1: strip every `&` before first transmission and before every
    /// subsequent use).
    #[must_use]
    pub fn new(config: ClientConfig, timeout: std::time::Duration) -> Self {
        let username = sanitize_username(&config.username);
        Self {
            config,
            username,
            timeout,
            state: ClientState::Offline,
            conn: None,
            current_worker: None,
            bytes_transferred: 0,
            cancel: CancellationToken::new(),
        }
    }

    /// The session's current state-machine state.
    #[must_use]
    pub fn state(&self) -> ClientState {
        self.state
    }

    /// A clone of the token every connection opened by this session races
    /// at its suspension points. Holding this lets a caller abandon the
    /// in-flight coordinator or worker I/O behind an interactive command
    /// (§6, spec.md:157) without needing `&mut self`.
    #[must_use]
    pub fn cancellation_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Replaces the session's cancellation token with a fresh one, so a
    /// previously interrupted session can keep issuing commands. Returns
    /// the new handle.
    pub fn rearm_cancellation(&mut self) -> CancellationToken {
        self.cancel = CancellationToken::new();
        if let Some(conn) = self.conn.as_mut() {
            conn.set_cancellation(self.cancel.clone());
        }
        self.cancel.clone()
    }

    /// A purely local snapshot for `CHECK STATUS` (§6).
    #[must_use]
    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            state: self.state,
            current_worker: self.current_worker,
            bytes_transferred: self.bytes_transferred,
        }
    }

    /// `CONNECT`: dial the coordinator and complete `CONNECT_REQ`.
    pub async fn connect(&mut self) -> Result<(), SessionError> {
        if self.state != ClientState::Offline {
            return Err(SessionError::InvalidState(
                "already connected".to_string(),
            ));
        }

        let coordinator_addr =
            SocketAddr::new(self.config.coordinator_ip, self.config.coordinator_port);
        let stream = TcpStream::connect(coordinator_addr)
            .await
            .map_err(SessionError::PeerUnreachable)?;
        let local_addr = stream.local_addr()?;
        let mut conn = FramedConnection::with_cancellation(stream, self.timeout, self.cancel.clone());

        let payload = fields::build_connect_req(
            &self.username,
            &local_addr.ip().to_string(),
            &local_addr.port().to_string(),
        );
        conn.send(&Frame::new(MessageType::ConnectReq, &payload, wire_timestamp())?)
            .await?;

        let reply = conn.recv().await?;
        if reply.msg_type() == MessageType::Error {
            return Err(SessionError::Rejected(
                String::from_utf8_lossy(reply.payload()).into_owned(),
            ));
        }

        conn.mark_established();
        self.conn = Some(conn);
        self.state = ClientState::Connected;
        info!(username = %self.username, %coordinator_addr, "connected");
        Ok(())
    }

    /// `LOGOUT`: send `DISCONNECT` and return to `Offline`.
    pub async fn logout(&mut self) -> Result<(), SessionError> {
        if self.state == ClientState::Offline {
            return Err(SessionError::InvalidState("not connected".to_string()));
        }
        if let Some(mut conn) = self.conn.take() {
            let _ = conn
                .send(&Frame::empty(MessageType::Disconnect, wire_timestamp()))
                .await;
        }
        self.state = ClientState::Offline;
        self.current_worker = None;
        info!(username = %self.username, "logged out");
        Ok(())
    }

    /// Sends a keepalive `HEARTBEAT` and awaits the coordinator's echo
    /// (§4.2: the client is the "keeper" on this link).
    pub async fn send_heartbeat(&mut self) -> Result<(), SessionError> {
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| SessionError::InvalidState("not connected".to_string()))?;
        conn.send(&Frame::empty(MessageType::Heartbeat, wire_timestamp()))
            .await?;
        let reply = conn.recv().await?;
        if reply.msg_type() != MessageType::Heartbeat {
            warn!(msg_type = ?reply.msg_type(), "expected a HEARTBEAT echo from coordinator");
        }
        Ok(())
    }

    /// `LIST TEXT|MEDIA`: a local directory walk, no network traffic.
    pub fn list(&self, class: MediaClass) -> Result<Vec<String>, SessionError> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.config.local_folder)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if classify_extension(&name).ok() == Some(class) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// `DISTORT <file> <factor>`: the full Requesting -> Streaming ->
    /// Verifying pipeline, with at most one resume attempt (§7.3).
    pub async fn distort(&mut self, file: &str, factor_str: &str) -> Result<(), SessionError> {
        if self.state != ClientState::Connected {
            return Err(SessionError::InvalidState(format!(
                "cannot DISTORT while {}",
                self.state
            )));
        }

        let class = classify_extension(file)?;
        let factor: f64 = factor_str
            .parse()
            .map_err(|_| SessionError::FactorOutOfRange(f64::NAN))?;
        if !(factor > 0.0 && factor <= 10.0) {
            return Err(SessionError::FactorOutOfRange(factor));
        }

        let path = self.config.local_folder.join(file);
        let data = tokio::fs::read(&path).await?;
        let source_md5 = Md5::to_hex(&Md5::digest(&data));

        self.state = ClientState::Requesting;
        let mut is_resume = false;
        let mut already_resumed = false;

        let outcome = loop {
            let endpoint = match self.request_worker(class, file, is_resume).await {
                Ok(endpoint) => endpoint,
                Err(err) => break Err(err),
            };

            self.state = ClientState::Streaming;
            self.current_worker = Some(endpoint);
            self.bytes_transferred = 0;

            match self
                .run_worker_session(endpoint, file, &data, &source_md5, factor)
                .await
            {
                Ok(()) => break Ok(()),
                Err(err) if was_cancelled(&err) => break Err(err),
                Err(err) if !already_resumed => {
                    warn!(%file, error = %err, "worker session failed, attempting resume");
                    already_resumed = true;
                    is_resume = true;
                    self.state = ClientState::Requesting;
                }
                Err(_) => break Err(SessionError::ResumeExhausted),
            }
        };

        self.state = ClientState::Connected;
        self.current_worker = None;
        outcome
    }

    async fn request_worker(
        &mut self,
        class: MediaClass,
        filename: &str,
        is_resume: bool,
    ) -> Result<SocketAddr, SessionError> {
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| SessionError::InvalidState("not connected".to_string()))?;

        let msg_type = if is_resume {
            MessageType::ResumeReq
        } else {
            MessageType::DistortReq
        };
        let payload = fields::build_distort_req(class.as_str(), filename);
        conn.send(&Frame::new(msg_type, &payload, wire_timestamp())?)
            .await?;

        let reply = conn.recv().await?;
        match reply.msg_type() {
            MessageType::Error => Err(SessionError::Rejected(
                String::from_utf8_lossy(reply.payload()).into_owned(),
            )),
            _ if reply.payload() == b"DISTORT_KO" || reply.payload() == b"MEDIA_KO" => {
                Err(SessionError::NoWorkerAvailable)
            }
            _ => {
                let (ip, port) = fields::parse_worker_endpoint(reply.payload())?;
                let port: u16 = port
                    .parse()
                    .map_err(|_| SessionError::Rejected("malformed worker port".to_string()))?;
                let ip: std::net::IpAddr = ip
                    .parse()
                    .map_err(|_| SessionError::Rejected("malformed worker address".to_string()))?;
                Ok(SocketAddr::new(ip, port))
            }
        }
    }

    async fn run_worker_session(
        &mut self,
        endpoint: SocketAddr,
        filename: &str,
        data: &[u8],
        source_md5: &str,
        factor: f64,
    ) -> Result<(), SessionError> {
        let stream = TcpStream::connect(endpoint)
            .await
            .map_err(SessionError::PeerUnreachable)?;
        let mut conn = FramedConnection::with_cancellation(stream, self.timeout, self.cancel.clone());

        let request = fields::build_worker_connect(
            &self.username,
            filename,
            &data.len().to_string(),
            source_md5,
            &factor.to_string(),
        );
        conn.send(&Frame::new(MessageType::WorkerConnect, &request, wire_timestamp())?)
            .await?;

        let ack = conn.recv().await?;
        if ack.payload() == b"CON_KO" {
            return Err(SessionError::Rejected("worker rejected session".to_string()));
        }
        conn.mark_established();

        for chunk in data.chunks(DATA_LEN) {
            conn.send(&Frame::new(MessageType::FileData, chunk, wire_timestamp())?)
                .await?;
            self.bytes_transferred += chunk.len() as u64;
        }

        self.state = ClientState::Verifying;
        let info_frame = conn.recv().await?;
        if info_frame.payload() == b"CHECK_KO" {
            return Err(SessionError::Rejected(
                "worker rejected the uploaded file's checksum".to_string(),
            ));
        }
        let (new_size_str, new_md5) = fields::parse_file_info(info_frame.payload())?;
        let new_size: u64 = new_size_str
            .parse()
            .map_err(|_| SessionError::Rejected("malformed FILE_INFO size".to_string()))?;
        let new_md5 = new_md5.to_string();

        let mut result = Vec::with_capacity(new_size as usize);
        self.bytes_transferred = 0;
        while (result.len() as u64) < new_size {
            let frame = conn.recv().await?;
            if frame.msg_type() != MessageType::FileData {
                warn!(msg_type = ?frame.msg_type(), "expected FILE_DATA while downloading result");
                continue;
            }
            result.extend_from_slice(frame.payload());
            self.bytes_transferred += frame.payload().len() as u64;
        }
        result.truncate(new_size as usize);

        let actual_md5 = Md5::to_hex(&Md5::digest(&result));
        let verdict: &[u8] = if actual_md5 == new_md5 { b"CHECK_OK" } else { b"CHECK_KO" };
        conn.send(&Frame::new(MessageType::Md5Check, verdict, wire_timestamp())?)
            .await?;
        conn.send(&Frame::empty(MessageType::Disconnect, wire_timestamp()))
            .await?;

        if verdict == b"CHECK_KO" {
            return Err(SessionError::Rejected(
                "distorted result failed its declared checksum".to_string(),
            ));
        }

        let result_path = self.config.local_folder.join(format!("{filename}.distorted"));
        tokio::fs::write(&result_path, &result).await?;
        info!(%filename, result_path = %result_path.display(), "distortion complete");
        Ok(())
    }
}

/// Whether `err` came from a cancelled connection, i.e. a user interrupt
/// rather than an ordinary network failure — a cancelled attempt does not
/// burn the session's one resume attempt (§7.3).
fn was_cancelled(err: &SessionError) -> bool {
    matches!(
        err,
        SessionError::Transport(transport::TransportError::Cancelled)
    )
}

fn sanitize_username(raw: &str) -> String {
    raw.chars().filter(|&c| c != '&').collect()
}

fn classify_extension(filename: &str) -> Result<MediaClass, SessionError> {
    match Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("txt") => Ok(MediaClass::Text),
        Some("wav" | "jpg" | "png") => Ok(MediaClass::Media),
        _ => Err(SessionError::UnknownExtension(filename.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_every_delimiter_from_username() {
        assert_eq!(sanitize_username("al&ice&"), "alice");
        assert_eq!(sanitize_username("bob"), "bob");
    }

    #[test]
    fn classifies_known_extensions() {
        assert_eq!(classify_extension("notes.txt").unwrap(), MediaClass::Text);
        assert_eq!(classify_extension("clip.WAV").unwrap(), MediaClass::Media);
        assert_eq!(classify_extension("photo.jpg").unwrap(), MediaClass::Media);
        assert_eq!(classify_extension("icon.png").unwrap(), MediaClass::Media);
    }

    #[test]
    fn rejects_unknown_extensions() {
        assert!(classify_extension("archive.zip").is_err());
        assert!(classify_extension("no_extension").is_err());
    }
}
