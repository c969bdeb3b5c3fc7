use std::net::SocketAddr;

/// The client session state machine (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// No connection to the coordinator.
    Offline,
    /// Registered with the coordinator; accepting interactive commands.
    Connected,
    /// A `DISTORT_REQ`/`RESUME_REQ` is in flight.
    Requesting,
    /// Uploading a file to the dispatched worker.
    Streaming,
    /// Downloading and checksumming the distorted result.
    Verifying,
}

impl std::fmt::Display for ClientState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ClientState::Offline => "Offline",
            ClientState::Connected => "Connected",
            ClientState::Requesting => "Requesting",
            ClientState::Streaming => "Streaming",
            ClientState::Verifying => "Verifying",
        };
        f.write_str(label)
    }
}

/// The local-only progress snapshot `CHECK STATUS` reports (§6, §4.5).
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    /// The current state-machine state.
    pub state: ClientState,
    /// The worker endpoint currently serving this session, if any.
    pub current_worker: Option<SocketAddr>,
    /// Bytes transferred so far in the active upload or download.
    pub bytes_transferred: u64,
}

impl std::fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "state: {}", self.state)?;
        if let Some(worker) = self.current_worker {
            write!(f, ", worker: {worker}, bytes transferred: {}", self.bytes_transferred)?;
        }
        Ok(())
    }
}
