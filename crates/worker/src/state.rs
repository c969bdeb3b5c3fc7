/// The worker's lifecycle (spec.md:107): registers once, then alternates
/// between waiting for a client and serving one, until asked to shut down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Process just started; nothing has happened yet.
    Booting,
    /// `WORKER_REG` is in flight with the coordinator.
    Registering,
    /// Registered, waiting to accept exactly one client on the listening
    /// socket.
    Idle,
    /// Serving the one client currently connected.
    Serving,
    /// Shutting down: no new clients are accepted, the active session (if
    /// any) is left to finish, then the coordinator link is closed.
    Draining,
    /// The worker has closed its coordinator link and is about to exit.
    Terminated,
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            WorkerState::Booting => "Booting",
            WorkerState::Registering => "Registering",
            WorkerState::Idle => "Idle",
            WorkerState::Serving => "Serving",
            WorkerState::Draining => "Draining",
            WorkerState::Terminated => "Terminated",
        };
        f.write_str(label)
    }
}
