use std::time::Instant;

use crate::ids::WorkerId;

/// A worker's standing within its class: exactly one `Primary` per class at
/// a time, any number of `Secondary` understudies (§4.3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Dispatch target for `DISTORT_REQ`/`RESUME_REQ` of this worker's class.
    Primary,
    /// Promoted to `Primary` in registration order if the current primary
    /// is evicted.
    Secondary,
}

/// Coordinator-owned bookkeeping for one registered worker.
#[derive(Debug, Clone)]
pub struct WorkerRecord {
    pub(crate) id: WorkerId,
    pub(crate) role: Role,
    pub(crate) busy: bool,
    /// Monotonic registration order, used to pick the next primary on
    /// eviction (lowest surviving `seq` within the class wins).
    pub(crate) seq: u64,
    pub(crate) last_heartbeat: Instant,
}

impl WorkerRecord {
    /// This worker's stable identity.
    #[must_use]
    pub fn id(&self) -> WorkerId {
        self.id
    }

    /// `Primary` or `Secondary` within its class.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Whether the worker currently has an assigned session.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Time since the worker's last observed traffic.
    #[must_use]
    pub fn idle_for(&self, now: Instant) -> std::time::Duration {
        now.saturating_duration_since(self.last_heartbeat)
    }
}

/// Coordinator-owned bookkeeping for one connected client.
#[derive(Debug, Clone)]
pub struct ClientRecord {
    pub(crate) username: String,
    pub(crate) last_heartbeat: Instant,
    /// The worker currently serving this client's active session, if any.
    /// Tracked so a worker eviction can identify which clients need a
    /// resume prompt (§7.3).
    pub(crate) current_worker: Option<WorkerId>,
    /// Whether this client has already spent its one resume attempt for
    /// the active session (§7.3: "at most one resume attempt").
    pub(crate) resumed: bool,
}

impl ClientRecord {
    /// The username the client declared at `CONNECT_REQ` time.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The worker currently serving this client, if any.
    #[must_use]
    pub fn current_worker(&self) -> Option<WorkerId> {
        self.current_worker
    }

    /// Whether this client has already used its one resume attempt.
    #[must_use]
    pub fn has_resumed(&self) -> bool {
        self.resumed
    }

    /// Time since the client's last observed traffic.
    #[must_use]
    pub fn idle_for(&self, now: Instant) -> std::time::Duration {
        now.saturating_duration_since(self.last_heartbeat)
    }
}
