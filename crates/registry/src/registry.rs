use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use frame::MediaClass;

use crate::error::RegistryError;
use crate::ids::{ClientId, PeerId, WorkerId};
use crate::record::{ClientRecord, Role, WorkerRecord};

/// The outcome of a successful `pick_worker` call: enough to build a
/// `DISTORT_REQ`/`RESUME_REQ` success reply (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerHandle {
    /// The chosen worker's identity.
    pub id: WorkerId,
}

/// What a heartbeat sweep found and already acted on.
#[derive(Debug, Clone, Default)]
pub struct SweepResult {
    /// Workers evicted for silence, paired with the worker promoted to
    /// replace them as primary, if any.
    pub evicted_workers: Vec<(WorkerId, Option<WorkerId>)>,
    /// Clients evicted for silence.
    pub evicted_clients: Vec<ClientId>,
}

impl SweepResult {
    fn is_empty(&self) -> bool {
        self.evicted_workers.is_empty() && self.evicted_clients.is_empty()
    }
}

/// The coordinator's worker and client session tables and primary election
/// state (§4.3).
///
/// Each table sits behind its own `std::sync::Mutex`; no `.await` is ever
/// reached while a lock is held, so the coordinator's per-connection tasks
/// never block each other on I/O, only on the brief table scan itself.
/// Notifying an affected peer (sending `NEW_MAIN`, `DISCONNECT`, and so on)
/// is always the caller's job, done after the relevant call returns.
#[derive(Debug, Default)]
pub struct Registry {
    workers: Mutex<HashMap<WorkerId, WorkerRecord>>,
    clients: Mutex<HashMap<ClientId, ClientRecord>>,
    next_client_id: AtomicU64,
    next_seq: AtomicU64,
}

impl Registry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a worker, electing it `Primary` if its class has none yet
    /// or `Secondary` otherwise (§4.3.1, eager election).
    pub fn register_worker(
        &self,
        class: MediaClass,
        addr: SocketAddr,
        now: Instant,
    ) -> Result<(WorkerId, Role), RegistryError> {
        let id = WorkerId::new(class, addr);
        let mut workers = self.workers.lock().expect("registry mutex poisoned");
        if workers.contains_key(&id) {
            return Err(RegistryError::DuplicateWorker(id));
        }
        let role = if workers
            .values()
            .any(|w| w.id.class == class && w.role == Role::Primary)
        {
            Role::Secondary
        } else {
            Role::Primary
        };
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        workers.insert(
            id,
            WorkerRecord {
                id,
                role,
                busy: false,
                seq,
                last_heartbeat: now,
            },
        );
        Ok((id, role))
    }

    /// Registers a newly connected client, handing back its generated id.
    pub fn register_client(&self, username: impl Into<String>, now: Instant) -> ClientId {
        let id = ClientId(self.next_client_id.fetch_add(1, Ordering::Relaxed));
        let mut clients = self.clients.lock().expect("registry mutex poisoned");
        clients.insert(
            id,
            ClientRecord {
                username: username.into(),
                last_heartbeat: now,
                current_worker: None,
                resumed: false,
            },
        );
        id
    }

    /// Picks the idle primary worker for `class`, marking it busy.
    ///
    /// Returns `None` if the class has no registered primary or its primary
    /// is already serving another session (§4.3.2).
    pub fn pick_worker(&self, class: MediaClass) -> Option<WorkerHandle> {
        let mut workers = self.workers.lock().expect("registry mutex poisoned");
        let record = workers
            .values_mut()
            .find(|w| w.id.class == class && w.role == Role::Primary && !w.busy)?;
        record.busy = true;
        Some(WorkerHandle { id: record.id })
    }

    /// Marks a worker idle again once its session ends (§4.4.1 step 7).
    pub fn mark_free(&self, id: WorkerId) -> Result<(), RegistryError> {
        self.set_worker_busy(id, false)
    }

    /// Sets a worker's busy flag directly. Workers report their own
    /// idle/serving state on every `HEARTBEAT` they send (the protocol
    /// defines no dedicated "session ended" frame), so the coordinator
    /// applies that report here rather than inferring it from dispatch
    /// alone.
    pub fn set_worker_busy(&self, id: WorkerId, busy: bool) -> Result<(), RegistryError> {
        let mut workers = self.workers.lock().expect("registry mutex poisoned");
        let record = workers.get_mut(&id).ok_or(RegistryError::NoSuchWorker(id))?;
        record.busy = busy;
        Ok(())
    }

    /// Removes a worker from the registry. If it was the class's primary,
    /// promotes the secondary with the lowest registration order and
    /// returns its id so the caller can deliver `NEW_MAIN` (§4.3.1).
    pub fn evict_worker(&self, id: WorkerId) -> Result<Option<WorkerId>, RegistryError> {
        let mut workers = self.workers.lock().expect("registry mutex poisoned");
        let removed = workers
            .remove(&id)
            .ok_or(RegistryError::NoSuchWorker(id))?;
        if removed.role != Role::Primary {
            return Ok(None);
        }
        let promoted = workers
            .values_mut()
            .filter(|w| w.id.class == removed.id.class)
            .min_by_key(|w| w.seq)
            .map(|w| {
                w.role = Role::Primary;
                w.id
            });
        Ok(promoted)
    }

    /// Removes a client from the registry.
    pub fn evict_client(&self, id: ClientId) -> Result<(), RegistryError> {
        let mut clients = self.clients.lock().expect("registry mutex poisoned");
        clients
            .remove(&id)
            .map(|_| ())
            .ok_or(RegistryError::NoSuchClient(id))
    }

    /// Records that traffic (of any kind, including `HEARTBEAT`) was just
    /// observed from `peer`.
    pub fn touch_heartbeat(&self, peer: PeerId, now: Instant) -> Result<(), RegistryError> {
        match peer {
            PeerId::Worker(id) => {
                let mut workers = self.workers.lock().expect("registry mutex poisoned");
                let record = workers.get_mut(&id).ok_or(RegistryError::NoSuchWorker(id))?;
                record.last_heartbeat = now;
            }
            PeerId::Client(id) => {
                let mut clients = self.clients.lock().expect("registry mutex poisoned");
                let record = clients.get_mut(&id).ok_or(RegistryError::NoSuchClient(id))?;
                record.last_heartbeat = now;
            }
        }
        Ok(())
    }

    /// Whether `client` has already used its one resume attempt (§7.3).
    pub fn client_has_resumed(&self, client: ClientId) -> Result<bool, RegistryError> {
        let clients = self.clients.lock().expect("registry mutex poisoned");
        clients
            .get(&client)
            .map(ClientRecord::has_resumed)
            .ok_or(RegistryError::NoSuchClient(client))
    }

    /// Records which worker is currently serving `client`, or clears it
    /// (`None`) once the session ends.
    pub fn set_client_worker(
        &self,
        client: ClientId,
        worker: Option<WorkerId>,
    ) -> Result<(), RegistryError> {
        let mut clients = self.clients.lock().expect("registry mutex poisoned");
        let record = clients
            .get_mut(&client)
            .ok_or(RegistryError::NoSuchClient(client))?;
        record.current_worker = worker;
        Ok(())
    }

    /// Flags that `client` has used its one resume attempt for the active
    /// session (§7.3).
    pub fn mark_client_resumed(&self, client: ClientId) -> Result<(), RegistryError> {
        let mut clients = self.clients.lock().expect("registry mutex poisoned");
        let record = clients
            .get_mut(&client)
            .ok_or(RegistryError::NoSuchClient(client))?;
        record.resumed = true;
        Ok(())
    }

    /// Clients currently bound to `worker`, used to find who needs a
    /// resume prompt after that worker is evicted.
    #[must_use]
    pub fn clients_bound_to(&self, worker: WorkerId) -> Vec<ClientId> {
        let clients = self.clients.lock().expect("registry mutex poisoned");
        clients
            .iter()
            .filter(|(_, record)| record.current_worker == Some(worker))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Evicts every worker and client that has been silent for at least
    /// `threshold` as of `now` (§4.2, P6), promoting replacement primaries
    /// along the way.
    pub fn sweep_expired(&self, threshold: Duration, now: Instant) -> SweepResult {
        let expired_workers: Vec<WorkerId> = {
            let workers = self.workers.lock().expect("registry mutex poisoned");
            workers
                .values()
                .filter(|w| w.idle_for(now) >= threshold)
                .map(|w| w.id)
                .collect()
        };
        let expired_clients: Vec<ClientId> = {
            let clients = self.clients.lock().expect("registry mutex poisoned");
            clients
                .iter()
                .filter(|(_, record)| record.idle_for(now) >= threshold)
                .map(|(id, _)| *id)
                .collect()
        };

        let mut result = SweepResult::default();
        for id in expired_workers {
            if let Ok(promoted) = self.evict_worker(id) {
                result.evicted_workers.push((id, promoted));
            }
        }
        for id in expired_clients {
            if self.evict_client(id).is_ok() {
                result.evicted_clients.push(id);
            }
        }
        result
    }
}

impl SweepResult {
    /// Whether this sweep found nothing to evict.
    #[must_use]
    pub fn did_nothing(&self) -> bool {
        self.is_empty()
    }
}
