use std::collections::HashMap;
use std::sync::Mutex;

use registry::PeerId;
use tokio::sync::mpsc;

/// A signal delivered to a peer's own connection task, which is the only
/// code ever writing to that peer's socket (§5: no second task touches a
/// connection's stream).
#[derive(Debug, Clone, Copy)]
pub enum PeerSignal {
    /// This worker has been promoted to primary for its class; send
    /// `NEW_MAIN`.
    NewMain,
    /// The coordinator is shutting down; send `DISCONNECT` and close.
    Disconnect,
}

/// Maps every registered peer, worker or client, to the channel its own
/// connection task is listening on.
///
/// `Registry::evict_worker` only returns *which* worker was promoted; it
/// never touches a socket itself (§5). The coordinator looks up that
/// worker's sender here and posts a [`PeerSignal`] — an unbounded,
/// non-blocking send, not I/O, so doing this right after the registry call
/// (table lock already released) introduces no suspension under a lock.
/// A forced shutdown uses the same mechanism to reach every connected peer
/// with `Disconnect` (spec.md:157).
#[derive(Debug, Default)]
pub struct PeerDirectory {
    peers: Mutex<HashMap<PeerId, mpsc::UnboundedSender<PeerSignal>>>,
}

impl PeerDirectory {
    /// An empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `id`'s signal channel, returning the receiving half for
    /// that peer's connection task to poll.
    pub fn insert(&self, id: PeerId) -> mpsc::UnboundedReceiver<PeerSignal> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.peers
            .lock()
            .expect("peer directory mutex poisoned")
            .insert(id, tx);
        rx
    }

    /// Removes `id`'s channel, e.g. once its connection task exits.
    pub fn remove(&self, id: PeerId) {
        self.peers
            .lock()
            .expect("peer directory mutex poisoned")
            .remove(&id);
    }

    /// Delivers `signal` to `id`'s connection task, if it is still present.
    pub fn notify(&self, id: PeerId, signal: PeerSignal) {
        let peers = self.peers.lock().expect("peer directory mutex poisoned");
        if let Some(tx) = peers.get(&id) {
            let _ = tx.send(signal);
        }
    }

    /// Delivers `signal` to every currently registered peer, worker and
    /// client alike. Used for the forced-shutdown `DISCONNECT` broadcast.
    pub fn notify_all(&self, signal: PeerSignal) {
        let peers = self.peers.lock().expect("peer directory mutex poisoned");
        for tx in peers.values() {
            let _ = tx.send(signal);
        }
    }
}
