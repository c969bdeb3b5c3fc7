use std::net::SocketAddr;

use frame::MediaClass;

/// Stable identity of a registered worker: its class plus the socket it
/// registered from. Two workers of the same class are distinct records even
/// if one later disconnects and a new one reuses the class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkerId {
    /// The media class this worker serves.
    pub class: MediaClass,
    /// The address the worker registered with.
    pub addr: SocketAddr,
}

impl WorkerId {
    /// Builds a worker identity from its class and address.
    #[must_use]
    pub fn new(class: MediaClass, addr: SocketAddr) -> Self {
        Self { class, addr }
    }
}

/// Stable identity of a connected client. Clients have no durable address
/// (they are free to reconnect from a new source port), so the registry
/// hands out a monotonic id at `CONNECT_REQ` time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub u64);

/// Either half of the registry's session tables, for calls that apply to
/// whichever peer kind sent a given frame (e.g. `touch_heartbeat`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeerId {
    /// A registered worker.
    Worker(WorkerId),
    /// A connected client.
    Client(ClientId),
}
