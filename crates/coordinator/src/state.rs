use std::sync::Arc;
use std::time::Duration;

use registry::Registry;

use crate::peer_directory::PeerDirectory;

/// Shared state every connection task holds a clone of.
#[derive(Clone)]
pub struct AppState {
    /// The worker/client session tables and election state.
    pub registry: Arc<Registry>,
    /// Cross-connection notification channels (currently primary promotion).
    pub directory: Arc<PeerDirectory>,
    /// Per-frame read/write deadline and heartbeat cadence.
    pub timeout: Duration,
}

impl AppState {
    /// Builds fresh, empty shared state.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            registry: Arc::new(Registry::new()),
            directory: Arc::new(PeerDirectory::new()),
            timeout,
        }
    }
}
