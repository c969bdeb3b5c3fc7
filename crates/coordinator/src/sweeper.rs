use std::time::Duration;

use tracing::info;

use registry::PeerId;

use crate::peer_directory::PeerSignal;
use crate::state::AppState;

/// Runs forever, evicting workers and clients that have been silent for
/// `threshold`, and notifying any worker promoted to primary along the way
/// (§4.2, P6).
///
/// This task never touches a connection's socket directly — the eviction
/// itself happens inside `Registry::sweep_expired` under its own lock, and
/// the only cross-task effect here is a non-blocking [`PeerSignal`] post,
/// mirroring how a live connection's own task is the sole writer to its
/// stream (§5).
pub async fn run(state: AppState, interval: Duration, threshold: Duration) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        let result = state
            .registry
            .sweep_expired(threshold, std::time::Instant::now());
        if result.did_nothing() {
            continue;
        }
        for (evicted, promoted) in &result.evicted_workers {
            info!(?evicted, ?promoted, "heartbeat sweep evicted a silent worker");
            if let Some(promoted) = promoted {
                state.directory.notify(PeerId::Worker(*promoted), PeerSignal::NewMain);
            }
        }
        for client in &result.evicted_clients {
            info!(?client, "heartbeat sweep evicted a silent client");
        }
    }
}
