#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! The worker binary registers with a coordinator for one [`frame::MediaClass`],
//! then serves clients that the coordinator has dispatched directly to it
//! (§4.4). A worker never talks to another worker and never talks to the
//! coordinator on behalf of a client session — the two roles run as
//! independent concurrent tasks sharing only a busy/idle status channel.
//!
//! # Design
//!
//! - [`coordinator_link::CoordinatorLink`] owns the one persistent
//!   connection back to the coordinator: `WORKER_REG`, heartbeats (doubling
//!   as busy/idle reports), and `NEW_MAIN` promotion.
//! - [`client_session::handle`] owns a single client's `WORKER_CONNECT`
//!   session: receive, verify, distort, reply.
//! - [`distortion::Distort`] is the pluggable transformation; this crate
//!   ships [`distortion::IdentityDistort`] as its reference implementation.
//! - [`state::WorkerState`] makes the lifecycle from spec.md:107 explicit:
//!   `Booting -> Registering -> Idle -> Serving -> Idle ... -> Draining ->
//!   Terminated`. The accept loop in [`run`] serves exactly one client at a
//!   time — the listening socket is never touched from inside a spawned
//!   task while a session is in progress.

mod client_session;
mod coordinator_link;
mod distortion;
mod error;
mod state;
mod time;

pub use distortion::{Distort, IdentityDistort};
pub use error::WorkerError;
pub use state::WorkerState;

use std::net::SocketAddr;
use std::sync::Arc;

use config::WorkerConfig;
use coordinator_link::CoordinatorLink;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info};
use transport::DEFAULT_TIMEOUT;

/// Runs the worker: registers with the coordinator, then alternates
/// between `Idle` and `Serving` one client at a time until a shutdown
/// request is observed while `Idle`, at which point it drains into
/// `Terminated`.
pub async fn run(config: WorkerConfig) -> Result<(), WorkerError> {
    let coordinator_addr = SocketAddr::new(config.coordinator_ip, config.coordinator_port);
    let bind_addr = SocketAddr::new(config.bind_ip, config.bind_port);
    let timeout = DEFAULT_TIMEOUT;

    let mut state = WorkerState::Booting;
    info!(%state, class = %config.class, "starting up");

    state = WorkerState::Registering;
    let link = CoordinatorLink::connect(coordinator_addr, config.class, bind_addr, timeout).await?;

    let (status_tx, status_rx) = mpsc::unbounded_channel();
    let link_task = tokio::spawn(link.run(timeout, status_rx));

    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|source| WorkerError::Bind {
            addr: bind_addr,
            source,
        })?;
    info!(%bind_addr, class = %config.class, "serving clients");

    let distort: Arc<dyn Distort> = Arc::new(distortion::IdentityDistort);
    let save_folder = config.save_folder.clone();

    // A background task holds the one `ctrl_c()` future for the process's
    // whole lifetime, so a Ctrl-C received while `Serving` (and therefore
    // not being polled below) is still buffered rather than lost.
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(()).await;
        }
    });

    state = WorkerState::Idle;
    loop {
        tokio::select! {
            _ = shutdown_rx.recv(), if state == WorkerState::Idle => {
                info!(%state, "shutdown requested");
                state = WorkerState::Draining;
                break;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer_addr)) => {
                        info!(%peer_addr, "client connected");
                        state = WorkerState::Serving;
                        client_session::handle(
                            stream,
                            save_folder.clone(),
                            Arc::clone(&distort),
                            status_tx.clone(),
                            timeout,
                        )
                        .await;
                        state = WorkerState::Idle;
                    }
                    Err(err) => error!(error = %err, "accept failed"),
                }
            }
        }
    }

    drop(status_tx);
    let _ = link_task.await;
    state = WorkerState::Terminated;
    info!(%state, "worker terminated");
    Ok(())
}
