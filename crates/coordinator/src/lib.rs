#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! The coordinator binary (`coordinatord`, nicknamed "Gotham" in the
//! original implementation's logs — a nickname this crate keeps only in
//! `tracing` output, never on the wire) accepts both client and worker
//! connections, maintains the [`registry::Registry`], and dispatches
//! `DISTORT_REQ`/`RESUME_REQ` to an idle primary worker (§4.3).
//!
//! # Design
//!
//! - One `tokio::net::TcpListener` per configured bind address; if the
//!   client-facing and worker-facing endpoints resolve to the same address,
//!   a single listener serves both roles and [`session::handle_connection`]
//!   classifies each accepted peer by its first frame.
//! - Every accepted connection is spawned as its own task holding
//!   exclusive ownership of its [`transport::FramedConnection`] (§5).
//! - [`peer_directory::PeerDirectory`] is the one piece of cross-task state
//!   beyond the registry itself: it lets the sweeper and a worker's peer
//!   connection task deliver a `NEW_MAIN` frame to the *newly promoted*
//!   worker's own task, and lets [`run`]'s shutdown path reach every
//!   registered worker and client with `DISCONNECT`, without ever touching
//!   a peer's socket from outside its owning task (§5, spec.md:157).

mod error;
mod peer_directory;
mod session;
mod state;
mod sweeper;
mod time;

pub use error::CoordinatorError;
pub use state::AppState;

use std::net::SocketAddr;
use std::time::Duration;

use config::CoordinatorConfig;
use peer_directory::PeerSignal;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Runs the coordinator until `ctrl_c` is received.
pub async fn run(config: CoordinatorConfig) -> Result<(), CoordinatorError> {
    let client_addr = SocketAddr::new(config.client_bind_ip, config.client_bind_port);
    let worker_addr = SocketAddr::new(config.worker_bind_ip, config.effective_worker_bind_port());
    let timeout = Duration::from_secs(config.heartbeat_timeout_secs);
    let state = AppState::new(timeout);

    let listeners = if client_addr == worker_addr {
        vec![bind(client_addr).await?]
    } else {
        vec![bind(client_addr).await?, bind(worker_addr).await?]
    };

    for listener in listeners {
        let local_addr = listener
            .local_addr()
            .unwrap_or_else(|_| "0.0.0.0:0".parse().unwrap());
        info!(%local_addr, "listening");
        let state = state.clone();
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, peer_addr)) => {
                        let state = state.clone();
                        tokio::spawn(session::handle_connection(stream, peer_addr, state));
                    }
                    Err(err) => {
                        error!(error = %err, "accept failed");
                    }
                }
            }
        });
    }

    tokio::spawn(sweeper::run(state.clone(), timeout, timeout * 2));

    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl-C handler");
    info!("shutdown requested, notifying peers and draining in-flight sessions");
    state.directory.notify_all(PeerSignal::Disconnect);
    tokio::time::sleep(timeout).await;
    Ok(())
}

async fn bind(addr: SocketAddr) -> Result<TcpListener, CoordinatorError> {
    TcpListener::bind(addr)
        .await
        .map_err(|source| CoordinatorError::Bind { addr, source })
}
