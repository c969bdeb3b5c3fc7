#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `distort-registry` is the coordinator's worker and client session
//! bookkeeping: who is registered, which worker is primary for each class,
//! who is bound to whom, and who has gone quiet.
//!
//! # Design
//!
//! The registry is deliberately synchronous and has no knowledge of sockets
//! or the `tokio` runtime — it is plain shared state behind two
//! `std::sync::Mutex` guards, one per table. A coordinator binary calls it
//! from async tasks but never holds a guard across an `.await` point, so
//! ordinary blocking locks are correct and cheap (§5). Delivering the
//! consequences of a table change — a `NEW_MAIN` frame, a `DISCONNECT` —
//! is always left to the caller, after the lock has been released.
//!
//! # Errors
//!
//! [`RegistryError`] distinguishes a caller mistake (referencing an id no
//! longer present) from the class-parsing error surfaced by [`frame`].

mod error;
mod ids;
mod record;
#[allow(clippy::module_inception)]
mod registry;

pub use error::RegistryError;
pub use ids::{ClientId, PeerId, WorkerId};
pub use record::{ClientRecord, Role, WorkerRecord};
pub use registry::{Registry, SweepResult, WorkerHandle};

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::time::{Duration, Instant};

    use frame::MediaClass;

    use super::*;

    fn addr(port: u16) -> SocketAddr {
        format!("127.0.0.1:{port}").parse().unwrap()
    }

    #[test]
    fn first_worker_of_a_class_is_elected_primary() {
        let registry = Registry::new();
        let now = Instant::now();
        let (_id, role) = registry
            .register_worker(MediaClass::Text, addr(9001), now)
            .unwrap();
        assert_eq!(role, Role::Primary);
    }

    #[test]
    fn second_worker_of_same_class_is_secondary() {
        let registry = Registry::new();
        let now = Instant::now();
        registry
            .register_worker(MediaClass::Text, addr(9001), now)
            .unwrap();
        let (_id, role) = registry
            .register_worker(MediaClass::Text, addr(9002), now)
            .unwrap();
        assert_eq!(role, Role::Secondary);
    }

    #[test]
    fn different_classes_each_get_their_own_primary() {
        let registry = Registry::new();
        let now = Instant::now();
        let (_t, text_role) = registry
            .register_worker(MediaClass::Text, addr(9001), now)
            .unwrap();
        let (_m, media_role) = registry
            .register_worker(MediaClass::Media, addr(9002), now)
            .unwrap();
        assert_eq!(text_role, Role::Primary);
        assert_eq!(media_role, Role::Primary);
    }

    #[test]
    fn evicting_primary_promotes_oldest_secondary() {
        let registry = Registry::new();
        let now = Instant::now();
        let (primary, _) = registry
            .register_worker(MediaClass::Text, addr(9001), now)
            .unwrap();
        let (secondary_a, _) = registry
            .register_worker(MediaClass::Text, addr(9002), now)
            .unwrap();
        let (_secondary_b, _) = registry
            .register_worker(MediaClass::Text, addr(9003), now)
            .unwrap();

        let promoted = registry.evict_worker(primary).unwrap();
        assert_eq!(promoted, Some(secondary_a));
    }

    #[test]
    fn evicting_a_secondary_promotes_no_one() {
        let registry = Registry::new();
        let now = Instant::now();
        registry
            .register_worker(MediaClass::Text, addr(9001), now)
            .unwrap();
        let (secondary, _) = registry
            .register_worker(MediaClass::Text, addr(9002), now)
            .unwrap();

        let promoted = registry.evict_worker(secondary).unwrap();
        assert_eq!(promoted, None);
    }

    #[test]
    fn pick_worker_skips_busy_primary() {
        let registry = Registry::new();
        let now = Instant::now();
        registry
            .register_worker(MediaClass::Media, addr(9001), now)
            .unwrap();

        let first = registry.pick_worker(MediaClass::Media);
        assert!(first.is_some());
        assert!(registry.pick_worker(MediaClass::Media).is_none());

        registry.mark_free(first.unwrap().id).unwrap();
        assert!(registry.pick_worker(MediaClass::Media).is_some());
    }

    #[test]
    fn sweep_evicts_silent_workers_and_promotes() {
        let registry = Registry::new();
        let t0 = Instant::now();
        let (primary, _) = registry
            .register_worker(MediaClass::Text, addr(9001), t0)
            .unwrap();
        let (secondary, _) = registry
            .register_worker(MediaClass::Text, addr(9002), t0)
            .unwrap();
        registry
            .touch_heartbeat(PeerId::Worker(secondary), t0 + Duration::from_secs(30))
            .unwrap();

        let result = registry.sweep_expired(Duration::from_secs(20), t0 + Duration::from_secs(30));
        assert_eq!(result.evicted_workers, vec![(primary, Some(secondary))]);
    }

    #[test]
    fn evicting_a_worker_surfaces_its_bound_clients() {
        let registry = Registry::new();
        let now = Instant::now();
        let (worker, _) = registry
            .register_worker(MediaClass::Text, addr(9001), now)
            .unwrap();
        let client = registry.register_client("alice", now);
        registry.set_client_worker(client, Some(worker)).unwrap();

        assert_eq!(registry.clients_bound_to(worker), vec![client]);
        assert!(!registry.clients_bound_to(worker).is_empty());

        registry.mark_client_resumed(client).unwrap();
    }
}
