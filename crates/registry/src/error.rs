use frame::UnknownMediaClass;

use crate::ids::{ClientId, WorkerId};

/// Errors surfaced by [`crate::Registry`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A `WORKER_REG` carried a class spelling outside `Text`/`Media`.
    #[error(transparent)]
    UnknownClass(#[from] UnknownMediaClass),
    /// A worker attempted to register at an identity already on file.
    /// Not expected in normal operation — each accepted connection is
    /// handled by its own task and registers at most once — but defensive
    /// since two workers could in principle share an advertised address.
    #[error("worker {0:?} is already registered")]
    DuplicateWorker(WorkerId),
    /// An operation referenced a worker id no longer (or never) present.
    #[error("no such worker {0:?}")]
    NoSuchWorker(WorkerId),
    /// An operation referenced a client id no longer (or never) present.
    #[error("no such client {0:?}")]
    NoSuchClient(ClientId),
}
