#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `distort-frame` is the pure codec for the fixed 256-byte wire unit shared
//! by every peer in the distortion service: clients, workers, and the
//! coordinator. It has no knowledge of sockets, threads, or time — only the
//! byte layout, the checksum, and the `&`-delimited payload grammars.
//!
//! # Design
//!
//! - [`Frame`] is a plain value (`Clone`, `PartialEq`) carrying a
//!   [`MessageType`], a length-prefixed payload, and a send-time timestamp.
//! - [`encode`] and [`decode`] are free functions over `[u8; FRAME_LEN]` so
//!   storage of the wire buffer stays the caller's concern.
//! - [`fields`] hosts the one schema table every payload grammar in the
//!   protocol is parsed and built through, replacing the ad-hoc
//!   `&`-splitting the original implementation scattered across call sites.
//!
//! # Invariants
//!
//! - `decode(encode(f)) == Ok(f)` for every constructible [`Frame`] (this
//!   module's round-trip property).
//! - Any single-bit mutation of an encoded frame's wire bytes fails
//!   [`decode`] with [`FrameError::ChecksumMismatch`] or another variant.
//! - [`decode`] never returns a [`Frame`] whose checksum does not match; no
//!   partially-trusted frame is ever handed upstream.

mod checksum;
pub mod fields;
mod frame;
mod media_class;
mod message_type;

pub use checksum::calculate_checksum;
pub use frame::{Frame, FrameError, decode, encode};
pub use media_class::{MediaClass, UnknownMediaClass};
pub use message_type::MessageType;

/// Total length in bytes of a frame on the wire.
pub const FRAME_LEN: usize = 256;

/// Maximum number of significant payload bytes (`dataLength`'s range is
/// `0..=DATA_LEN`).
pub const DATA_LEN: usize = 247;

/// The delimiter separating textual subfields within a frame's payload.
pub const FIELD_DELIMITER: u8 = b'&';

pub(crate) const TYPE_OFFSET: usize = 0;
pub(crate) const LENGTH_OFFSET: usize = 1;
pub(crate) const DATA_OFFSET: usize = 3;
pub(crate) const CHECKSUM_OFFSET: usize = DATA_OFFSET + DATA_LEN;
pub(crate) const TIMESTAMP_OFFSET: usize = CHECKSUM_OFFSET + 2;

const _: () = assert!(TIMESTAMP_OFFSET + 4 == FRAME_LEN);
