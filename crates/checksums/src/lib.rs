#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `distort-checksums` provides the single integrity primitive the
//! distortion protocol needs: a streaming MD5 digest used to verify a file
//! survived transfer (and distortion) unchanged from what the sender
//! declared in `FILE_INFO`/`WORKER_CONNECT`.
//!
//! # Design
//!
//! Kept deliberately to one algorithm and one wrapper ([`Md5`]) rather than
//! the strategy-pattern, multi-algorithm registry a delta-transfer engine
//! would need — this protocol never negotiates a checksum algorithm, it
//! always uses MD5 hex digests in payload text (P4, P5 in the session
//! integrity invariants).
//!
//! # Examples
//!
//! ```
//! use distort_checksums::Md5;
//!
//! let digest = Md5::digest(b"Hello World.\n");
//! assert_eq!(Md5::to_hex(&digest).len(), 32);
//! ```

mod md5;

pub use md5::Md5;
