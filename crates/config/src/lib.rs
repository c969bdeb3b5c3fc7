#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `distort-config` parses the TOML configuration record for each of the
//! three peer roles. The original implementation's bespoke line-oriented
//! config format (`config.c`'s hand-rolled `load_*_config` functions) is
//! replaced here by `serde` + `toml`, the idiomatic Rust equivalent,
//! carrying the same fields under role-neutral names.
//!
//! # Errors
//!
//! Loading never panics; every failure is a [`ConfigError`] that the
//! calling binary logs and turns into exit code 1 (§6, §7.6).

mod client;
mod coordinator;
mod error;
mod media_class_serde;
mod worker;

pub use client::ClientConfig;
pub use coordinator::CoordinatorConfig;
pub use error::ConfigError;
pub use worker::WorkerConfig;
