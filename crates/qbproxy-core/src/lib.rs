#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]
#![allow(unexpected_cfgs)]

//! Engine-agnostic domain model and error taxonomy for the qBittorrent
//! multi-instance proxy core.
//!
//! Every other crate in this workspace depends on `qbproxy-core` for its
//! plain-data types ([`model`]) and its coarse failure classification
//! ([`error`]); it has no dependency of its own on any other workspace
//! crate.

pub mod error;
pub mod model;

pub use error::ErrorKind;
