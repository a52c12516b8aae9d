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

//! HTTP transport for the qBittorrent Web API v2: login/session cookie,
//! `MainData` sync, torrent queries, action endpoints, and logs.
//!
//! This crate owns only the wire protocol (spec.md §4.A, §6); it has no
//! opinion about caching, retries, or backoff — those live in
//! `qbproxy-sync` and `qbproxy-pool`, which consume [`Transport`] as a
//! collaborator.

pub mod api;
pub mod client;
pub mod error;
pub mod quirks;
pub mod wire;

pub use api::QbittorrentTransport;
pub use client::{classify_status, RawLogEntry, RawPeerLogEntry, TorrentListQuery, Transport};
pub use error::{TransportError, TransportResult};
