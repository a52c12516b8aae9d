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

//! The per-instance Sync Manager poll loop, plus the filtering, sorting,
//! searching, and stats/counts passes `qbproxy-client` applies to the
//! merged `MainData` image it maintains.

pub mod error;
pub mod filter;
pub mod manager;
pub mod merge;
pub mod search;
pub mod sort;
pub mod stats;

pub use error::{SyncError, SyncResult};
pub use manager::{HealthSink, ManagerState, SyncCommand, SyncManager};
pub use merge::merge_main_data;
