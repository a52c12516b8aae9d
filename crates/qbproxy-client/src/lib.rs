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

//! The per-instance `Client`: capability negotiation, the Sync Manager poll
//! loop, the hash/duplicate index, the tracker subsystem, completion
//! detection, the optimistic-update overlay, and the single-slot caches that
//! together implement the typed per-instance operations this proxy exposes
//! over one configured qBittorrent remote.

pub mod app_info;
pub mod client;
pub mod completion;
pub mod error;
pub mod files;
pub mod hash_index;
pub mod optimistic;
pub mod session;
pub mod tracker;

pub use app_info::{AppInfo, AppInfoCache, PreferencesCache};
pub use client::Client;
pub use completion::CompletionTracker;
pub use error::{ClientError, ClientResult};
pub use files::{get_files_batch, normalize_hash, FilesManager};
pub use hash_index::{DuplicateIndex, DuplicateIndexEntry, DuplicateMatch};
pub use optimistic::{predicted_state, ActionKind, OptimisticUpdate};
pub use session::SessionTracker;
pub use tracker::{TrackerSubsystem, TrackerSubsystemConfig};
