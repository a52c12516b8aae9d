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

//! Per-instance and process-level configuration types.
//!
//! This crate models the shapes described in spec.md §3 (`InstanceRecord`)
//! and §6 (the tunable process-wide constants) but owns no persistence: the
//! `InstanceStore` collaborator that lists/updates/deletes instance records
//! lives outside this workspace.

pub mod error;
pub mod model;
pub mod store;

pub use error::{ConfigError, ConfigResult};
pub use model::{
    BasicAuth, InstanceRecord, ProcessConfig, DEFAULT_APP_INFO_TTL, DEFAULT_CONNECTION_TIMEOUT,
    DEFAULT_FILES_BATCH_CONCURRENCY, DEFAULT_MIN_HEALTH_CHECK_INTERVAL, DEFAULT_OPTIMISTIC_UPDATE_TTL,
    DEFAULT_PREFERENCES_TTL, DEFAULT_TRACKER_CACHE_TTL, DEFAULT_TRACKER_COUNT_BATCH_SIZE,
    DEFAULT_TRACKER_FETCHER_CONCURRENCY, DEFAULT_TRACKER_FETCH_CHUNK_SIZE,
    DEFAULT_TRACKER_WARMUP_BATCH_DELAY, DEFAULT_TRACKER_WARMUP_BATCH_SIZE,
    DEFAULT_TRACKER_WARMUP_BATCH_TIMEOUT, NEW_CLIENT_CONNECTION_TIMEOUT,
};
pub use store::{ErrorStore, InstanceStore, RecordedError, TrackerCustomization, TrackerCustomizationLister};
