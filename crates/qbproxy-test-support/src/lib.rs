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

//! Shared fixture builders and collaborator fakes used across this
//! workspace's test suites: a `Torrent`/`MainDataSnapshot`/`InstanceRecord`
//! builder module plus in-memory fakes for the `InstanceStore`,
//! `ErrorStore`, `SyncEventSink`, and `CompletionHandler` collaborator
//! interfaces defined in spec.md §6. Not published; `publish = false` in
//! `Cargo.toml`.

pub mod fakes;
pub mod fixtures;

pub use fakes::{FakeCompletionHandler, FakeErrorStore, FakeInstanceStore, FakeSyncEventSink};
pub use fixtures::{instance_record, main_data_snapshot, torrent};
