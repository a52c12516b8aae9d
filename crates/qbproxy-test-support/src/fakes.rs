//! In-memory fakes for the collaborator interfaces `qbproxy-config` and
//! `qbproxy-events` define. Every fake is intentionally minimal: enough to
//! drive `Pool`/`Client`/`Sync Manager` tests without touching a database
//! or the network.

use async_trait::async_trait;
use qbproxy_config::{ConfigError, ConfigResult, ErrorStore, InstanceRecord, InstanceStore, RecordedError};
use qbproxy_core::model::{InstanceId, MainDataSnapshot, Torrent};
use qbproxy_core::ErrorKind;
use qbproxy_events::{CompletionHandler, SyncEventError, SyncEventSink};
use std::collections::HashMap;
use std::sync::Mutex;

/// An `InstanceStore` backed by an in-memory map, seeded at construction.
#[derive(Debug, Default)]
pub struct FakeInstanceStore {
    records: Mutex<HashMap<InstanceId, InstanceRecord>>,
}

impl FakeInstanceStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with `records`.
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = InstanceRecord>) -> Self {
        let store = Self::new();
        for record in records {
            store.records.lock().expect("lock").insert(record.id, record);
        }
        store
    }
}

#[async_trait]
impl InstanceStore for FakeInstanceStore {
    async fn list(&self, include_disabled: bool) -> ConfigResult<Vec<InstanceRecord>> {
        let records = self.records.lock().expect("lock");
        let mut list: Vec<InstanceRecord> = records
            .values()
            .filter(|record| include_disabled || record.enabled)
            .cloned()
            .collect();
        list.sort_by_key(|record| record.id);
        Ok(list)
    }

    async fn get(&self, id: InstanceId) -> ConfigResult<InstanceRecord> {
        self.records
            .lock()
            .expect("lock")
            .get(&id)
            .cloned()
            .ok_or(ConfigError::MissingField { operation: "fake_instance_store.get", field: "id" })
    }

    async fn update(&self, record: InstanceRecord) -> ConfigResult<()> {
        self.records.lock().expect("lock").insert(record.id, record);
        Ok(())
    }

    async fn delete(&self, id: InstanceId) -> ConfigResult<()> {
        self.records.lock().expect("lock").remove(&id);
        Ok(())
    }

    async fn reorder(&self, ids: &[InstanceId]) -> ConfigResult<()> {
        let mut records = self.records.lock().expect("lock");
        for (order, id) in ids.iter().enumerate() {
            if let Some(record) = records.get_mut(id) {
                record.order = i32::try_from(order).unwrap_or(i32::MAX);
            }
        }
        Ok(())
    }
}

/// An `ErrorStore` backed by an in-memory, per-instance error history.
#[derive(Debug, Default)]
pub struct FakeErrorStore {
    entries: Mutex<Vec<RecordedError>>,
}

impl FakeErrorStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ErrorStore for FakeErrorStore {
    async fn record(&self, instance_id: InstanceId, message: String, classification: ErrorKind) -> ConfigResult<()> {
        self.entries.lock().expect("lock").push(RecordedError {
            instance_id,
            message,
            classification,
            recorded_at: chrono::Utc::now(),
        });
        Ok(())
    }

    async fn list_recent(&self, instance_id: InstanceId) -> ConfigResult<Vec<RecordedError>> {
        Ok(self
            .entries
            .lock()
            .expect("lock")
            .iter()
            .filter(|entry| entry.instance_id == instance_id)
            .cloned()
            .collect())
    }

    async fn clear(&self, instance_id: InstanceId) -> ConfigResult<()> {
        self.entries.lock().expect("lock").retain(|entry| entry.instance_id != instance_id);
        Ok(())
    }
}

/// A `SyncEventSink` that records every call it receives, in order.
#[derive(Debug, Default)]
pub struct FakeSyncEventSink {
    /// Instances `handle_main_data` was called for, in call order.
    pub main_data_calls: Mutex<Vec<InstanceId>>,
    /// Instances `handle_sync_error` was called for, in call order.
    pub error_calls: Mutex<Vec<InstanceId>>,
}

impl FakeSyncEventSink {
    /// A sink with no recorded calls.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SyncEventSink for FakeSyncEventSink {
    async fn handle_main_data(&self, instance_id: InstanceId, _snapshot: &MainDataSnapshot) {
        self.main_data_calls.lock().expect("lock").push(instance_id);
    }

    async fn handle_sync_error(&self, instance_id: InstanceId, _error: &SyncEventError) {
        self.error_calls.lock().expect("lock").push(instance_id);
    }
}

/// A `CompletionHandler` that records every torrent hash it was invoked
/// with, in order.
#[derive(Debug, Default)]
pub struct FakeCompletionHandler {
    /// Hashes of torrents reported complete, in call order.
    pub completions: Mutex<Vec<(InstanceId, String)>>,
}

impl FakeCompletionHandler {
    /// A handler with no recorded completions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompletionHandler for FakeCompletionHandler {
    async fn handle_completion(&self, instance_id: InstanceId, torrent: &Torrent) {
        self.completions.lock().expect("lock").push((instance_id, torrent.hash.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{instance_record, torrent};

    #[tokio::test]
    async fn instance_store_lists_only_enabled_by_default() {
        let mut disabled = instance_record(2, "disabled", "https://qbt2.example.com");
        disabled.enabled = false;
        let store = FakeInstanceStore::with_records([instance_record(1, "home", "https://qbt.example.com"), disabled]);

        assert_eq!(store.list(false).await.expect("list").len(), 1);
        assert_eq!(store.list(true).await.expect("list").len(), 2);
    }

    #[tokio::test]
    async fn instance_store_reorder_updates_order_field() {
        let store = FakeInstanceStore::with_records([
            instance_record(1, "a", "https://a.example.com"),
            instance_record(2, "b", "https://b.example.com"),
        ]);
        store.reorder(&[InstanceId::new(2), InstanceId::new(1)]).await.expect("reorder");
        assert_eq!(store.get(InstanceId::new(2)).await.expect("get").order, 0);
        assert_eq!(store.get(InstanceId::new(1)).await.expect("get").order, 1);
    }

    #[tokio::test]
    async fn error_store_round_trips_and_clears() {
        let store = FakeErrorStore::new();
        let id = InstanceId::new(1);
        store.record(id, "ip is banned".into(), ErrorKind::AuthBanned).await.expect("record");
        assert_eq!(store.list_recent(id).await.expect("list").len(), 1);
        store.clear(id).await.expect("clear");
        assert!(store.list_recent(id).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn sync_event_sink_records_calls_in_order() {
        let sink = FakeSyncEventSink::new();
        let snapshot = MainDataSnapshot::empty();
        sink.handle_main_data(InstanceId::new(1), &snapshot).await;
        sink.handle_main_data(InstanceId::new(2), &snapshot).await;
        assert_eq!(*sink.main_data_calls.lock().expect("lock"), vec![InstanceId::new(1), InstanceId::new(2)]);
    }

    #[tokio::test]
    async fn completion_handler_records_hash_per_instance() {
        let handler = FakeCompletionHandler::new();
        handler.handle_completion(InstanceId::new(1), &torrent("abc")).await;
        assert_eq!(*handler.completions.lock().expect("lock"), vec![(InstanceId::new(1), "abc".to_string())]);
    }
}
