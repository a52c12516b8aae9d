//! The Sync Manager poll loop: one per instance, owned by
//! `qbproxy-client::Client`, driving a coherent `MainData` image and
//! dispatching it to the installed [`SyncEventSink`].
//!
//! The loop shape mirrors the libtorrent engine worker: a `tokio::select!`
//! over a command channel and a timer, looping until cancelled.

use crate::error::SyncError;
use crate::merge::merge_main_data;
use async_trait::async_trait;
use qbproxy_core::model::{InstanceId, MainDataSnapshot};
use qbproxy_core::ErrorKind;
use qbproxy_events::{SyncEventError, SyncEventSink};
use qbproxy_transport::QbittorrentTransport;
use std::fmt;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Lifecycle state of a [`SyncManager`]'s poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    /// Constructed but not yet spawned.
    Idle,
    /// Polling normally.
    Running,
    /// Last poll failed; retrying with backoff.
    Erroring,
    /// Cancelled; the loop has exited.
    Stopped,
}

/// A request the owning Client can send to influence the next poll.
#[derive(Debug, Clone, Copy)]
pub enum SyncCommand {
    /// Shorten the wait before the next poll to `after`, so an action's
    /// optimistic update converges quickly instead of waiting a full
    /// normal-cadence interval.
    Resync {
        /// Delay before the next poll attempt.
        after: Duration,
    },
}

/// Callback the Sync Manager uses to report health transitions to its
/// owning Client, independent of the event sink (which carries the data,
/// not the health signal the Pool uses for backoff).
#[async_trait]
pub trait HealthSink: Send + Sync + fmt::Debug {
    /// A poll failed; `kind` is the classified failure.
    async fn mark_unhealthy(&self, instance_id: InstanceId, kind: ErrorKind, message: String);
    /// A poll succeeded after a prior failure.
    async fn mark_healthy(&self, instance_id: InstanceId);
}

/// Drives the `MainData` poll loop for a single instance.
pub struct SyncManager<T: QbittorrentTransport> {
    instance_id: InstanceId,
    transport: Arc<T>,
    sink: RwLock<Arc<dyn SyncEventSink>>,
    health: Arc<dyn HealthSink>,
    state: RwLock<ManagerState>,
    snapshot: RwLock<MainDataSnapshot>,
    poll_interval: Duration,
    request_timeout: Duration,
    commands: Mutex<Option<mpsc::Receiver<SyncCommand>>>,
}

impl<T: QbittorrentTransport> fmt::Debug for SyncManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncManager")
            .field("instance_id", &self.instance_id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl<T: QbittorrentTransport + 'static> SyncManager<T> {
    /// Construct a manager and the command channel used to request a
    /// targeted resync. The returned sender is cloned by the owning Client
    /// and handed to callers that trigger actions.
    #[must_use]
    pub fn new(
        instance_id: InstanceId,
        transport: Arc<T>,
        sink: Arc<dyn SyncEventSink>,
        health: Arc<dyn HealthSink>,
        poll_interval: Duration,
        request_timeout: Duration,
    ) -> (Arc<Self>, mpsc::Sender<SyncCommand>) {
        let (tx, rx) = mpsc::channel(32);
        let manager = Arc::new(Self {
            instance_id,
            transport,
            sink: RwLock::new(sink),
            health,
            state: RwLock::new(ManagerState::Idle),
            snapshot: RwLock::new(MainDataSnapshot::empty()),
            poll_interval,
            request_timeout,
            commands: Mutex::new(Some(rx)),
        });
        (manager, tx)
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ManagerState {
        *self.state.read().expect("sync manager state lock poisoned")
    }

    /// Deep clone of the current merged snapshot.
    #[must_use]
    pub fn snapshot(&self) -> MainDataSnapshot {
        self.snapshot.read().expect("sync manager snapshot lock poisoned").clone()
    }

    /// Replace the installed sink, used when the Pool propagates a newly
    /// installed [`SyncEventSink`] to every existing Client.
    pub fn set_sink(&self, sink: Arc<dyn SyncEventSink>) {
        *self.sink.write().expect("sync manager sink lock poisoned") = sink;
    }

    fn set_state(&self, state: ManagerState) {
        *self.state.write().expect("sync manager state lock poisoned") = state;
    }

    /// Spawn the poll loop onto the runtime. Must be called at most once
    /// per manager; subsequent calls panic since the command receiver is
    /// consumed on the first call.
    pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let commands = self
            .commands
            .lock()
            .expect("sync manager commands lock poisoned")
            .take()
            .expect("SyncManager::spawn called more than once");
        tokio::spawn(async move { self.run(commands, cancel).await })
    }

    #[instrument(skip(self, commands, cancel), fields(instance_id = %self.instance_id))]
    async fn run(self: Arc<Self>, mut commands: mpsc::Receiver<SyncCommand>, cancel: CancellationToken) {
        self.set_state(ManagerState::Running);
        let mut next_delay = self.poll_interval;
        let mut commands_closed = false;

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!("sync manager cancelled");
                    self.set_state(ManagerState::Stopped);
                    let sink = self.sink.read().expect("sync manager sink lock poisoned").clone();
                    let error = SyncEventError::new(self.instance_id, ErrorKind::Cancelled, "sync manager cancelled");
                    sink.handle_sync_error(self.instance_id, &error).await;
                    break;
                }
                command = commands.recv(), if !commands_closed => {
                    match command {
                        Some(SyncCommand::Resync { after }) => {
                            next_delay = after;
                            continue;
                        }
                        None => {
                            commands_closed = true;
                            continue;
                        }
                    }
                }
                () = tokio::time::sleep(next_delay) => {
                    next_delay = self.poll_interval;
                    match self.poll_once().await {
                        Ok(()) => {
                            if self.state() == ManagerState::Erroring {
                                self.health.mark_healthy(self.instance_id).await;
                            }
                            self.set_state(ManagerState::Running);
                        }
                        Err(err) => {
                            self.set_state(ManagerState::Erroring);
                            self.health.mark_unhealthy(self.instance_id, err.kind(), err.to_string()).await;
                            let sink = self.sink.read().expect("sync manager sink lock poisoned").clone();
                            let event_error = SyncEventError::new(self.instance_id, err.kind(), err.to_string());
                            sink.handle_sync_error(self.instance_id, &event_error).await;
                            warn!(error = %err, "sync poll failed");
                        }
                    }
                }
            }
        }
    }

    async fn poll_once(&self) -> Result<(), SyncError> {
        let rid = self.snapshot.read().expect("sync manager snapshot lock poisoned").rid;
        let raw = self
            .transport
            .get_main_data(rid, self.request_timeout)
            .await
            .map_err(|source| SyncError::Transport { operation: "poll", source })?;

        let merged = {
            let mut guard = self.snapshot.write().expect("sync manager snapshot lock poisoned");
            merge_main_data(&mut guard, raw);
            guard.clone()
        };

        let sink = self.sink.read().expect("sync manager sink lock poisoned").clone();
        sink.handle_main_data(self.instance_id, &merged).await;
        Ok(())
    }

    /// Request a fast follow-up poll after `after`, used by the Client when
    /// an action's optimistic update should converge quickly.
    ///
    /// Returns `false` if the channel is closed (the loop already exited).
    pub async fn request_resync(sender: &mpsc::Sender<SyncCommand>, after: Duration) -> bool {
        sender.send(SyncCommand::Resync { after }).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbproxy_transport::client::{RawLogEntry, RawPeerLogEntry, TorrentListQuery};
    use qbproxy_transport::error::TransportResult;
    use qbproxy_transport::wire::{RawAppPreferences, RawBuildInfo, RawMainData, RawServerState, RawTorrent, RawTorrentFile, RawTracker};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::sync::Mutex as StdMutex;

    #[derive(Debug, Default)]
    struct FakeTransport {
        responses: StdMutex<Vec<TransportResult<RawMainData>>>,
        calls: AtomicUsize,
    }

    impl FakeTransport {
        fn with_responses(responses: Vec<TransportResult<RawMainData>>) -> Self {
            Self {
                responses: StdMutex::new(responses),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl QbittorrentTransport for FakeTransport {
        async fn login(&self, _username: &str, _password: &str, _deadline: Duration) -> TransportResult<()> {
            unimplemented!("not exercised by the sync manager")
        }
        async fn get_app_version(&self, _deadline: Duration) -> TransportResult<String> {
            unimplemented!()
        }
        async fn get_webapi_version(&self, _deadline: Duration) -> TransportResult<String> {
            unimplemented!()
        }
        async fn get_build_info(&self, _deadline: Duration) -> TransportResult<RawBuildInfo> {
            unimplemented!()
        }
        async fn get_app_preferences(&self, _deadline: Duration) -> TransportResult<RawAppPreferences> {
            unimplemented!()
        }
        async fn get_main_data(&self, _rid: i64, _deadline: Duration) -> TransportResult<RawMainData> {
            self.calls.fetch_add(1, AtomicOrdering::SeqCst);
            let mut guard = self.responses.lock().expect("lock");
            if guard.is_empty() {
                Ok(RawMainData::default())
            } else {
                guard.remove(0)
            }
        }
        async fn get_torrents(&self, _query: &TorrentListQuery, _deadline: Duration) -> TransportResult<Vec<RawTorrent>> {
            unimplemented!()
        }
        async fn get_files_information(&self, _hash: &str, _deadline: Duration) -> TransportResult<Vec<RawTorrentFile>> {
            unimplemented!()
        }
        async fn get_torrent_trackers(&self, _hash: &str, _deadline: Duration) -> TransportResult<Vec<RawTracker>> {
            unimplemented!()
        }
        async fn resume(&self, _hashes: &[String], _deadline: Duration) -> TransportResult<()> {
            unimplemented!()
        }
        async fn pause(&self, _hashes: &[String], _deadline: Duration) -> TransportResult<()> {
            unimplemented!()
        }
        async fn recheck(&self, _hashes: &[String], _deadline: Duration) -> TransportResult<()> {
            unimplemented!()
        }
        async fn force_start(&self, _hashes: &[String], _value: bool, _deadline: Duration) -> TransportResult<()> {
            unimplemented!()
        }
        async fn add_tags(&self, _hashes: &[String], _tags: &[String], _deadline: Duration) -> TransportResult<()> {
            unimplemented!()
        }
        async fn set_tags(&self, _hashes: &[String], _tags: &[String], _deadline: Duration) -> TransportResult<()> {
            unimplemented!()
        }
        async fn remove_tags(&self, _hashes: &[String], _tags: &[String], _deadline: Duration) -> TransportResult<()> {
            unimplemented!()
        }
        async fn set_category(&self, _hashes: &[String], _category: &str, _deadline: Duration) -> TransportResult<()> {
            unimplemented!()
        }
        async fn set_location(&self, _hashes: &[String], _location: &str, _deadline: Duration) -> TransportResult<()> {
            unimplemented!()
        }
        async fn set_share_limits(
            &self,
            _hashes: &[String],
            _ratio_limit: f64,
            _seeding_time_limit: i64,
            _inactive_seeding_time_limit: i64,
            _deadline: Duration,
        ) -> TransportResult<()> {
            unimplemented!()
        }
        async fn set_speed_limits(&self, _hashes: &[String], _download_limit: i64, _upload_limit: i64, _deadline: Duration) -> TransportResult<()> {
            unimplemented!()
        }
        async fn set_auto_management(&self, _hashes: &[String], _enable: bool, _deadline: Duration) -> TransportResult<()> {
            unimplemented!()
        }
        async fn reannounce(&self, _hashes: &[String], _deadline: Duration) -> TransportResult<()> {
            unimplemented!()
        }
        async fn set_file_priorities(&self, _hash: &str, _file_ids: &[u32], _priority: i8, _deadline: Duration) -> TransportResult<()> {
            unimplemented!()
        }
        async fn export_torrent(&self, _hash: &str, _deadline: Duration) -> TransportResult<Vec<u8>> {
            unimplemented!()
        }
        async fn delete(&self, _hashes: &[String], _delete_files: bool, _deadline: Duration) -> TransportResult<()> {
            unimplemented!()
        }
        async fn add(&self, _urls: &[String], _save_path: Option<&str>, _category: Option<&str>, _deadline: Duration) -> TransportResult<()> {
            unimplemented!()
        }
        async fn get_main_logs(&self, _last_known_id: i64, _deadline: Duration) -> TransportResult<Vec<RawLogEntry>> {
            unimplemented!()
        }
        async fn get_peer_logs(&self, _last_known_id: i64, _deadline: Duration) -> TransportResult<Vec<RawPeerLogEntry>> {
            unimplemented!()
        }
    }

    #[derive(Debug, Default)]
    struct RecordingSink {
        main_data: StdMutex<Vec<MainDataSnapshot>>,
        errors: StdMutex<Vec<SyncEventError>>,
    }

    #[async_trait]
    impl SyncEventSink for RecordingSink {
        async fn handle_main_data(&self, _instance_id: InstanceId, snapshot: &MainDataSnapshot) {
            self.main_data.lock().expect("lock").push(snapshot.clone());
        }
        async fn handle_sync_error(&self, _instance_id: InstanceId, error: &SyncEventError) {
            self.errors.lock().expect("lock").push(error.clone());
        }
    }

    #[derive(Debug, Default)]
    struct RecordingHealth {
        unhealthy: StdMutex<Vec<ErrorKind>>,
        healthy_calls: AtomicUsize,
    }

    #[async_trait]
    impl HealthSink for RecordingHealth {
        async fn mark_unhealthy(&self, _instance_id: InstanceId, kind: ErrorKind, _message: String) {
            self.unhealthy.lock().expect("lock").push(kind);
        }
        async fn mark_healthy(&self, _instance_id: InstanceId) {
            self.healthy_calls.fetch_add(1, AtomicOrdering::SeqCst);
        }
    }

    fn full_main_data(rid: i64, hash: &str) -> RawMainData {
        let mut torrents = HashMap::new();
        torrents.insert(
            hash.to_string(),
            RawTorrent {
                state: Some(qbproxy_core::model::TorrentState::Downloading),
                progress: Some(0.5),
                completion_on: Some(-1),
                ..Default::default()
            },
        );
        RawMainData {
            rid,
            full_update: true,
            torrents,
            server_state: RawServerState::default(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn poll_merges_and_dispatches_to_sink() {
        let transport = Arc::new(FakeTransport::with_responses(vec![Ok(full_main_data(1, "abc"))]));
        let sink = Arc::new(RecordingSink::default());
        let health = Arc::new(RecordingHealth::default());
        let (manager, _tx) = SyncManager::new(
            InstanceId::new(1),
            transport,
            sink.clone(),
            health,
            Duration::from_millis(5),
            Duration::from_secs(1),
        );

        let cancel = CancellationToken::new();
        let handle = manager.clone().spawn(cancel.clone());

        tokio::time::sleep(Duration::from_millis(30)).await;
        cancel.cancel();
        handle.await.expect("join");

        let dispatched = sink.main_data.lock().expect("lock");
        assert!(!dispatched.is_empty());
        assert!(dispatched[0].torrents.contains_key("abc"));
        assert_eq!(manager.state(), ManagerState::Stopped);
    }

    #[tokio::test]
    async fn transport_error_marks_unhealthy_and_dispatches_sync_error() {
        use qbproxy_transport::error::TransportError;
        let transport = Arc::new(FakeTransport::with_responses(vec![Err(TransportError::Timeout { operation: "get_main_data" })]));
        let sink = Arc::new(RecordingSink::default());
        let health = Arc::new(RecordingHealth::default());
        let (manager, _tx) = SyncManager::new(
            InstanceId::new(1),
            transport,
            sink.clone(),
            health.clone(),
            Duration::from_millis(5),
            Duration::from_secs(1),
        );

        let cancel = CancellationToken::new();
        let handle = manager.clone().spawn(cancel.clone());

        tokio::time::sleep(Duration::from_millis(30)).await;
        cancel.cancel();
        handle.await.expect("join");

        assert!(!sink.errors.lock().expect("lock").is_empty());
        assert!(!health.unhealthy.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn targeted_resync_shortens_next_wait() {
        let transport = Arc::new(FakeTransport::with_responses(vec![Ok(full_main_data(1, "abc")), Ok(full_main_data(2, "abc"))]));
        let sink = Arc::new(RecordingSink::default());
        let health = Arc::new(RecordingHealth::default());
        let (manager, tx) = SyncManager::new(
            InstanceId::new(1),
            transport,
            sink.clone(),
            health,
            Duration::from_secs(60),
            Duration::from_secs(1),
        );

        let cancel = CancellationToken::new();
        let handle = manager.clone().spawn(cancel.clone());

        tokio::time::sleep(Duration::from_millis(20)).await;
        SyncManager::request_resync(&tx, Duration::from_millis(5)).await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        cancel.cancel();
        handle.await.expect("join");

        assert!(sink.main_data.lock().expect("lock").len() >= 1);
    }
}
