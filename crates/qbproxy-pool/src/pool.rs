//! The Client Pool: lazy per-instance Client construction with
//! single-flight coordination, exponential backoff on failure, sink
//! propagation to every live Client, and clean teardown.

use crate::backoff::{BackoffStatus, BackoffTracker};
use crate::error::{PoolError, PoolResult};
use futures::future::{BoxFuture, FutureExt, Shared};
use qbproxy_client::{Client, FilesManager};
use qbproxy_config::{InstanceRecord, InstanceStore, ProcessConfig};
use qbproxy_core::model::InstanceId;
use qbproxy_events::{CompletionHandler, SyncEventSink};
use qbproxy_transport::client::Transport;
use qbproxy_transport::{QbittorrentTransport, TransportResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use qbproxy_config::ErrorStore;

/// Lightweight instance summary returned by [`Pool::get_all_instances`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSummary {
    /// Instance identifier.
    pub id: InstanceId,
    /// Display name.
    pub name: String,
}

type SharedConstruct<T> = Shared<BoxFuture<'static, Result<Arc<Client<T>>, PoolError>>>;

struct Handle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

struct PoolState<T: QbittorrentTransport> {
    clients: HashMap<InstanceId, Arc<Client<T>>>,
    handles: HashMap<InstanceId, Handle>,
    in_flight: HashMap<InstanceId, SharedConstruct<T>>,
    sink: Option<Arc<dyn SyncEventSink>>,
}

impl<T: QbittorrentTransport> Default for PoolState<T> {
    fn default() -> Self {
        Self {
            clients: HashMap::new(),
            handles: HashMap::new(),
            in_flight: HashMap::new(),
            sink: None,
        }
    }
}

/// A factory that builds a transport for a configured instance, without
/// performing any network I/O itself.
pub type TransportFactory<T> = Arc<dyn Fn(&InstanceRecord, Duration) -> TransportResult<T> + Send + Sync>;

struct PoolInner<T: QbittorrentTransport> {
    instance_store: Arc<dyn InstanceStore>,
    error_store: Option<Arc<dyn ErrorStore>>,
    transport_factory: TransportFactory<T>,
    files_manager: Arc<dyn FilesManager>,
    completion_handler: Option<Arc<dyn CompletionHandler>>,
    config: ProcessConfig,
    cancel: CancellationToken,
    state: Mutex<PoolState<T>>,
    backoff: BackoffTracker,
}

/// Lifecycle manager for per-instance Clients. Cheap to clone: every clone
/// shares the same underlying state via an `Arc`.
pub struct Pool<T: QbittorrentTransport> {
    inner: Arc<PoolInner<T>>,
}

impl<T: QbittorrentTransport> Clone for Pool<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T: QbittorrentTransport> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool").finish_non_exhaustive()
    }
}

impl<T: QbittorrentTransport + 'static> Pool<T> {
    /// Construct a Pool. `cancel` is the parent cancellation token; each
    /// Client's Sync Manager runs under a child token so [`Self::remove`]
    /// and [`Self::close`] can tear individual Clients down independently.
    #[must_use]
    pub fn new(
        instance_store: Arc<dyn InstanceStore>,
        error_store: Option<Arc<dyn ErrorStore>>,
        transport_factory: TransportFactory<T>,
        files_manager: Arc<dyn FilesManager>,
        completion_handler: Option<Arc<dyn CompletionHandler>>,
        config: ProcessConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                instance_store,
                error_store,
                transport_factory,
                files_manager,
                completion_handler,
                config,
                cancel,
                state: Mutex::new(PoolState::default()),
                backoff: BackoffTracker::new(),
            }),
        }
    }

    /// `GetOrCreate(instanceID)`: return the live Client for `instanceID`,
    /// constructing it on first request. Concurrent callers for the same
    /// instance during construction share a single in-flight attempt.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InBackoff`] if the instance is within a backoff
    /// window from a prior failure, or [`PoolError::Construction`] if
    /// building the transport or Client fails.
    pub async fn get_or_create(&self, instance_id: InstanceId) -> PoolResult<Arc<Client<T>>> {
        if let Some(client) = self.ready_client(instance_id) {
            return Ok(client);
        }
        if self.inner.backoff.is_in_backoff(instance_id) {
            return Err(PoolError::InBackoff { instance_id });
        }

        let fetch = {
            let mut state = self.inner.state.lock().expect("pool state lock poisoned");
            if let Some(client) = state.clients.get(&instance_id) {
                return Ok(Arc::clone(client));
            }
            if let Some(existing) = state.in_flight.get(&instance_id) {
                existing.clone()
            } else {
                let inner = Arc::clone(&self.inner);
                let future: BoxFuture<'static, Result<Arc<Client<T>>, PoolError>> =
                    async move { inner.build_client(instance_id).await }.boxed();
                let shared = future.shared();
                state.in_flight.insert(instance_id, shared.clone());
                shared
            }
        };

        let result = fetch.await;
        self.inner.state.lock().expect("pool state lock poisoned").in_flight.remove(&instance_id);
        result
    }

    fn ready_client(&self, instance_id: InstanceId) -> Option<Arc<Client<T>>> {
        self.inner.state.lock().expect("pool state lock poisoned").clients.get(&instance_id).cloned()
    }

    /// `IsHealthy(instanceID)`: proxies to the Client if one is currently
    /// live; an instance with no constructed Client is reported unhealthy.
    #[must_use]
    pub fn is_healthy(&self, instance_id: InstanceId) -> bool {
        self.ready_client(instance_id).is_some_and(|client| client.is_healthy())
    }

    /// `GetAllInstances()`: lightweight `{id, name}` pairs for every
    /// enabled instance, for telemetry/UI listings.
    ///
    /// # Errors
    ///
    /// Propagates the `InstanceStore`'s listing failure.
    pub async fn get_all_instances(&self) -> PoolResult<Vec<InstanceSummary>> {
        let records = self.inner.instance_store.list(false).await.map_err(|source| PoolError::Store {
            operation: "get_all_instances",
            message: source.to_string(),
        })?;
        Ok(records
            .into_iter()
            .map(|record| InstanceSummary { id: record.id, name: record.name })
            .collect())
    }

    /// Every currently-constructed Client, tagged with its instance id.
    /// Does not trigger construction; used by cross-instance aggregation.
    #[must_use]
    pub fn ready_clients(&self) -> Vec<(InstanceId, Arc<Client<T>>)> {
        self.inner
            .state
            .lock()
            .expect("pool state lock poisoned")
            .clients
            .iter()
            .map(|(id, client)| (*id, Arc::clone(client)))
            .collect()
    }

    /// `GetBackoffStatus(instanceID)`.
    #[must_use]
    pub fn get_backoff_status(&self, instance_id: InstanceId) -> Option<BackoffStatus> {
        self.inner.backoff.status(instance_id)
    }

    /// `IsInBackoff(instanceID)`.
    #[must_use]
    pub fn is_in_backoff(&self, instance_id: InstanceId) -> bool {
        self.inner.backoff.is_in_backoff(instance_id)
    }

    /// `ResetFailureTracking(instanceID)`.
    pub fn reset_failure_tracking(&self, instance_id: InstanceId) {
        self.inner.backoff.reset(instance_id);
    }

    /// `SetSyncEventSink(sink)`: stores the sink on the Pool and installs it
    /// on every currently-live Client; new Clients inherit it at
    /// construction.
    pub fn set_sync_event_sink(&self, sink: Arc<dyn SyncEventSink>) {
        let mut state = self.inner.state.lock().expect("pool state lock poisoned");
        state.sink = Some(Arc::clone(&sink));
        for client in state.clients.values() {
            client.set_sync_event_sink(Arc::clone(&sink));
        }
    }

    /// Tear down the Client for `instance_id` cleanly: cancels its Sync
    /// Manager and drops it from the pool. Used before reconstructing a
    /// Client whose `InstanceRecord` was updated or removed.
    pub async fn remove(&self, instance_id: InstanceId) {
        let handle = {
            let mut state = self.inner.state.lock().expect("pool state lock poisoned");
            state.clients.remove(&instance_id);
            state.handles.remove(&instance_id)
        };
        if let Some(handle) = handle {
            handle.cancel.cancel();
            if let Err(error) = handle.task.await {
                warn!(%instance_id, %error, "sync manager task panicked during removal");
            }
        }
    }

    /// `Close()`: cancels every Client's Sync Manager and waits for all of
    /// them to exit.
    pub async fn close(&self) {
        self.inner.cancel.cancel();
        let handles: Vec<(InstanceId, Handle)> = {
            let mut state = self.inner.state.lock().expect("pool state lock poisoned");
            state.clients.clear();
            state.in_flight.clear();
            state.handles.drain().collect()
        };
        for (instance_id, handle) in handles {
            if let Err(error) = handle.task.await {
                warn!(%instance_id, %error, "sync manager task panicked during close");
            }
        }
    }
}

impl<T: QbittorrentTransport + 'static> PoolInner<T> {
    async fn build_client(self: Arc<Self>, instance_id: InstanceId) -> Result<Arc<Client<T>>, PoolError> {
        let record = match self.instance_store.get(instance_id).await {
            Ok(record) => record,
            Err(source) => {
                let message = source.to_string();
                self.record_failure(instance_id, qbproxy_core::ErrorKind::Transient, message.clone()).await;
                return Err(PoolError::Store { operation: "get_or_create", message });
            }
        };

        let transport = match (self.transport_factory)(&record, self.config.connection_timeout) {
            Ok(transport) => Arc::new(transport),
            Err(source) => {
                let kind = source.kind();
                let message = source.to_string();
                self.record_failure(instance_id, kind, message.clone()).await;
                return Err(PoolError::Construction { instance_id, message, kind });
            }
        };

        let client = Client::new(
            instance_id,
            transport,
            Arc::clone(&self.files_manager),
            self.completion_handler.clone(),
            self.config.clone(),
        );

        let cancel = self.cancel.child_token();
        let task = client.spawn(cancel.clone());

        {
            let mut state = self.state.lock().expect("pool state lock poisoned");
            if let Some(sink) = state.sink.clone() {
                client.set_sync_event_sink(sink);
            }
            state.clients.insert(instance_id, Arc::clone(&client));
            state.handles.insert(instance_id, Handle { cancel, task });
        }

        self.backoff.reset(instance_id);
        info!(%instance_id, name = %record.name, "constructed client");
        Ok(client)
    }

    async fn record_failure(&self, instance_id: InstanceId, kind: qbproxy_core::ErrorKind, message: String) {
        self.backoff.record_failure(instance_id, kind, message.clone());
        if let Some(error_store) = &self.error_store {
            if let Err(source) = error_store.record(instance_id, message, kind).await {
                warn!(%instance_id, %source, "failed to record instance error");
            }
        }
    }
}

impl Pool<Transport> {
    /// Convenience constructor wiring up the real qBittorrent Web API
    /// transport factory, for callers that do not need to substitute a fake
    /// transport for tests.
    #[must_use]
    pub fn new_default(
        instance_store: Arc<dyn InstanceStore>,
        error_store: Option<Arc<dyn ErrorStore>>,
        files_manager: Arc<dyn FilesManager>,
        completion_handler: Option<Arc<dyn CompletionHandler>>,
        config: ProcessConfig,
        cancel: CancellationToken,
    ) -> Self {
        let factory: TransportFactory<Transport> = Arc::new(|record, timeout| Transport::new(record, timeout));
        Self::new(instance_store, error_store, factory, files_manager, completion_handler, config, cancel)
    }
}
