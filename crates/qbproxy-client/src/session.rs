//! `GetSessionStart`: single-flight fetch-and-parse of the server's session
//! start time from its main log, with a cached best estimate that survives
//! failed refresh attempts.

use crate::error::{ClientError, ClientResult};
use futures::future::{BoxFuture, FutureExt, Shared};
use qbproxy_transport::QbittorrentTransport;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

type SharedFetch = Shared<BoxFuture<'static, Result<i64, Arc<ClientError>>>>;

/// `{sessionStart, sessionAccurate, sessionRetryAfter}` plus the in-flight
/// single-flight future, if a refresh is currently underway.
#[derive(Default)]
struct SessionState {
    session_start: i64,
    accurate: bool,
    retry_after: Option<Instant>,
    in_flight: Option<SharedFetch>,
}

/// Session-start tracker for one Client.
pub struct SessionTracker {
    request_timeout: Duration,
    retry_backoff: Duration,
    state: Mutex<SessionState>,
}

impl std::fmt::Debug for SessionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTracker").finish_non_exhaustive()
    }
}

impl SessionTracker {
    /// Construct a tracker with no best estimate yet.
    #[must_use]
    pub fn new(request_timeout: Duration, retry_backoff: Duration) -> Self {
        Self {
            request_timeout,
            retry_backoff,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// `GetSessionStart(ctx, force)`. Concurrent callers observing the same
    /// in-flight refresh await the same future rather than issuing
    /// duplicate log fetches. A failed refresh leaves the previous best
    /// estimate in place, sets `sessionRetryAfter`, and propagates the
    /// error to every waiter of that attempt (but not to later callers,
    /// who see the stale estimate once the retry backoff elapses).
    pub async fn get<T: QbittorrentTransport + 'static>(&self, transport: &Arc<T>, force: bool) -> ClientResult<(i64, bool)> {
        let fetch = {
            let mut state = self.state.lock().expect("session state lock poisoned");
            let needs_refresh = force
                || !state.accurate
                    && state.retry_after.is_none_or(|retry_at| Instant::now() >= retry_at);
            if !needs_refresh {
                return Ok((state.session_start, state.accurate));
            }
            if let Some(existing) = state.in_flight.clone() {
                existing
            } else {
                let transport = Arc::clone(transport);
                let timeout = self.request_timeout;
                let future: BoxFuture<'static, Result<i64, Arc<ClientError>>> = async move {
                    fetch_session_start(&transport, timeout)
                        .await
                        .map_err(Arc::new)
                }
                .boxed();
                let shared = future.shared();
                state.in_flight = Some(shared.clone());
                shared
            }
        };

        let result = fetch.await;
        let mut state = self.state.lock().expect("session state lock poisoned");
        state.in_flight = None;
        match result {
            Ok(session_start) => {
                state.session_start = session_start;
                state.accurate = true;
                state.retry_after = None;
                Ok((state.session_start, true))
            }
            Err(error) => {
                state.accurate = false;
                state.retry_after = Some(Instant::now() + self.retry_backoff);
                let previous = state.session_start;
                drop(state);
                if previous == 0 {
                    return Err((*error).clone_shallow());
                }
                Ok((previous, false))
            }
        }
    }
}

async fn fetch_session_start<T: QbittorrentTransport>(transport: &Arc<T>, timeout: Duration) -> ClientResult<i64> {
    let entries = transport
        .get_main_logs(0, timeout)
        .await
        .map_err(|source| ClientError::Transport {
            operation: "get_session_start",
            source,
        })?;
    entries
        .into_iter()
        .min_by_key(|entry| entry.id)
        .map(|entry| entry.timestamp / 1000)
        .ok_or(ClientError::Validation {
            operation: "get_session_start",
            reason: "no log entries to derive a session start from",
        })
}

impl ClientError {
    fn clone_shallow(&self) -> Self {
        match self {
            Self::Validation { operation, reason } => Self::Validation { operation, reason },
            Self::NotFound { operation, hash } => Self::NotFound {
                operation,
                hash: hash.clone(),
            },
            Self::Transport { operation, source } => Self::Validation {
                operation,
                reason: if source.kind().is_retryable() {
                    "transient transport failure deriving session start"
                } else {
                    "transport failure deriving session start"
                },
            },
            Self::Sync { operation, .. } => Self::Validation {
                operation,
                reason: "sync failure deriving session start",
            },
        }
    }
}
