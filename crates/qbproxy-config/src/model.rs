//! `InstanceRecord` and `ProcessConfig` — the per-instance and process-wide
//! configuration shapes described in spec.md §3 and §6.

use crate::error::{ConfigError, ConfigResult};
use qbproxy_core::model::InstanceId;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Basic-auth credentials carried in front of the qBittorrent Web API, when
/// the remote is fronted by a reverse proxy that requires them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuth {
    /// Basic-auth username.
    pub username: String,
    /// Basic-auth password.
    pub password: String,
}

/// A configured remote qBittorrent instance.
///
/// `password` is assumed already decrypted in-memory by the owning
/// `InstanceStore` collaborator (spec.md §6); this crate never encrypts or
/// decrypts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    /// Stable identifier.
    pub id: InstanceId,
    /// Display name.
    pub name: String,
    /// Base URL of the remote's Web API.
    pub host: Url,
    /// Web API username.
    pub username: String,
    /// Web API password, decrypted in-memory.
    pub password: String,
    /// Optional basic-auth pair for a fronting reverse proxy.
    #[serde(default)]
    pub basic_auth: Option<BasicAuth>,
    /// Whether to accept invalid/self-signed TLS certificates.
    #[serde(default)]
    pub tls_skip_verify: bool,
    /// Whether this instance participates in pool/sync operations.
    pub enabled: bool,
    /// Display ordering among sibling instances.
    #[serde(default)]
    pub order: i32,
}

impl InstanceRecord {
    /// Validate required fields are present and well-formed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] if `name` or `username` is
    /// empty.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::MissingField {
                operation: "instance_record.validate",
                field: "name",
            });
        }
        if self.username.trim().is_empty() {
            return Err(ConfigError::MissingField {
                operation: "instance_record.validate",
                field: "username",
            });
        }
        if !matches!(self.host.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidField {
                operation: "instance_record.validate",
                field: "host",
                value: self.host.to_string(),
                reason: "scheme must be http or https",
            });
        }
        Ok(())
    }
}

/// Default connection timeout used by `Pool::get_or_create`.
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(60);
/// Connection timeout used by the `new_client` convenience constructor.
pub const NEW_CLIENT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);
/// Minimum interval between two `HealthCheck` probes against the same instance.
pub const DEFAULT_MIN_HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(15);
/// TTL for the per-hash tracker cache.
pub const DEFAULT_TRACKER_CACHE_TTL: Duration = Duration::from_secs(30 * 60);
/// TTL for the app-info cache.
pub const DEFAULT_APP_INFO_TTL: Duration = Duration::from_secs(5 * 60);
/// TTL for the app-preferences cache.
pub const DEFAULT_PREFERENCES_TTL: Duration = Duration::from_secs(30);
/// TTL for an optimistic update overlay entry.
pub const DEFAULT_OPTIMISTIC_UPDATE_TTL: Duration = Duration::from_secs(30);
/// Hashes per batch for `ScheduleTrackerWarmup`.
pub const DEFAULT_TRACKER_WARMUP_BATCH_SIZE: usize = 1_000;
/// Hashes per batch for `computeCounts`'s internal tracker-data prefetch.
///
/// Deliberately a separate constant from
/// [`DEFAULT_TRACKER_WARMUP_BATCH_SIZE`] per spec.md §9: the corpus uses
/// different batch sizes for these two call sites and the rationale is not
/// documented, so both are kept tunable rather than unified.
pub const DEFAULT_TRACKER_COUNT_BATCH_SIZE: usize = 300;
/// Delay between tracker warmup batches.
pub const DEFAULT_TRACKER_WARMUP_BATCH_DELAY: Duration = Duration::from_secs(2);
/// Timeout applied to a single tracker warmup batch.
pub const DEFAULT_TRACKER_WARMUP_BATCH_TIMEOUT: Duration = Duration::from_secs(45);
/// Bounded concurrency used by the fallback per-hash tracker fetcher.
pub const DEFAULT_TRACKER_FETCHER_CONCURRENCY: usize = 4;
/// Hashes per chunk for the capability-gated bulk tracker fetch path.
pub const DEFAULT_TRACKER_FETCH_CHUNK_SIZE: usize = 50;
/// Bounded concurrency used by `GetFilesBatch`'s fetch-missing path.
pub const DEFAULT_FILES_BATCH_CONCURRENCY: usize = 8;

/// Process-wide tunables shared across every Client/Pool instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessConfig {
    /// Timeout applied when constructing a new Client's transport.
    pub connection_timeout: Duration,
    /// Minimum interval between two `HealthCheck` probes against the same instance.
    pub min_health_check_interval: Duration,
    /// TTL for the per-hash tracker cache.
    pub tracker_cache_ttl: Duration,
    /// TTL for the app-info cache.
    pub app_info_ttl: Duration,
    /// TTL for the app-preferences cache.
    pub preferences_ttl: Duration,
    /// TTL for an optimistic update overlay entry.
    pub optimistic_update_ttl: Duration,
    /// Hashes per batch for `ScheduleTrackerWarmup`.
    pub tracker_warmup_batch_size: usize,
    /// Hashes per batch for `computeCounts`'s internal tracker-data prefetch.
    pub tracker_count_batch_size: usize,
    /// Delay between tracker warmup batches.
    pub tracker_warmup_batch_delay: Duration,
    /// Timeout applied to a single tracker warmup batch.
    pub tracker_warmup_batch_timeout: Duration,
    /// Bounded concurrency used by the fallback per-hash tracker fetcher.
    pub tracker_fetcher_concurrency: usize,
    /// Hashes per chunk for the capability-gated bulk tracker fetch path.
    pub tracker_fetch_chunk_size: usize,
    /// Bounded concurrency used by `GetFilesBatch`'s fetch-missing path.
    pub files_batch_concurrency: usize,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            min_health_check_interval: DEFAULT_MIN_HEALTH_CHECK_INTERVAL,
            tracker_cache_ttl: DEFAULT_TRACKER_CACHE_TTL,
            app_info_ttl: DEFAULT_APP_INFO_TTL,
            preferences_ttl: DEFAULT_PREFERENCES_TTL,
            optimistic_update_ttl: DEFAULT_OPTIMISTIC_UPDATE_TTL,
            tracker_warmup_batch_size: DEFAULT_TRACKER_WARMUP_BATCH_SIZE,
            tracker_count_batch_size: DEFAULT_TRACKER_COUNT_BATCH_SIZE,
            tracker_warmup_batch_delay: DEFAULT_TRACKER_WARMUP_BATCH_DELAY,
            tracker_warmup_batch_timeout: DEFAULT_TRACKER_WARMUP_BATCH_TIMEOUT,
            tracker_fetcher_concurrency: DEFAULT_TRACKER_FETCHER_CONCURRENCY,
            tracker_fetch_chunk_size: DEFAULT_TRACKER_FETCH_CHUNK_SIZE,
            files_batch_concurrency: DEFAULT_FILES_BATCH_CONCURRENCY,
        }
    }
}

impl ProcessConfig {
    /// A `ProcessConfig` using the `new_client` convenience constructor's
    /// shorter connection timeout, with every other tunable at its default.
    #[must_use]
    pub fn for_new_client() -> Self {
        Self {
            connection_timeout: NEW_CLIENT_CONNECTION_TIMEOUT,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(host: &str) -> InstanceRecord {
        InstanceRecord {
            id: InstanceId::new(1),
            name: "home".into(),
            host: Url::parse(host).expect("valid url"),
            username: "admin".into(),
            password: "secret".into(),
            basic_auth: None,
            tls_skip_verify: false,
            enabled: true,
            order: 0,
        }
    }

    #[test]
    fn validate_accepts_well_formed_record() {
        assert!(record("https://qbt.example:8080").validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_name() {
        let mut r = record("https://qbt.example:8080");
        r.name = String::new();
        assert!(matches!(
            r.validate(),
            Err(ConfigError::MissingField { field: "name", .. })
        ));
    }

    #[test]
    fn validate_rejects_non_http_scheme() {
        let r = record("ftp://qbt.example");
        assert!(matches!(
            r.validate(),
            Err(ConfigError::InvalidField { field: "host", .. })
        ));
    }

    #[test]
    fn process_config_for_new_client_uses_shorter_timeout() {
        let config = ProcessConfig::for_new_client();
        assert_eq!(config.connection_timeout, NEW_CLIENT_CONNECTION_TIMEOUT);
        assert_eq!(config.tracker_cache_ttl, DEFAULT_TRACKER_CACHE_TTL);
    }
}
