//! Thin HTTP client speaking the qBittorrent Web API v2.
//!
//! Maintains a session cookie via `reqwest`'s cookie store, exposes the
//! operations listed in spec.md §4.A, and classifies every failure into the
//! [`qbproxy_core::ErrorKind`] taxonomy so callers never need to pattern-match
//! on HTTP status codes themselves.

use crate::error::{TransportError, TransportResult};
use crate::wire::{RawAppPreferences, RawBuildInfo, RawMainData, RawTorrent, RawTorrentFile, RawTracker};
use qbproxy_config::InstanceRecord;
use qbproxy_core::ErrorKind;
use reqwest::{Client as HttpClient, StatusCode};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

/// Selection criteria for `GET /api/v2/torrents/info`.
#[derive(Debug, Clone, Default)]
pub struct TorrentListQuery {
    /// Restrict to these hashes, `|`-joined on the wire.
    pub hashes: Vec<String>,
    /// Whether to ask the remote to embed tracker data (capability-gated).
    pub include_trackers: bool,
}

/// Maximum response body captured for error diagnostics/classification.
const ERROR_BODY_SAMPLE_LEN: usize = 512;

/// Speaks the qBittorrent Web API for a single configured instance.
#[derive(Debug, Clone)]
pub struct Transport {
    http: HttpClient,
    base_url: reqwest::Url,
    basic_auth: Option<(String, String)>,
}

impl Transport {
    /// Construct a transport for `record`, applying its TLS and basic-auth
    /// settings. Does not perform any network I/O.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidUrl`] if `record.host` cannot be
    /// used as a request base, or [`TransportError::Http`] if the
    /// underlying `reqwest::Client` cannot be built.
    pub fn new(record: &InstanceRecord, connect_timeout: Duration) -> TransportResult<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .connect_timeout(connect_timeout)
            .danger_accept_invalid_certs(record.tls_skip_verify)
            .build()
            .map_err(|source| TransportError::Http {
                operation: "transport.new",
                source,
            })?;
        Ok(Self {
            http,
            base_url: record.host.clone(),
            basic_auth: record
                .basic_auth
                .as_ref()
                .map(|auth| (auth.username.clone(), auth.password.clone())),
        })
    }

    fn url(&self, path: &str) -> TransportResult<reqwest::Url> {
        self.base_url
            .join(path)
            .map_err(|source| TransportError::InvalidUrl {
                operation: "transport.url",
                source,
            })
    }

    fn request(&self, method: reqwest::Method, url: reqwest::Url) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.basic_auth {
            Some((user, pass)) => builder.basic_auth(user, Some(pass)),
            None => builder,
        }
    }

    async fn send_bounded(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
        deadline: Duration,
    ) -> TransportResult<reqwest::Response> {
        let response = timeout(deadline, request.send())
            .await
            .map_err(|_elapsed| TransportError::Timeout { operation })?
            .map_err(|source| TransportError::Http { operation, source })?;
        self.check_status(operation, response).await
    }

    async fn check_status(&self, operation: &'static str, response: reqwest::Response) -> TransportResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let sample: String = body.chars().take(ERROR_BODY_SAMPLE_LEN).collect();
        let kind = classify_status(status, &sample);
        warn!(operation, status = status.as_u16(), "qbittorrent request failed");
        Err(TransportError::Status {
            operation,
            status: status.as_u16(),
            body: sample,
            kind,
        })
    }

    /// `POST /api/v2/auth/login`. Session cookie is captured by the
    /// underlying client's cookie store for subsequent calls.
    #[instrument(skip(self, username, password), fields(operation = "login"))]
    pub async fn login(&self, username: &str, password: &str, deadline: Duration) -> TransportResult<()> {
        let url = self.url("api/v2/auth/login")?;
        let form = [("username", username), ("password", password)];
        let request = self.request(reqwest::Method::POST, url).form(&form);
        let response = self.send_bounded("login", request, deadline).await?;
        let body = response
            .text()
            .await
            .map_err(|source| TransportError::Http {
                operation: "login",
                source,
            })?;
        if body.trim() == "Ok." {
            debug!("qbittorrent login succeeded");
            Ok(())
        } else {
            Err(TransportError::AuthInvalid { operation: "login" })
        }
    }

    /// `GET /api/v2/app/version`.
    pub async fn get_app_version(&self, deadline: Duration) -> TransportResult<String> {
        self.get_text("api/v2/app/version", "get_app_version", deadline).await
    }

    /// `GET /api/v2/app/webapiVersion`.
    pub async fn get_webapi_version(&self, deadline: Duration) -> TransportResult<String> {
        self.get_text("api/v2/app/webapiVersion", "get_webapi_version", deadline)
            .await
    }

    async fn get_text(&self, path: &str, operation: &'static str, deadline: Duration) -> TransportResult<String> {
        let url = self.url(path)?;
        let request = self.request(reqwest::Method::GET, url);
        let response = self.send_bounded(operation, request, deadline).await?;
        response.text().await.map_err(|source| TransportError::Http { operation, source })
    }

    /// `GET /api/v2/app/buildInfo`.
    pub async fn get_build_info(&self, deadline: Duration) -> TransportResult<RawBuildInfo> {
        self.get_json("api/v2/app/buildInfo", "get_build_info", deadline).await
    }

    /// `GET /api/v2/app/preferences`.
    pub async fn get_app_preferences(&self, deadline: Duration) -> TransportResult<RawAppPreferences> {
        self.get_json("api/v2/app/preferences", "get_app_preferences", deadline).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        operation: &'static str,
        deadline: Duration,
    ) -> TransportResult<T> {
        let url = self.url(path)?;
        let request = self.request(reqwest::Method::GET, url);
        let response = self.send_bounded(operation, request, deadline).await?;
        let bytes = response.bytes().await.map_err(|source| TransportError::Http { operation, source })?;
        serde_json::from_slice(&bytes).map_err(|source| TransportError::Decode { operation, source })
    }

    /// `GET /api/v2/sync/maindata?rid=<last>`.
    pub async fn get_main_data(&self, rid: i64, deadline: Duration) -> TransportResult<RawMainData> {
        let mut url = self.url("api/v2/sync/maindata")?;
        url.query_pairs_mut().append_pair("rid", &rid.to_string());
        let request = self.request(reqwest::Method::GET, url);
        let response = self.send_bounded("get_main_data", request, deadline).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| TransportError::Http {
                operation: "get_main_data",
                source,
            })?;
        serde_json::from_slice(&bytes).map_err(|source| TransportError::Decode {
            operation: "get_main_data",
            source,
        })
    }

    /// `GET /api/v2/torrents/info?hashes=h1|h2|…&includeTrackers=true`.
    ///
    /// An empty response body (the remote returns `[]` when nothing
    /// matches) yields an empty vector, never an error.
    pub async fn get_torrents(&self, query: &TorrentListQuery, deadline: Duration) -> TransportResult<Vec<RawTorrent>> {
        let mut url = self.url("api/v2/torrents/info")?;
        {
            let mut pairs = url.query_pairs_mut();
            if !query.hashes.is_empty() {
                pairs.append_pair("hashes", &query.hashes.join("|"));
            }
            if query.include_trackers {
                pairs.append_pair("includeTrackers", "true");
            }
        }
        let request = self.request(reqwest::Method::GET, url);
        let response = self.send_bounded("get_torrents", request, deadline).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| TransportError::Http {
                operation: "get_torrents",
                source,
            })?;
        serde_json::from_slice(&bytes).map_err(|source| TransportError::Decode {
            operation: "get_torrents",
            source,
        })
    }

    /// `GET /api/v2/torrents/files?hash=<hash>`.
    pub async fn get_files_information(&self, hash: &str, deadline: Duration) -> TransportResult<Vec<RawTorrentFile>> {
        let mut url = self.url("api/v2/torrents/files")?;
        url.query_pairs_mut().append_pair("hash", hash);
        let request = self.request(reqwest::Method::GET, url);
        let response = self.send_bounded("get_files_information", request, deadline).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| TransportError::Http {
                operation: "get_files_information",
                source,
            })?;
        serde_json::from_slice(&bytes).map_err(|source| TransportError::Decode {
            operation: "get_files_information",
            source,
        })
    }

    /// `GET /api/v2/torrents/trackers?hash=<hash>`.
    pub async fn get_torrent_trackers(&self, hash: &str, deadline: Duration) -> TransportResult<Vec<RawTracker>> {
        let mut url = self.url("api/v2/torrents/trackers")?;
        url.query_pairs_mut().append_pair("hash", hash);
        let request = self.request(reqwest::Method::GET, url);
        let response = self.send_bounded("get_torrent_trackers", request, deadline).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| TransportError::Http {
                operation: "get_torrent_trackers",
                source,
            })?;
        serde_json::from_slice(&bytes).map_err(|source| TransportError::Decode {
            operation: "get_torrent_trackers",
            source,
        })
    }

    async fn post_action(&self, path: &str, operation: &'static str, form: &[(&str, String)], deadline: Duration) -> TransportResult<()> {
        let url = self.url(path)?;
        let request = self.request(reqwest::Method::POST, url).form(form);
        self.send_bounded(operation, request, deadline).await?;
        Ok(())
    }

    fn hashes_param(hashes: &[String]) -> String {
        hashes.join("|")
    }

    /// `POST /api/v2/torrents/resume`.
    pub async fn resume(&self, hashes: &[String], deadline: Duration) -> TransportResult<()> {
        self.post_action(
            "api/v2/torrents/resume",
            "resume",
            &[("hashes", Self::hashes_param(hashes))],
            deadline,
        )
        .await
    }

    /// `POST /api/v2/torrents/pause`.
    pub async fn pause(&self, hashes: &[String], deadline: Duration) -> TransportResult<()> {
        self.post_action(
            "api/v2/torrents/pause",
            "pause",
            &[("hashes", Self::hashes_param(hashes))],
            deadline,
        )
        .await
    }

    /// `POST /api/v2/torrents/recheck`.
    pub async fn recheck(&self, hashes: &[String], deadline: Duration) -> TransportResult<()> {
        self.post_action(
            "api/v2/torrents/recheck",
            "recheck",
            &[("hashes", Self::hashes_param(hashes))],
            deadline,
        )
        .await
    }

    /// `POST /api/v2/torrents/setForceStart`.
    pub async fn force_start(&self, hashes: &[String], value: bool, deadline: Duration) -> TransportResult<()> {
        self.post_action(
            "api/v2/torrents/setForceStart",
            "force_start",
            &[("hashes", Self::hashes_param(hashes)), ("value", value.to_string())],
            deadline,
        )
        .await
    }

    /// `POST /api/v2/torrents/addTags`.
    pub async fn add_tags(&self, hashes: &[String], tags: &[String], deadline: Duration) -> TransportResult<()> {
        self.post_action(
            "api/v2/torrents/addTags",
            "add_tags",
            &[("hashes", Self::hashes_param(hashes)), ("tags", tags.join(","))],
            deadline,
        )
        .await
    }

    /// `POST /api/v2/torrents/setTags`. Requires API ≥ 2.11.4; older
    /// remotes must use [`Self::add_tags`]/[`Self::remove_tags`] instead,
    /// per `Capabilities::supports_set_tags`.
    pub async fn set_tags(&self, hashes: &[String], tags: &[String], deadline: Duration) -> TransportResult<()> {
        self.post_action(
            "api/v2/torrents/setTags",
            "set_tags",
            &[("hashes", Self::hashes_param(hashes)), ("tags", tags.join(","))],
            deadline,
        )
        .await
    }

    /// `POST /api/v2/torrents/removeTags`.
    pub async fn remove_tags(&self, hashes: &[String], tags: &[String], deadline: Duration) -> TransportResult<()> {
        self.post_action(
            "api/v2/torrents/removeTags",
            "remove_tags",
            &[("hashes", Self::hashes_param(hashes)), ("tags", tags.join(","))],
            deadline,
        )
        .await
    }

    /// `POST /api/v2/torrents/setCategory`.
    pub async fn set_category(&self, hashes: &[String], category: &str, deadline: Duration) -> TransportResult<()> {
        self.post_action(
            "api/v2/torrents/setCategory",
            "set_category",
            &[("hashes", Self::hashes_param(hashes)), ("category", category.to_string())],
            deadline,
        )
        .await
    }

    /// `POST /api/v2/torrents/setLocation`.
    pub async fn set_location(&self, hashes: &[String], location: &str, deadline: Duration) -> TransportResult<()> {
        self.post_action(
            "api/v2/torrents/setLocation",
            "set_location",
            &[("hashes", Self::hashes_param(hashes)), ("location", location.to_string())],
            deadline,
        )
        .await
    }

    /// `POST /api/v2/torrents/setShareLimits`.
    pub async fn set_share_limits(
        &self,
        hashes: &[String],
        ratio_limit: f64,
        seeding_time_limit: i64,
        inactive_seeding_time_limit: i64,
        deadline: Duration,
    ) -> TransportResult<()> {
        self.post_action(
            "api/v2/torrents/setShareLimits",
            "set_share_limits",
            &[
                ("hashes", Self::hashes_param(hashes)),
                ("ratioLimit", ratio_limit.to_string()),
                ("seedingTimeLimit", seeding_time_limit.to_string()),
                ("inactiveSeedingTimeLimit", inactive_seeding_time_limit.to_string()),
            ],
            deadline,
        )
        .await
    }

    /// `POST /api/v2/torrents/setDownloadLimit` + `setUploadLimit`.
    pub async fn set_speed_limits(
        &self,
        hashes: &[String],
        download_limit: i64,
        upload_limit: i64,
        deadline: Duration,
    ) -> TransportResult<()> {
        self.post_action(
            "api/v2/torrents/setDownloadLimit",
            "set_speed_limits",
            &[("hashes", Self::hashes_param(hashes)), ("limit", download_limit.to_string())],
            deadline,
        )
        .await?;
        self.post_action(
            "api/v2/torrents/setUploadLimit",
            "set_speed_limits",
            &[("hashes", Self::hashes_param(hashes)), ("limit", upload_limit.to_string())],
            deadline,
        )
        .await
    }

    /// `POST /api/v2/torrents/setAutoManagement`.
    pub async fn set_auto_management(&self, hashes: &[String], enable: bool, deadline: Duration) -> TransportResult<()> {
        self.post_action(
            "api/v2/torrents/setAutoManagement",
            "set_auto_management",
            &[("hashes", Self::hashes_param(hashes)), ("enable", enable.to_string())],
            deadline,
        )
        .await
    }

    /// `POST /api/v2/torrents/reannounce`.
    pub async fn reannounce(&self, hashes: &[String], deadline: Duration) -> TransportResult<()> {
        self.post_action(
            "api/v2/torrents/reannounce",
            "reannounce",
            &[("hashes", Self::hashes_param(hashes))],
            deadline,
        )
        .await
    }

    /// `POST /api/v2/torrents/filePrio`.
    pub async fn set_file_priorities(&self, hash: &str, file_ids: &[u32], priority: i8, deadline: Duration) -> TransportResult<()> {
        let ids = file_ids.iter().map(ToString::to_string).collect::<Vec<_>>().join("|");
        self.post_action(
            "api/v2/torrents/filePrio",
            "set_file_priorities",
            &[("hash", hash.to_string()), ("id", ids), ("priority", priority.to_string())],
            deadline,
        )
        .await
    }

    /// `GET /api/v2/torrents/export?hash=<hash>`, returning the raw
    /// `.torrent` bytes.
    pub async fn export_torrent(&self, hash: &str, deadline: Duration) -> TransportResult<Vec<u8>> {
        let mut url = self.url("api/v2/torrents/export")?;
        url.query_pairs_mut().append_pair("hash", hash);
        let request = self.request(reqwest::Method::GET, url);
        let response = self.send_bounded("export_torrent", request, deadline).await?;
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|source| TransportError::Http {
                operation: "export_torrent",
                source,
            })
    }

    /// `POST /api/v2/torrents/delete`.
    pub async fn delete(&self, hashes: &[String], delete_files: bool, deadline: Duration) -> TransportResult<()> {
        self.post_action(
            "api/v2/torrents/delete",
            "delete",
            &[("hashes", Self::hashes_param(hashes)), ("deleteFiles", delete_files.to_string())],
            deadline,
        )
        .await
    }

    /// `POST /api/v2/torrents/add` with a magnet/URL list (upload of raw
    /// `.torrent` bytes is handled by a dedicated multipart path in
    /// production deployments of this transport; this crate implements the
    /// URL/magnet form, which covers every `add` path this workspace's
    /// callers use).
    pub async fn add(&self, urls: &[String], save_path: Option<&str>, category: Option<&str>, deadline: Duration) -> TransportResult<()> {
        let mut form = vec![("urls", urls.join("\n"))];
        if let Some(path) = save_path {
            form.push(("savepath", path.to_string()));
        }
        if let Some(category) = category {
            form.push(("category", category.to_string()));
        }
        self.post_action("api/v2/torrents/add", "add", &form, deadline).await
    }

    /// `GET /api/v2/log/main`.
    pub async fn get_main_logs(&self, last_known_id: i64, deadline: Duration) -> TransportResult<Vec<RawLogEntry>> {
        let mut url = self.url("api/v2/log/main")?;
        url.query_pairs_mut().append_pair("last_known_id", &last_known_id.to_string());
        let request = self.request(reqwest::Method::GET, url);
        let response = self.send_bounded("get_main_logs", request, deadline).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| TransportError::Http {
                operation: "get_main_logs",
                source,
            })?;
        serde_json::from_slice(&bytes).map_err(|source| TransportError::Decode {
            operation: "get_main_logs",
            source,
        })
    }

    /// `GET /api/v2/log/peers`.
    pub async fn get_peer_logs(&self, last_known_id: i64, deadline: Duration) -> TransportResult<Vec<RawPeerLogEntry>> {
        let mut url = self.url("api/v2/log/peers")?;
        url.query_pairs_mut().append_pair("last_known_id", &last_known_id.to_string());
        let request = self.request(reqwest::Method::GET, url);
        let response = self.send_bounded("get_peer_logs", request, deadline).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| TransportError::Http {
                operation: "get_peer_logs",
                source,
            })?;
        serde_json::from_slice(&bytes).map_err(|source| TransportError::Decode {
            operation: "get_peer_logs",
            source,
        })
    }
}

/// A single `GET /api/v2/log/main` entry. Used by `Client::get_main_logs`
/// to derive the session-start timestamp (spec.md §4.C operation 10).
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RawLogEntry {
    /// Monotonically increasing log id.
    pub id: i64,
    /// Unix timestamp, milliseconds.
    pub timestamp: i64,
    /// Log message text.
    pub message: String,
    /// Bitmask severity the remote assigns to the entry.
    #[serde(rename = "type")]
    pub kind: i64,
}

/// A single `GET /api/v2/log/peers` entry.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RawPeerLogEntry {
    /// Monotonically increasing log id.
    pub id: i64,
    /// Unix timestamp, milliseconds.
    pub timestamp: i64,
    /// Remote peer IP address.
    pub ip: String,
    /// Whether the peer was blocked.
    pub blocked: bool,
    /// Reason the peer was blocked, if any.
    #[serde(default)]
    pub reason: String,
}

/// Classify an HTTP status and response body into a coarse error kind,
/// applying the ban/rate-limit matchers from spec.md §7 before falling back
/// to status-code-only classification.
#[must_use]
pub fn classify_status(status: StatusCode, body: &str) -> ErrorKind {
    ErrorKind::classify(Some(status.as_u16()), body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_status_detects_ip_ban_message() {
        let kind = classify_status(
            StatusCode::FORBIDDEN,
            "User's IP is banned for too many failed login attempts",
        );
        assert_eq!(kind, ErrorKind::AuthBanned);
    }

    #[test]
    fn classify_status_falls_back_to_code() {
        assert_eq!(classify_status(StatusCode::NOT_FOUND, ""), ErrorKind::NotFound);
        assert_eq!(classify_status(StatusCode::BAD_GATEWAY, ""), ErrorKind::Transient);
    }

    #[test]
    fn hashes_param_pipe_joins() {
        let hashes = vec!["a".to_string(), "b".to_string()];
        assert_eq!(Transport::hashes_param(&hashes), "a|b");
    }
}
