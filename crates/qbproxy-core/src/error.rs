//! Shared error taxonomy used to classify failures across the proxy core.
//!
//! Every crate in the workspace defines its own `thiserror` error type for
//! its own operations, but each of those types is classified into one of the
//! [`ErrorKind`] buckets below so the Sync Manager and Client Pool can drive
//! retry/backoff decisions without downcasting to a concrete error type.

use std::fmt;

/// Coarse classification of a failure, independent of which crate raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The remote refused the request with a ban, rate-limit, or forbidden
    /// response. Drives long backoff at the pool level.
    AuthBanned,
    /// Credentials were rejected outright; the user must correct them.
    AuthInvalid,
    /// Network/timeout/5xx failure. Retried by the Sync Manager with a
    /// short backoff.
    Transient,
    /// The remote returned a payload shape the client could not decode.
    ProtocolDecode,
    /// The requested torrent or resource does not exist.
    NotFound,
    /// Caller-supplied input was invalid.
    ValidationError,
    /// The operation's context was cancelled or its deadline elapsed.
    Cancelled,
}

impl ErrorKind {
    /// Classify a raw HTTP status code and response body into a kind,
    /// applying the case-insensitive substring matchers from the ban/forbidden
    /// taxonomy.
    #[must_use]
    pub fn classify(status: Option<u16>, body: &str) -> Self {
        let lowered = body.to_ascii_lowercase();
        if BAN_MATCHERS.iter().any(|needle| lowered.contains(needle)) {
            return Self::AuthBanned;
        }
        match status {
            Some(401) => Self::AuthInvalid,
            Some(403) => Self::AuthBanned,
            Some(404) => Self::NotFound,
            Some(500..=599) => Self::Transient,
            _ => Self::Transient,
        }
    }

    /// Whether this kind should be retried by the Sync Manager's poll loop.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Transient | Self::AuthInvalid | Self::ProtocolDecode)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::AuthBanned => "auth_banned",
            Self::AuthInvalid => "auth_invalid",
            Self::Transient => "transient",
            Self::ProtocolDecode => "protocol_decode",
            Self::NotFound => "not_found",
            Self::ValidationError => "validation_error",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// Case-insensitive substrings that classify a failure as a ban/rate-limit.
pub const BAN_MATCHERS: &[&str] = &[
    "ip is banned",
    "too many failed login",
    "rate limit",
    "http 403",
    "forbidden",
];
