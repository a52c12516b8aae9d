//! Instance identity and capability negotiation.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Stable integer identifier of a configured remote qBittorrent instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(pub i64);

impl InstanceId {
    /// Construct an `InstanceId` from a raw integer.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Return the raw integer value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for InstanceId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Feature flags derived from the remote's reported Web API version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Raw Web API version string reported by the remote.
    pub web_api_version: String,
    /// Whether the remote accepts the combined `setTags` endpoint.
    pub supports_set_tags: bool,
    /// Whether the remote's torrents-list endpoint can embed tracker data.
    pub include_trackers_in_list: bool,
}

/// Web API version at or above which `setTags`/`includeTrackers` are available.
pub const CAPABILITY_THRESHOLD: &str = "2.11.4";

impl Capabilities {
    /// Derive capability flags from a raw `webapiVersion` response body.
    #[must_use]
    pub fn from_webapi_version(web_api_version: &str) -> Self {
        let at_or_above_threshold =
            compare_versions(web_api_version, CAPABILITY_THRESHOLD) != Ordering::Less;
        Self {
            web_api_version: web_api_version.to_string(),
            supports_set_tags: at_or_above_threshold,
            include_trackers_in_list: at_or_above_threshold,
        }
    }
}

/// Compare two dot-separated numeric version strings component by component.
///
/// Missing trailing components compare as zero (`"2.11"` == `"2.11.0"`).
/// Non-numeric components compare as zero, which is the conservative choice
/// for malformed input rather than panicking.
#[must_use]
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.').map(parse_component);
    let mut right = b.split('.').map(parse_component);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (Some(l), None) => {
                if l != 0 {
                    return Ordering::Greater;
                }
            }
            (None, Some(r)) => {
                if r != 0 {
                    return Ordering::Less;
                }
            }
            (Some(l), Some(r)) => match l.cmp(&r) {
                Ordering::Equal => {}
                other => return other,
            },
        }
    }
}

fn parse_component(raw: &str) -> u64 {
    raw.trim().parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_version_enables_capabilities() {
        let caps = Capabilities::from_webapi_version("2.11.4");
        assert!(caps.supports_set_tags);
        assert!(caps.include_trackers_in_list);
    }

    #[test]
    fn above_threshold_enables_capabilities() {
        let caps = Capabilities::from_webapi_version("2.12.0");
        assert!(caps.supports_set_tags);
    }

    #[test]
    fn below_threshold_disables_capabilities() {
        let caps = Capabilities::from_webapi_version("2.9.3");
        assert!(!caps.supports_set_tags);
        assert!(!caps.include_trackers_in_list);
    }

    #[test]
    fn compare_versions_treats_missing_components_as_zero() {
        assert_eq!(compare_versions("2.11", "2.11.0"), Ordering::Equal);
        assert_eq!(compare_versions("2.11.0.1", "2.11"), Ordering::Greater);
    }

    #[test]
    fn compare_versions_orders_numerically_not_lexically() {
        assert_eq!(compare_versions("2.9.0", "2.11.4"), Ordering::Less);
        assert_eq!(compare_versions("2.100.0", "2.11.4"), Ordering::Greater);
    }
}
