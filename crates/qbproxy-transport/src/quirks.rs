//! A process-wide workaround for a known `reqwest`/`hyper` quirk against
//! some qBittorrent reverse-proxy setups: an idle pooled HTTP/1.1 connection
//! that receives an unsolicited response logs a confusing warning.
//!
//! Isolated here so the matching predicate is unit-testable without
//! installing a global `tracing` subscriber in the test process, per
//! spec.md §9.

/// The exact substring `hyper` logs for this condition.
pub const UNSOLICITED_RESPONSE_LINE: &str = "Unsolicited response received on idle HTTP channel";

/// Whether a log line should be dropped by the process-wide interceptor.
#[must_use]
pub fn should_suppress(line: &str) -> bool {
    line.contains(UNSOLICITED_RESPONSE_LINE)
}
