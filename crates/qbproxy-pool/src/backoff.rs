//! Exponential backoff tracking for failed Client construction or health
//! loss, keyed by instance id. Every tracked failure is classified into one
//! of two buckets with its own initial duration, growth, and cap; a ban
//! classification backs off far longer than a plain transient failure.

use qbproxy_core::model::InstanceId;
use qbproxy_core::ErrorKind;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const BAN_INITIAL: Duration = Duration::from_secs(5 * 60);
const BAN_CAP: Duration = Duration::from_secs(60 * 60);
const BAN_JITTER_SECS: f64 = 60.0;
const TRANSIENT_INITIAL: Duration = Duration::from_secs(30);
const TRANSIENT_CAP: Duration = Duration::from_secs(5 * 60);
const TRANSIENT_JITTER_SECS: f64 = 5.0;

/// Which backoff curve a failure falls under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffClass {
    /// Remote refused with a ban/rate-limit/forbidden response.
    Ban,
    /// Everything else: connection refused, timeout, 5xx.
    Transient,
}

impl BackoffClass {
    /// Classify a coarse [`ErrorKind`] into a backoff curve.
    #[must_use]
    pub const fn classify(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::AuthBanned => Self::Ban,
            _ => Self::Transient,
        }
    }

    const fn initial(self) -> Duration {
        match self {
            Self::Ban => BAN_INITIAL,
            Self::Transient => TRANSIENT_INITIAL,
        }
    }

    const fn cap(self) -> Duration {
        match self {
            Self::Ban => BAN_CAP,
            Self::Transient => TRANSIENT_CAP,
        }
    }

    const fn jitter_secs(self) -> f64 {
        match self {
            Self::Ban => BAN_JITTER_SECS,
            Self::Transient => TRANSIENT_JITTER_SECS,
        }
    }
}

/// A tracked failure against one instance: attempt count, computed next
/// retry time, last error detail, and classification.
#[derive(Debug, Clone)]
pub struct FailureRecord {
    /// Number of consecutive tracked failures, starting at 1.
    pub attempts: u32,
    /// When the instance becomes eligible for another attempt.
    pub next_retry_at: Instant,
    /// Human-readable detail of the most recent failure.
    pub last_error: String,
    /// Classification driving the backoff curve.
    pub classification: BackoffClass,
}

/// Snapshot returned by `GetBackoffStatus`.
#[derive(Debug, Clone, Copy)]
pub struct BackoffStatus {
    /// Whether `now` is still before `next_retry_at`.
    pub in_backoff: bool,
    /// When the instance becomes eligible for another attempt.
    pub next_retry_at: Instant,
    /// Number of consecutive tracked failures.
    pub attempts: u32,
}

/// Base duration before jitter: `initial * 2^(attempts - 1)`, capped.
fn base_duration(class: BackoffClass, attempts: u32) -> Duration {
    let exponent = attempts.saturating_sub(1).min(16);
    let multiplier = 1u64 << exponent;
    let scaled = u64::try_from(class.initial().as_millis())
        .unwrap_or(u64::MAX)
        .saturating_mul(multiplier);
    let capped = scaled.min(u64::try_from(class.cap().as_millis()).unwrap_or(u64::MAX));
    Duration::from_millis(capped)
}

fn jittered(class: BackoffClass, attempts: u32) -> Duration {
    let base = base_duration(class, attempts).as_secs_f64();
    let spread = class.jitter_secs();
    let jitter = rand::rng().random_range(-spread..=spread);
    Duration::from_secs_f64((base + jitter).max(0.0))
}

/// Per-instance exponential backoff state, guarded by a coarse lock.
#[derive(Debug, Default)]
pub struct BackoffTracker {
    records: Mutex<HashMap<InstanceId, FailureRecord>>,
}

impl BackoffTracker {
    /// Construct a tracker with no recorded failures.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure against `instance_id`, advancing its attempt count
    /// and computing a new `next_retry_at`. Returns the updated record.
    pub fn record_failure(&self, instance_id: InstanceId, kind: ErrorKind, message: String) -> FailureRecord {
        let classification = BackoffClass::classify(kind);
        let mut records = self.records.lock().expect("backoff tracker lock poisoned");
        let attempts = records.get(&instance_id).map_or(1, |existing| existing.attempts + 1);
        let record = FailureRecord {
            attempts,
            next_retry_at: Instant::now() + jittered(classification, attempts),
            last_error: message,
            classification,
        };
        records.insert(instance_id, record.clone());
        record
    }

    /// Whether `instance_id` is currently within its backoff window.
    #[must_use]
    pub fn is_in_backoff(&self, instance_id: InstanceId) -> bool {
        self.records
            .lock()
            .expect("backoff tracker lock poisoned")
            .get(&instance_id)
            .is_some_and(|record| Instant::now() < record.next_retry_at)
    }

    /// Current backoff status for `instance_id`, if any failure is tracked.
    #[must_use]
    pub fn status(&self, instance_id: InstanceId) -> Option<BackoffStatus> {
        self.records.lock().expect("backoff tracker lock poisoned").get(&instance_id).map(|record| BackoffStatus {
            in_backoff: Instant::now() < record.next_retry_at,
            next_retry_at: record.next_retry_at,
            attempts: record.attempts,
        })
    }

    /// Clear the tracked record for `instance_id`, e.g. after a successful
    /// health check or an explicit user retry.
    pub fn reset(&self, instance_id: InstanceId) {
        self.records.lock().expect("backoff tracker lock poisoned").remove(&instance_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIALS: u32 = 50;

    #[test]
    fn ban_first_failure_backs_off_five_minutes_plus_or_minus_jitter() {
        for _ in 0..TRIALS {
            let tracker = BackoffTracker::new();
            let id = InstanceId::new(1);
            let before = Instant::now();
            let record = tracker.record_failure(id, ErrorKind::AuthBanned, "ip is banned".into());
            assert_eq!(record.attempts, 1);
            let wait = record.next_retry_at.saturating_duration_since(before);
            assert!(wait >= Duration::from_secs(4 * 60), "wait too short: {wait:?}");
            assert!(wait <= Duration::from_secs(6 * 60), "wait too long: {wait:?}");
        }
    }

    #[test]
    fn ban_second_failure_doubles_to_ten_minutes() {
        for _ in 0..TRIALS {
            let tracker = BackoffTracker::new();
            let id = InstanceId::new(1);
            tracker.record_failure(id, ErrorKind::AuthBanned, "ip is banned".into());
            let before = Instant::now();
            let record = tracker.record_failure(id, ErrorKind::AuthBanned, "ip is banned".into());
            assert_eq!(record.attempts, 2);
            let wait = record.next_retry_at.saturating_duration_since(before);
            assert!(wait >= Duration::from_secs(9 * 60), "wait too short: {wait:?}");
            assert!(wait <= Duration::from_secs(11 * 60), "wait too long: {wait:?}");
        }
    }

    #[test]
    fn ban_six_failures_caps_at_sixty_minutes() {
        for _ in 0..TRIALS {
            let tracker = BackoffTracker::new();
            let id = InstanceId::new(1);
            let mut last = None;
            for _ in 0..6 {
                last = Some(tracker.record_failure(id, ErrorKind::AuthBanned, "ip is banned".into()));
            }
            let record = last.expect("six attempts recorded");
            assert_eq!(record.attempts, 6);
            let wait = record.next_retry_at.saturating_duration_since(Instant::now());
            assert!(wait >= Duration::from_secs(59 * 60), "wait too short: {wait:?}");
            assert!(wait <= Duration::from_secs(61 * 60), "wait too long: {wait:?}");
        }
    }

    #[test]
    fn transient_failure_uses_the_shorter_curve() {
        let tracker = BackoffTracker::new();
        let id = InstanceId::new(2);
        let before = Instant::now();
        let record = tracker.record_failure(id, ErrorKind::Transient, "connection refused".into());
        let wait = record.next_retry_at.saturating_duration_since(before);
        assert!(wait >= Duration::from_secs(25));
        assert!(wait <= Duration::from_secs(35));
    }

    #[test]
    fn reset_clears_backoff_and_attempts() {
        let tracker = BackoffTracker::new();
        let id = InstanceId::new(3);
        tracker.record_failure(id, ErrorKind::AuthBanned, "ip is banned".into());
        assert!(tracker.is_in_backoff(id));

        tracker.reset(id);
        assert!(!tracker.is_in_backoff(id));
        assert_eq!(tracker.status(id).map(|status| status.attempts), None);
    }

    #[test]
    fn instance_with_no_recorded_failure_is_not_in_backoff() {
        let tracker = BackoffTracker::new();
        assert!(!tracker.is_in_backoff(InstanceId::new(99)));
        assert!(tracker.status(InstanceId::new(99)).is_none());
    }
}
