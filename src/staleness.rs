//! Staleness classification
//!
//! Classifies an object snapshot as stale (likely out of contact) or live.
//! Display-only: the verdict drives marker coloring, never removal.

use crate::models::ObjectSnapshot;
use chrono::{DateTime, Duration, Utc};

/// An object is stale once its last report is older than this.
pub const STALE_THRESHOLD_SECS: i64 = 30;

/// Confidence below this reads as lost signal regardless of recency.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.10;

/// Classify a snapshot against the two staleness thresholds.
///
/// A `last_seen` in the future (clock skew) yields a negative age and is
/// not stale on its own; only the explicit thresholds drive the verdict.
pub fn is_stale(snapshot: &ObjectSnapshot, now: DateTime<Utc>) -> bool {
    if snapshot.last_confidence < LOW_CONFIDENCE_THRESHOLD {
        return true;
    }
    let age = now.signed_duration_since(snapshot.last_seen);
    age > Duration::seconds(STALE_THRESHOLD_SECS)
}
