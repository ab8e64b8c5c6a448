//! TrailBuilder - Recent-Position History Paths
//!
//! ## Responsibilities
//!
//! - Fetch bounded history per visible object and keep its trail current
//! - Maintain one extended history path for the selected object
//! - Guard against overlapping per-tick fetches clobbering newer data
//!
//! The polling timer fires independently of how long a tick's fetches take,
//! so two ticks' history fetches can be in flight at once. Each trail
//! replacement is a full snapshot, so the only hazard is an older response
//! landing after a newer one. Two guards close it: an object with a fetch
//! still in flight is skipped for the round, and every fetch carries a
//! monotonic sequence number checked before the result is applied.

use crate::map_surface::{LonLat, MapSurface};
use crate::models::{HistoryPoint, ObjectClass, ObjectSnapshot};
use crate::telemetry_client::TelemetrySource;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// History points fetched per object per tick.
pub const TRAIL_LIMIT: usize = 30;

/// History points fetched for the selected object's extended path.
pub const EXTENDED_HISTORY_LIMIT: usize = 1000;

/// Surface key for the extended-selection path.
pub const EXTENDED_TRAIL_ID: &str = "selected-history";

/// Neutral color distinguishing the extended path from per-object trails.
pub const EXTENDED_TRAIL_COLOR: &str = "#94a3b8";

/// TrailBuilder instance
pub struct TrailBuilder {
    source: Arc<dyn TelemetrySource>,
    surface: Arc<dyn MapSurface>,
    trail_limit: usize,
    extended_limit: usize,
    in_flight: Mutex<HashSet<String>>,
    last_applied: Mutex<HashMap<String, u64>>,
    next_seq: AtomicU64,
    extended_for: Mutex<Option<String>>,
}

impl TrailBuilder {
    /// Create a builder with the default fetch limits.
    pub fn new(source: Arc<dyn TelemetrySource>, surface: Arc<dyn MapSurface>) -> Self {
        Self::with_limits(source, surface, TRAIL_LIMIT, EXTENDED_HISTORY_LIMIT)
    }

    /// Create a builder with explicit fetch limits.
    pub fn with_limits(
        source: Arc<dyn TelemetrySource>,
        surface: Arc<dyn MapSurface>,
        trail_limit: usize,
        extended_limit: usize,
    ) -> Self {
        Self {
            source,
            surface,
            trail_limit,
            extended_limit,
            in_flight: Mutex::new(HashSet::new()),
            last_applied: Mutex::new(HashMap::new()),
            next_seq: AtomicU64::new(1),
            extended_for: Mutex::new(None),
        }
    }

    /// Refresh trails for all visible objects.
    ///
    /// Per object: fetch up to the trail limit, skip when fewer than two
    /// points exist, otherwise sort ascending by timestamp and replace the
    /// path wholesale. Fetch failures are logged and leave the old path.
    pub async fn refresh(&self, objects: &[ObjectSnapshot]) {
        for obj in objects {
            let seq = match self.begin_fetch(&obj.id) {
                Some(seq) => seq,
                None => {
                    tracing::debug!(object_id = %obj.id, "Previous history fetch still in flight, skipping");
                    continue;
                }
            };

            let result = self.source.fetch_history(&obj.id, self.trail_limit).await;
            self.finish_fetch(&obj.id);

            match result {
                Ok(points) => self.apply_trail(&obj.id, seq, points),
                Err(e) => {
                    tracing::warn!(object_id = %obj.id, error = %e, "History fetch failed");
                }
            }
        }
    }

    /// Maintain the extended history path for the current selection.
    ///
    /// Fetches up to the extended limit for the selected object; clears the
    /// path when no selection is active. A response arriving after the
    /// selection moved on is discarded.
    pub async fn refresh_selected_history(&self, selected: Option<&str>) {
        let Some(object_id) = selected else {
            let had_selection = self.extended_for.lock().unwrap().take().is_some();
            if had_selection {
                self.surface.clear_trail(EXTENDED_TRAIL_ID);
            }
            return;
        };

        *self.extended_for.lock().unwrap() = Some(object_id.to_string());

        match self.source.fetch_history(object_id, self.extended_limit).await {
            Ok(mut points) => {
                if self.extended_for.lock().unwrap().as_deref() != Some(object_id) {
                    tracing::debug!(object_id = %object_id, "Selection changed mid-fetch, discarding extended history");
                    return;
                }
                if points.len() < 2 {
                    // Too little history to draw, but a previous selection's
                    // path must not linger under the new selection.
                    self.surface.clear_trail(EXTENDED_TRAIL_ID);
                    return;
                }
                points.sort_by_key(|p| p.ts);
                self.surface.set_trail(
                    EXTENDED_TRAIL_ID,
                    to_path(&points),
                    EXTENDED_TRAIL_COLOR,
                );
            }
            Err(e) => {
                tracing::warn!(object_id = %object_id, error = %e, "Extended history fetch failed");
            }
        }
    }

    /// Claim the in-flight slot for an object, returning the fetch sequence
    /// number, or `None` if a fetch for it is already running.
    fn begin_fetch(&self, object_id: &str) -> Option<u64> {
        let mut in_flight = self.in_flight.lock().unwrap();
        if !in_flight.insert(object_id.to_string()) {
            return None;
        }
        Some(self.next_seq.fetch_add(1, Ordering::SeqCst))
    }

    fn finish_fetch(&self, object_id: &str) {
        self.in_flight.lock().unwrap().remove(object_id);
    }

    /// Apply a fetched history, unless a newer fetch already has.
    fn apply_trail(&self, object_id: &str, seq: u64, mut points: Vec<HistoryPoint>) {
        {
            let mut last_applied = self.last_applied.lock().unwrap();
            match last_applied.get(object_id) {
                Some(&applied) if applied >= seq => {
                    tracing::debug!(
                        object_id = %object_id,
                        seq = seq,
                        applied = applied,
                        "Discarding stale history response"
                    );
                    return;
                }
                _ => {
                    last_applied.insert(object_id.to_string(), seq);
                }
            }
        }

        // A single point draws nothing.
        if points.len() < 2 {
            return;
        }
        points.sort_by_key(|p| p.ts);
        self.surface.set_trail(
            object_id,
            to_path(&points),
            ObjectClass::of(object_id).color(),
        );
    }
}

fn to_path(points: &[HistoryPoint]) -> Vec<LonLat> {
    points.iter().map(|p| [p.lon, p.lat]).collect()
}
