//! Logging surface for headless runs
//!
//! Emits every surface mutation as a tracing event instead of drawing.
//! Used by the demo binary; also handy when diagnosing reconciliation
//! behavior against a live backend without a map attached.

use super::{FlyTo, LonLat, MapSurface, ZoneFeature};

/// A [`MapSurface`] that only logs.
#[derive(Debug, Default)]
pub struct LogSurface;

impl LogSurface {
    pub fn new() -> Self {
        Self
    }
}

impl MapSurface for LogSurface {
    fn add_marker(&self, object_id: &str, position: LonLat, rotation_deg: f64, color: &str) {
        tracing::info!(
            object_id = %object_id,
            lon = position[0],
            lat = position[1],
            rotation_deg = rotation_deg,
            color = %color,
            "Marker created"
        );
    }

    fn move_marker(&self, object_id: &str, position: LonLat, rotation_deg: f64) {
        tracing::debug!(
            object_id = %object_id,
            lon = position[0],
            lat = position[1],
            rotation_deg = rotation_deg,
            "Marker moved"
        );
    }

    fn set_marker_color(&self, object_id: &str, color: &str) {
        tracing::debug!(object_id = %object_id, color = %color, "Marker recolored");
    }

    fn set_trail(&self, trail_id: &str, path: Vec<LonLat>, color: &str) {
        tracing::debug!(
            trail_id = %trail_id,
            points = path.len(),
            color = %color,
            "Trail replaced"
        );
    }

    fn clear_trail(&self, trail_id: &str) {
        tracing::debug!(trail_id = %trail_id, "Trail cleared");
    }

    fn set_zone_features(&self, features: Vec<ZoneFeature>) {
        tracing::info!(zones = features.len(), "Zone layer replaced");
    }

    fn fly_to(&self, fly: FlyTo) {
        tracing::info!(
            lon = fly.center[0],
            lat = fly.center[1],
            zoom = fly.zoom,
            duration_ms = fly.duration_ms,
            "Camera fly-to"
        );
    }

    fn pan_to(&self, center: LonLat) {
        tracing::debug!(lon = center[0], lat = center[1], "Camera recentre");
    }

    fn enable_polygon_draw(&self) {
        tracing::info!("Polygon draw mode enabled");
    }

    fn clear_drawn_shape(&self) {
        tracing::debug!("Drawn shape cleared");
    }

    fn reset_draw_mode(&self) {
        tracing::debug!("Draw mode reset");
    }

    fn show_warning(&self, message: &str) {
        tracing::warn!(message = %message, "Operator warning");
    }
}
