//! CameraController - Fly-To and Follow Behavior
//!
//! ## Responsibilities
//!
//! - Animated fly-to on object selection (fixed point zoom)
//! - Animated fly-to on zone selection (fit the zone's extent)
//! - Continuous follow recentring while follow-mode is active
//!
//! Fly-to transitions are not cancellation-safe against each other: a new
//! one simply redirects the running animation (last writer wins), and
//! follow recentring issued while an animation settles may visually fight
//! it. Both are accepted behaviors inherited from the original console.

use crate::map_surface::{CameraPadding, FlyTo, LonLat, MapSurface};
use crate::models::Zone;
use std::sync::Arc;

/// Fly-to animation duration.
pub const FLY_DURATION_MS: u64 = 1200;

/// Zoom applied when flying to a single object.
pub const OBJECT_ZOOM: f64 = 13.0;

/// Right-side padding reserving space for the details panel, in pixels.
pub const PANEL_PADDING_RIGHT: f64 = 320.0;

/// CameraController instance
pub struct CameraController {
    surface: Arc<dyn MapSurface>,
}

impl CameraController {
    pub fn new(surface: Arc<dyn MapSurface>) -> Self {
        Self { surface }
    }

    /// Fly to an object's position at point zoom.
    pub fn fly_to_object(&self, lat: f64, lon: f64) {
        self.surface.fly_to(FlyTo {
            center: [lon, lat],
            zoom: OBJECT_ZOOM,
            duration_ms: FLY_DURATION_MS,
            padding: None,
        });
    }

    /// Fly to a zone, fitting its full extent, with asymmetric padding for
    /// the side panel. A zone without usable geometry is a no-op.
    pub fn fly_to_zone(&self, zone: &Zone) {
        let Some((center, zoom)) = zone_target(zone) else {
            tracing::warn!(zone = %zone.name, "Zone has no usable geometry, camera unchanged");
            return;
        };
        self.surface.fly_to(FlyTo {
            center,
            zoom,
            duration_ms: FLY_DURATION_MS,
            padding: Some(CameraPadding {
                right: PANEL_PADDING_RIGHT,
                ..CameraPadding::default()
            }),
        });
    }

    /// Recentre on the followed object without changing zoom. Issued every
    /// tick while follow-mode is active for the current selection.
    pub fn follow(&self, lat: f64, lon: f64) {
        self.surface.pan_to([lon, lat]);
    }
}

/// Camera target for a zone: centroid (polygons, by vertex average) or
/// bounding-box center, with a zoom fitting the larger coordinate span.
pub fn zone_target(zone: &Zone) -> Option<(LonLat, f64)> {
    if zone.is_polygon {
        let verts = zone.polygon_vertices().ok()?;
        if verts.is_empty() {
            return None;
        }
        let n = verts.len() as f64;
        let (lat_sum, lon_sum) = verts
            .iter()
            .fold((0.0, 0.0), |(la, lo), (lat, lon)| (la + lat, lo + lon));
        let lat_span = span(verts.iter().map(|v| v.0));
        let lon_span = span(verts.iter().map(|v| v.1));
        Some((
            [lon_sum / n, lat_sum / n],
            zoom_for_span(lat_span.max(lon_span)),
        ))
    } else {
        match (zone.min_lat, zone.min_lon, zone.max_lat, zone.max_lon) {
            (Some(min_lat), Some(min_lon), Some(max_lat), Some(max_lon)) => Some((
                [(min_lon + max_lon) / 2.0, (min_lat + max_lat) / 2.0],
                zoom_for_span((max_lat - min_lat).max(max_lon - min_lon)),
            )),
            _ => None,
        }
    }
}

fn span(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let min = values.clone().fold(f64::INFINITY, f64::min);
    let max = values.fold(f64::NEG_INFINITY, f64::max);
    max - min
}

/// Zoom level at which a coordinate span of `deg` degrees fills the view,
/// less one level of margin. The world spans 360 degrees at zoom 0.
fn zoom_for_span(deg: f64) -> f64 {
    if deg <= 0.0 {
        return OBJECT_ZOOM;
    }
    ((360.0 / deg).log2() - 1.0).clamp(3.0, 15.0)
}
