//! Recording surface for unit tests: captures every operation so tests can
//! assert on the exact sequence of mutations and the resulting state.

use super::{FlyTo, LonLat, MapSurface, ZoneFeature};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SurfaceOp {
    AddMarker {
        object_id: String,
        position: LonLat,
        rotation_deg: f64,
        color: String,
    },
    MoveMarker {
        object_id: String,
        position: LonLat,
        rotation_deg: f64,
    },
    SetMarkerColor {
        object_id: String,
        color: String,
    },
    SetTrail {
        trail_id: String,
        path: Vec<LonLat>,
        color: String,
    },
    ClearTrail {
        trail_id: String,
    },
    SetZoneFeatures(Vec<ZoneFeature>),
    FlyTo(FlyTo),
    PanTo(LonLat),
    EnablePolygonDraw,
    ClearDrawnShape,
    ResetDrawMode,
    ShowWarning(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedMarker {
    pub position: LonLat,
    pub rotation_deg: f64,
    pub color: String,
}

#[derive(Debug, Default)]
pub(crate) struct RecordingSurface {
    pub ops: Mutex<Vec<SurfaceOp>>,
    pub markers: Mutex<HashMap<String, RecordedMarker>>,
    pub trails: Mutex<HashMap<String, Vec<LonLat>>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> Vec<SurfaceOp> {
        self.ops.lock().unwrap().clone()
    }

    pub fn marker(&self, object_id: &str) -> Option<RecordedMarker> {
        self.markers.lock().unwrap().get(object_id).cloned()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.lock().unwrap().len()
    }

    pub fn trail(&self, trail_id: &str) -> Option<Vec<LonLat>> {
        self.trails.lock().unwrap().get(trail_id).cloned()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                SurfaceOp::ShowWarning(msg) => Some(msg),
                _ => None,
            })
            .collect()
    }

    pub fn count_adds(&self) -> usize {
        self.ops()
            .iter()
            .filter(|op| matches!(op, SurfaceOp::AddMarker { .. }))
            .count()
    }

    fn record(&self, op: SurfaceOp) {
        self.ops.lock().unwrap().push(op);
    }
}

impl MapSurface for RecordingSurface {
    fn add_marker(&self, object_id: &str, position: LonLat, rotation_deg: f64, color: &str) {
        self.markers.lock().unwrap().insert(
            object_id.to_string(),
            RecordedMarker {
                position,
                rotation_deg,
                color: color.to_string(),
            },
        );
        self.record(SurfaceOp::AddMarker {
            object_id: object_id.to_string(),
            position,
            rotation_deg,
            color: color.to_string(),
        });
    }

    fn move_marker(&self, object_id: &str, position: LonLat, rotation_deg: f64) {
        if let Some(marker) = self.markers.lock().unwrap().get_mut(object_id) {
            marker.position = position;
            marker.rotation_deg = rotation_deg;
        }
        self.record(SurfaceOp::MoveMarker {
            object_id: object_id.to_string(),
            position,
            rotation_deg,
        });
    }

    fn set_marker_color(&self, object_id: &str, color: &str) {
        if let Some(marker) = self.markers.lock().unwrap().get_mut(object_id) {
            marker.color = color.to_string();
        }
        self.record(SurfaceOp::SetMarkerColor {
            object_id: object_id.to_string(),
            color: color.to_string(),
        });
    }

    fn set_trail(&self, trail_id: &str, path: Vec<LonLat>, color: &str) {
        self.trails
            .lock()
            .unwrap()
            .insert(trail_id.to_string(), path.clone());
        self.record(SurfaceOp::SetTrail {
            trail_id: trail_id.to_string(),
            path,
            color: color.to_string(),
        });
    }

    fn clear_trail(&self, trail_id: &str) {
        self.trails.lock().unwrap().remove(trail_id);
        self.record(SurfaceOp::ClearTrail {
            trail_id: trail_id.to_string(),
        });
    }

    fn set_zone_features(&self, features: Vec<ZoneFeature>) {
        self.record(SurfaceOp::SetZoneFeatures(features));
    }

    fn fly_to(&self, fly: FlyTo) {
        self.record(SurfaceOp::FlyTo(fly));
    }

    fn pan_to(&self, center: LonLat) {
        self.record(SurfaceOp::PanTo(center));
    }

    fn enable_polygon_draw(&self) {
        self.record(SurfaceOp::EnablePolygonDraw);
    }

    fn clear_drawn_shape(&self) {
        self.record(SurfaceOp::ClearDrawnShape);
    }

    fn reset_draw_mode(&self) {
        self.record(SurfaceOp::ResetDrawMode);
    }

    fn show_warning(&self, message: &str) {
        self.record(SurfaceOp::ShowWarning(message.to_string()));
    }
}
