//! OverlayStateStore - Marker and Zone Layer Reconciliation
//!
//! ## Responsibilities
//!
//! - Own exactly one marker handle per live object id
//! - Reconcile incoming snapshots into create/update operations
//! - Replace the zone layer wholesale and resolve clicks back to zones
//!
//! Reconciliation is split into a pure planning step
//! ([`plan_markers`]: snapshot list in, required operations out) and a thin
//! application step that mutates the owned state and the surface. The pure
//! step is what makes idempotence testable without a real map.
//!
//! Ids that stop appearing in polls keep their last marker; nothing is ever
//! removed. An eviction policy is a known gap in the original behavior,
//! replicated here deliberately.

use crate::map_surface::{MapSurface, ZoneFeature};
use crate::models::{ObjectClass, ObjectSnapshot, Zone};
use crate::staleness;
use crate::telemetry_client::TelemetrySource;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Marker color when the staleness classifier flags an object.
pub const STALE_COLOR: &str = "#6b7280";

/// Last state applied to a marker handle, kept in storage convention.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerState {
    pub lat: f64,
    pub lon: f64,
    pub rotation_deg: f64,
    pub color: String,
}

/// One required change to the marker layer.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerOp {
    Create {
        object_id: String,
        lat: f64,
        lon: f64,
        rotation_deg: f64,
        color: String,
    },
    Move {
        object_id: String,
        lat: f64,
        lon: f64,
        rotation_deg: f64,
    },
    Recolor {
        object_id: String,
        color: String,
    },
}

/// Compute the operations needed to bring the marker layer in line with a
/// snapshot list. Pure: feeding the resulting state the same list again
/// yields no operations.
pub fn plan_markers(
    existing: &HashMap<String, MarkerState>,
    snapshots: &[ObjectSnapshot],
    now: DateTime<Utc>,
) -> Vec<MarkerOp> {
    let mut ops = Vec::new();
    for snap in snapshots {
        let rotation_deg = snap.heading_deg.unwrap_or(0.0);
        let current = existing.get(&snap.id);

        let color_after_move = match current {
            None => {
                let color = ObjectClass::of(&snap.id).color().to_string();
                ops.push(MarkerOp::Create {
                    object_id: snap.id.clone(),
                    lat: snap.last_lat,
                    lon: snap.last_lon,
                    rotation_deg,
                    color: color.clone(),
                });
                color
            }
            Some(state) => {
                if state.lat != snap.last_lat
                    || state.lon != snap.last_lon
                    || state.rotation_deg != rotation_deg
                {
                    ops.push(MarkerOp::Move {
                        object_id: snap.id.clone(),
                        lat: snap.last_lat,
                        lon: snap.last_lon,
                        rotation_deg,
                    });
                }
                state.color.clone()
            }
        };

        // Recompute display color independently of the position update.
        let target_color = if staleness::is_stale(snap, now) {
            STALE_COLOR
        } else {
            ObjectClass::of(&snap.id).color()
        };
        if color_after_move != target_color {
            ops.push(MarkerOp::Recolor {
                object_id: snap.id.clone(),
                color: target_color.to_string(),
            });
        }
    }
    ops
}

/// Build the renderable zone layer, axis-swapping polygon vertices and
/// expanding bounding boxes into closed rings. A zone with malformed or
/// missing geometry is skipped; the rest still render.
pub fn zone_features(zones: &[Zone]) -> Vec<ZoneFeature> {
    let mut features = Vec::with_capacity(zones.len());
    for zone in zones {
        let ring = if zone.is_polygon {
            match zone.polygon_vertices() {
                Ok(verts) => verts.into_iter().map(|(lat, lon)| [lon, lat]).collect(),
                Err(e) => {
                    tracing::warn!(zone = %zone.name, error = %e, "Skipping zone with bad geometry");
                    continue;
                }
            }
        } else {
            match (zone.min_lat, zone.min_lon, zone.max_lat, zone.max_lon) {
                (Some(min_lat), Some(min_lon), Some(max_lat), Some(max_lon)) => vec![
                    [min_lon, min_lat],
                    [max_lon, min_lat],
                    [max_lon, max_lat],
                    [min_lon, max_lat],
                    [min_lon, min_lat],
                ],
                _ => {
                    tracing::warn!(zone = %zone.name, "Skipping bbox zone with missing bounds");
                    continue;
                }
            }
        };
        features.push(ZoneFeature {
            zone_id: zone.id,
            name: zone.name.clone(),
            color: zone.color.clone(),
            ring,
        });
    }
    features
}

/// OverlayStateStore instance
pub struct OverlayStateStore {
    surface: Arc<dyn MapSurface>,
    markers: RwLock<HashMap<String, MarkerState>>,
    zones: RwLock<Vec<Zone>>,
}

impl OverlayStateStore {
    /// Create a store bound to a rendering surface.
    pub fn new(surface: Arc<dyn MapSurface>) -> Self {
        Self {
            surface,
            markers: RwLock::new(HashMap::new()),
            zones: RwLock::new(Vec::new()),
        }
    }

    /// Reconcile the marker layer against a snapshot list.
    ///
    /// Idempotent: the same list twice produces the same set of handles
    /// with the same positions and rotations, and no duplicates.
    pub async fn reconcile(&self, snapshots: &[ObjectSnapshot], now: DateTime<Utc>) {
        let mut markers = self.markers.write().await;
        let ops = plan_markers(&markers, snapshots, now);
        for op in ops {
            match op {
                MarkerOp::Create {
                    object_id,
                    lat,
                    lon,
                    rotation_deg,
                    color,
                } => {
                    self.surface
                        .add_marker(&object_id, [lon, lat], rotation_deg, &color);
                    markers.insert(
                        object_id,
                        MarkerState {
                            lat,
                            lon,
                            rotation_deg,
                            color,
                        },
                    );
                }
                MarkerOp::Move {
                    object_id,
                    lat,
                    lon,
                    rotation_deg,
                } => {
                    self.surface.move_marker(&object_id, [lon, lat], rotation_deg);
                    if let Some(state) = markers.get_mut(&object_id) {
                        state.lat = lat;
                        state.lon = lon;
                        state.rotation_deg = rotation_deg;
                    }
                }
                MarkerOp::Recolor { object_id, color } => {
                    self.surface.set_marker_color(&object_id, &color);
                    if let Some(state) = markers.get_mut(&object_id) {
                        state.color = color;
                    }
                }
            }
        }
    }

    /// Replace the zone layer wholesale and remember the list for id lookup.
    pub async fn set_zones(&self, zones: Vec<Zone>) {
        self.surface.set_zone_features(zone_features(&zones));
        *self.zones.write().await = zones;
    }

    /// Re-fetch the zone list from the source and replace the layer.
    pub async fn refresh_zones(&self, source: &dyn TelemetrySource) -> crate::Result<()> {
        let zones = source.fetch_zones().await?;
        tracing::info!(zones = zones.len(), "Zone layer refreshed from source");
        self.set_zones(zones).await;
        Ok(())
    }

    /// Resolve a zone id (e.g. from a clicked shape) back to its zone.
    pub async fn zone_by_id(&self, zone_id: i64) -> Option<Zone> {
        self.zones
            .read()
            .await
            .iter()
            .find(|z| z.id == Some(zone_id))
            .cloned()
    }

    /// Last applied position for an object's marker, storage convention.
    pub async fn marker_position(&self, object_id: &str) -> Option<(f64, f64)> {
        self.markers
            .read()
            .await
            .get(object_id)
            .map(|m| (m.lat, m.lon))
    }

    /// Number of marker handles currently owned.
    pub async fn marker_count(&self) -> usize {
        self.markers.read().await.len()
    }
}
