//! ZoneEditor - Interactive Zone Drawing Workflow
//!
//! ## Responsibilities
//!
//! - Drive the draw -> annotate -> confirm/cancel state machine
//! - Capture drawn geometry and convert it to storage convention
//! - Submit confirmed drafts and trigger a zone layer refresh
//! - Delete zones on explicit user action
//!
//! States: `Idle -> Drawing -> Annotating -> (Saving | cancelled) -> Idle`.
//! A failed save keeps the editor in `Annotating` so the operator's work is
//! not lost; zone deletion is never optimistic.

use crate::error::{Error, Result};
use crate::map_surface::{LonLat, MapSurface};
use crate::models::{Zone, DEFAULT_ZONE_COLOR};
use crate::overlay_store::OverlayStateStore;
use crate::telemetry_client::TelemetrySource;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Editor workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    /// No drawing activity.
    Idle,
    /// Polygon draw mode active, waiting for the shape to close.
    Drawing,
    /// Shape captured; name and color editable, awaiting confirm/cancel.
    Annotating,
    /// Create request in flight.
    Saving,
}

/// An unsaved zone being created: name, color, and captured coordinates in
/// storage convention `(lat, lon)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneDraft {
    pub name: String,
    pub color: String,
    pub coords: Vec<(f64, f64)>,
}

/// ZoneEditor instance
pub struct ZoneEditor {
    source: Arc<dyn TelemetrySource>,
    surface: Arc<dyn MapSurface>,
    overlay: Arc<OverlayStateStore>,
    state: RwLock<EditorState>,
    draft: RwLock<Option<ZoneDraft>>,
}

impl ZoneEditor {
    pub fn new(
        source: Arc<dyn TelemetrySource>,
        surface: Arc<dyn MapSurface>,
        overlay: Arc<OverlayStateStore>,
    ) -> Self {
        Self {
            source,
            surface,
            overlay,
            state: RwLock::new(EditorState::Idle),
            draft: RwLock::new(None),
        }
    }

    pub async fn state(&self) -> EditorState {
        *self.state.read().await
    }

    pub async fn draft(&self) -> Option<ZoneDraft> {
        self.draft.read().await.clone()
    }

    /// Enter drawing mode, discarding any previous draft.
    pub async fn begin_drawing(&self) {
        *self.draft.write().await = None;
        self.surface.enable_polygon_draw();
        *self.state.write().await = EditorState::Drawing;
        tracing::info!("Zone drawing started");
    }

    /// The user closed a polygon on the map. Coordinates arrive in map
    /// convention `[lon, lat]` and are captured in storage convention.
    pub async fn complete_polygon(&self, ring: &[LonLat]) {
        let mut state = self.state.write().await;
        if *state != EditorState::Drawing {
            tracing::warn!(state = ?*state, "Polygon completed outside drawing mode, ignoring");
            return;
        }
        let coords: Vec<(f64, f64)> = ring.iter().map(|p| (p[1], p[0])).collect();
        *self.draft.write().await = Some(ZoneDraft {
            name: format!("Zone {}", Utc::now().format("%H:%M:%S")),
            color: DEFAULT_ZONE_COLOR.to_string(),
            coords,
        });
        *state = EditorState::Annotating;
        tracing::info!("Polygon captured, awaiting annotation");
    }

    /// Rename the draft. Ignored when no draft exists.
    pub async fn set_draft_name(&self, name: &str) {
        if let Some(draft) = self.draft.write().await.as_mut() {
            draft.name = name.to_string();
        }
    }

    /// Recolor the draft. Ignored when no draft exists.
    pub async fn set_draft_color(&self, color: &str) {
        if let Some(draft) = self.draft.write().await.as_mut() {
            draft.color = color.to_string();
        }
    }

    /// Submit the draft as a new polygon zone.
    ///
    /// On success the drawn shape is cleared, the editor returns to idle,
    /// and the zone layer is refreshed from the source. On failure the
    /// error is surfaced and the editor stays in `Annotating` for retry.
    pub async fn confirm(&self) -> Result<Zone> {
        let draft = {
            let mut state = self.state.write().await;
            if *state != EditorState::Annotating {
                self.surface.show_warning("Nothing to save");
                return Err(Error::Validation(format!(
                    "confirm invoked in {:?} state",
                    *state
                )));
            }
            let draft = self.draft.read().await.clone();
            let Some(draft) = draft.filter(|d| !d.coords.is_empty()) else {
                self.surface.show_warning("Draw a zone on the map before saving");
                return Err(Error::Validation("no captured coordinates".to_string()));
            };
            *state = EditorState::Saving;
            draft
        };

        let zone = draft_to_zone(&draft)?;
        match self.source.create_zone(&zone).await {
            Ok(created) => {
                self.surface.clear_drawn_shape();
                self.surface.reset_draw_mode();
                *self.draft.write().await = None;
                *self.state.write().await = EditorState::Idle;
                tracing::info!(zone_id = ?created.id, name = %created.name, "Zone created");

                if let Err(e) = self.overlay.refresh_zones(self.source.as_ref()).await {
                    tracing::warn!(error = %e, "Zone layer refresh after create failed");
                }
                Ok(created)
            }
            Err(e) => {
                tracing::error!(error = %e, "Zone create failed");
                self.surface
                    .show_warning(&format!("Failed to save zone: {}", e));
                *self.state.write().await = EditorState::Annotating;
                Err(e)
            }
        }
    }

    /// Discard the draft and return to the neutral selection mode.
    pub async fn cancel(&self) {
        *self.draft.write().await = None;
        self.surface.clear_drawn_shape();
        self.surface.reset_draw_mode();
        *self.state.write().await = EditorState::Idle;
        tracing::info!("Zone drawing cancelled");
    }

    /// Delete a zone by id and refresh the layer. On failure the zone list
    /// is left unchanged (no optimistic removal).
    pub async fn delete_zone(&self, zone_id: i64) -> Result<()> {
        match self.source.delete_zone(zone_id).await {
            Ok(()) => {
                tracing::info!(zone_id = zone_id, "Zone deleted");
                if let Err(e) = self.overlay.refresh_zones(self.source.as_ref()).await {
                    tracing::warn!(error = %e, "Zone layer refresh after delete failed");
                }
                Ok(())
            }
            Err(e) => {
                tracing::error!(zone_id = zone_id, error = %e, "Zone delete failed");
                self.surface
                    .show_warning(&format!("Failed to delete zone: {}", e));
                Err(e)
            }
        }
    }
}

fn draft_to_zone(draft: &ZoneDraft) -> Result<Zone> {
    let pairs: Vec<[f64; 2]> = draft.coords.iter().map(|&(lat, lon)| [lat, lon]).collect();
    Ok(Zone {
        id: None,
        name: draft.name.clone(),
        color: draft.color.clone(),
        enabled: true,
        min_lat: None,
        min_lon: None,
        max_lat: None,
        max_lon: None,
        is_polygon: true,
        polygon_coords: Some(serde_json::to_string(&pairs)?),
    })
}
