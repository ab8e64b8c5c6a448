//! Application state
//!
//! Configuration and the wired component graph for one console view.

use crate::camera_controller::CameraController;
use crate::error::{Error, Result};
use crate::map_surface::MapSurface;
use crate::models::{AlertEvent, SelectionState};
use crate::overlay_store::OverlayStateStore;
use crate::polling_loop::{ObserverCell, PollingLoop, POLL_INTERVAL_MS};
use crate::telemetry_client::TelemetrySource;
use crate::trail_builder::{TrailBuilder, EXTENDED_HISTORY_LIMIT, TRAIL_LIMIT};
use crate::zone_editor::ZoneEditor;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Telemetry backend base URL
    pub api_base_url: String,
    /// Poll cadence in milliseconds
    pub poll_interval_ms: u64,
    /// History points per object trail
    pub trail_limit: usize,
    /// History points for the selected object's extended path
    pub extended_history_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            poll_interval_ms: POLL_INTERVAL_MS,
            trail_limit: TRAIL_LIMIT,
            extended_history_limit: EXTENDED_HISTORY_LIMIT,
        }
    }
}

impl AppConfig {
    /// Build a config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            api_base_url: std::env::var("GEOTRACKER_API_URL")
                .unwrap_or(defaults.api_base_url),
            poll_interval_ms: parse_env("GEOTRACKER_POLL_INTERVAL_MS", defaults.poll_interval_ms)?,
            trail_limit: parse_env("GEOTRACKER_TRAIL_LIMIT", defaults.trail_limit)?,
            extended_history_limit: parse_env(
                "GEOTRACKER_EXTENDED_HISTORY_LIMIT",
                defaults.extended_history_limit,
            )?,
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| Error::Config(format!("{} has invalid value '{}'", key, raw))),
        Err(_) => Ok(default),
    }
}

/// One console view's component graph.
///
/// Explicitly constructed and explicitly torn down by the surrounding
/// application: construction binds the rendering surface, [`shutdown`]
/// stops the timer and invalidates the liveness flag so late async results
/// are discarded.
///
/// [`shutdown`]: ConsoleState::shutdown
pub struct ConsoleState {
    pub config: AppConfig,
    pub source: Arc<dyn TelemetrySource>,
    pub surface: Arc<dyn MapSurface>,
    pub overlay: Arc<OverlayStateStore>,
    pub trails: Arc<TrailBuilder>,
    pub camera: Arc<CameraController>,
    pub editor: Arc<ZoneEditor>,
    pub poller: Arc<PollingLoop>,
    pub selection: Arc<RwLock<SelectionState>>,
    pub observers: Arc<ObserverCell>,
}

impl ConsoleState {
    pub fn new(
        config: AppConfig,
        source: Arc<dyn TelemetrySource>,
        surface: Arc<dyn MapSurface>,
    ) -> Self {
        let overlay = Arc::new(OverlayStateStore::new(surface.clone()));
        let trails = Arc::new(TrailBuilder::with_limits(
            source.clone(),
            surface.clone(),
            config.trail_limit,
            config.extended_history_limit,
        ));
        let camera = Arc::new(CameraController::new(surface.clone()));
        let editor = Arc::new(ZoneEditor::new(
            source.clone(),
            surface.clone(),
            overlay.clone(),
        ));
        let selection = Arc::new(RwLock::new(SelectionState::default()));
        let observers = Arc::new(ObserverCell::new());
        let poller = Arc::new(PollingLoop::new(
            source.clone(),
            overlay.clone(),
            trails.clone(),
            camera.clone(),
            selection.clone(),
            observers.clone(),
            Duration::from_millis(config.poll_interval_ms),
        ));

        Self {
            config,
            source,
            surface,
            overlay,
            trails,
            camera,
            editor,
            poller,
            selection,
            observers,
        }
    }

    /// Load zones and start polling.
    pub async fn start(&self) {
        self.poller.start().await;
    }

    /// Stop the polling timer. Outstanding fetches finish but their results
    /// are discarded.
    pub async fn shutdown(&self) {
        self.poller.stop().await;
    }

    /// Select an object (or clear the selection with `None`).
    ///
    /// Changing the selection deactivates follow-mode; a user fly-to
    /// overrides any running follow transition. The camera flies to the
    /// object's last known marker position when one exists.
    pub async fn select_object(&self, object_id: Option<&str>) {
        {
            let mut sel = self.selection.write().await;
            sel.selected_object = object_id.map(str::to_string);
            sel.selected_zone = None;
            sel.follow = false;
        }
        if let Some(object_id) = object_id {
            if let Some((lat, lon)) = self.overlay.marker_position(object_id).await {
                self.camera.fly_to_object(lat, lon);
            }
        }
    }

    /// Select a zone and fly to its extent. An id with no matching entry in
    /// the last-loaded zone list is a no-op.
    pub async fn select_zone(&self, zone_id: i64) {
        let Some(zone) = self.overlay.zone_by_id(zone_id).await else {
            tracing::debug!(zone_id = zone_id, "Zone selection ignored, id not in loaded list");
            return;
        };
        {
            let mut sel = self.selection.write().await;
            sel.selected_zone = Some(zone_id);
            sel.selected_object = None;
            sel.follow = false;
        }
        self.camera.fly_to_zone(&zone);
    }

    /// Toggle follow-mode for the currently selected object.
    pub async fn set_follow(&self, follow: bool) {
        let mut sel = self.selection.write().await;
        if follow && sel.selected_object.is_none() {
            tracing::warn!("Follow requested without a selected object, ignoring");
            return;
        }
        sel.follow = follow;
    }

    /// Re-fetch the zone layer outside the polling cadence.
    pub async fn refresh_zones(&self) -> Result<()> {
        self.overlay.refresh_zones(self.source.as_ref()).await
    }

    /// Recent alerts, passed through for the alert panel.
    pub async fn recent_alerts(&self, limit: usize) -> Result<Vec<AlertEvent>> {
        self.source.fetch_alerts(limit).await
    }

    /// Acknowledge one alert, passed through for the alert panel.
    pub async fn acknowledge_alert(&self, alert_id: i64) -> Result<()> {
        self.source.ack_alert(alert_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map_surface::recording::{RecordingSurface, SurfaceOp};
    use crate::models::{ObjectSnapshot, Zone, DEFAULT_ZONE_COLOR};
    use crate::telemetry_client::fake::FakeTelemetrySource;
    use chrono::Utc;

    fn console() -> (Arc<FakeTelemetrySource>, Arc<RecordingSurface>, ConsoleState) {
        let source = Arc::new(FakeTelemetrySource::new());
        let surface = Arc::new(RecordingSurface::new());
        let state = ConsoleState::new(AppConfig::default(), source.clone(), surface.clone());
        (source, surface, state)
    }

    fn snap(id: &str, lat: f64, lon: f64) -> ObjectSnapshot {
        ObjectSnapshot {
            id: id.to_string(),
            last_seen: Utc::now(),
            last_lat: lat,
            last_lon: lon,
            last_confidence: 0.9,
            speed_mps: None,
            heading_deg: None,
            battery_pct: None,
        }
    }

    #[tokio::test]
    async fn test_select_object_flies_to_marker() {
        let (_source, surface, state) = console();
        state
            .overlay
            .reconcile(&[snap("drone-1", 63.0, -68.0)], Utc::now())
            .await;

        state.select_object(Some("drone-1")).await;
        let flew = surface.ops().iter().any(|op| {
            matches!(op, SurfaceOp::FlyTo(fly) if fly.center == [-68.0, 63.0])
        });
        assert!(flew);
        assert_eq!(
            state.selection.read().await.selected_object.as_deref(),
            Some("drone-1")
        );
    }

    #[tokio::test]
    async fn test_selection_change_deactivates_follow() {
        let (_source, _surface, state) = console();
        state
            .overlay
            .reconcile(&[snap("drone-1", 63.0, -68.0)], Utc::now())
            .await;
        state.select_object(Some("drone-1")).await;
        state.set_follow(true).await;
        assert!(state.selection.read().await.follow);

        state.select_object(None).await;
        assert!(!state.selection.read().await.follow);
    }

    #[tokio::test]
    async fn test_follow_without_selection_ignored() {
        let (_source, _surface, state) = console();
        state.set_follow(true).await;
        assert!(!state.selection.read().await.follow);
    }

    #[tokio::test]
    async fn test_select_unknown_zone_is_noop() {
        let (_source, surface, state) = console();
        state.select_zone(5).await;
        assert!(surface.ops().is_empty());
        assert!(state.selection.read().await.selected_zone.is_none());
    }

    #[tokio::test]
    async fn test_select_loaded_zone_flies_to_extent() {
        let (_source, surface, state) = console();
        state
            .overlay
            .set_zones(vec![Zone {
                id: Some(5),
                name: "harbor".to_string(),
                color: DEFAULT_ZONE_COLOR.to_string(),
                enabled: true,
                min_lat: Some(1.0),
                min_lon: Some(2.0),
                max_lat: Some(3.0),
                max_lon: Some(4.0),
                is_polygon: false,
                polygon_coords: None,
            }])
            .await;

        state.select_zone(5).await;
        assert_eq!(state.selection.read().await.selected_zone, Some(5));
        assert!(surface
            .ops()
            .iter()
            .any(|op| matches!(op, SurfaceOp::FlyTo(_))));
    }

    #[tokio::test]
    async fn test_alert_passthrough() {
        let (source, _surface, state) = console();
        state.acknowledge_alert(7).await.unwrap();
        assert_eq!(source.acked.lock().unwrap().as_slice(), [7]);
        assert!(state.recent_alerts(10).await.unwrap().is_empty());
    }
}
