//! PollingLoop - Timer-Driven Orchestrator
//!
//! ## Responsibilities
//!
//! - Tick at a fixed cadence for the lifetime of the view
//! - Fetch snapshots and feed the overlay, trail, and camera components
//! - Publish each tick's snapshot list to external observers
//!
//! Ticks are spawned, not awaited by the timer: a tick slower than the
//! period does not delay the next firing, so overlapping in-flight work is
//! permitted (the trail builder guards against reordering). A failed object
//! fetch is logged and swallowed; the previous overlay stays on screen
//! until the next successful tick. Teardown flips the running flag; ticks
//! already in flight check it again before mutating anything, so results
//! arriving after teardown are discarded.

use crate::camera_controller::CameraController;
use crate::models::{ObjectSnapshot, SelectionState};
use crate::overlay_store::OverlayStateStore;
use crate::telemetry_client::TelemetrySource;
use crate::trail_builder::TrailBuilder;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::interval;

/// Poll cadence.
pub const POLL_INTERVAL_MS: u64 = 1000;

type SnapshotObserver = Box<dyn Fn(&[ObjectSnapshot]) + Send + Sync>;

/// Single-slot holder for the "latest" snapshot observer.
///
/// The slot is dereferenced at the moment a tick publishes, never captured
/// by a long-lived task, so replacing the observer takes effect on the very
/// next tick.
#[derive(Default)]
pub struct ObserverCell {
    slot: std::sync::RwLock<Option<SnapshotObserver>>,
}

impl ObserverCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace the observer.
    pub fn set(&self, observer: impl Fn(&[ObjectSnapshot]) + Send + Sync + 'static) {
        *self.slot.write().unwrap() = Some(Box::new(observer));
    }

    /// Remove the observer.
    pub fn clear(&self) {
        *self.slot.write().unwrap() = None;
    }

    fn notify(&self, snapshots: &[ObjectSnapshot]) {
        if let Some(observer) = self.slot.read().unwrap().as_ref() {
            observer(snapshots);
        }
    }
}

/// PollingLoop instance
pub struct PollingLoop {
    source: Arc<dyn TelemetrySource>,
    overlay: Arc<OverlayStateStore>,
    trails: Arc<TrailBuilder>,
    camera: Arc<CameraController>,
    selection: Arc<RwLock<SelectionState>>,
    observers: Arc<ObserverCell>,
    period: Duration,
    running: Arc<RwLock<bool>>,
}

impl PollingLoop {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: Arc<dyn TelemetrySource>,
        overlay: Arc<OverlayStateStore>,
        trails: Arc<TrailBuilder>,
        camera: Arc<CameraController>,
        selection: Arc<RwLock<SelectionState>>,
        observers: Arc<ObserverCell>,
        period: Duration,
    ) -> Self {
        Self {
            source,
            overlay,
            trails,
            camera,
            selection,
            observers,
            period,
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// Load the zone layer and start the polling timer.
    pub async fn start(&self) {
        {
            let mut running = self.running.write().await;
            if *running {
                tracing::warn!("Polling already running");
                return;
            }
            *running = true;
        }

        tracing::info!(period_ms = self.period.as_millis() as u64, "Starting polling loop");

        // Zones load once here and again only on explicit refresh triggers,
        // independent of the per-second object cadence.
        if let Err(e) = self.overlay.refresh_zones(self.source.as_ref()).await {
            tracing::warn!(error = %e, "Initial zone load failed");
        }

        let source = self.source.clone();
        let overlay = self.overlay.clone();
        let trails = self.trails.clone();
        let camera = self.camera.clone();
        let selection = self.selection.clone();
        let observers = self.observers.clone();
        let running = self.running.clone();
        let period = self.period;

        tokio::spawn(async move {
            let mut ticker = interval(period);
            loop {
                ticker.tick().await;

                if !*running.read().await {
                    break;
                }

                // Spawned so a slow tick never delays the next firing.
                tokio::spawn(run_tick(
                    source.clone(),
                    overlay.clone(),
                    trails.clone(),
                    camera.clone(),
                    selection.clone(),
                    observers.clone(),
                    running.clone(),
                ));
            }

            tracing::info!("Polling loop stopped");
        });
    }

    /// Stop the timer. In-flight fetches complete but their results are
    /// discarded by the liveness check inside the tick.
    pub async fn stop(&self) {
        let mut running = self.running.write().await;
        *running = false;
        tracing::info!("Stopping polling loop");
    }
}

/// One poll attempt: fetch, reconcile, trails, follow camera, publish.
async fn run_tick(
    source: Arc<dyn TelemetrySource>,
    overlay: Arc<OverlayStateStore>,
    trails: Arc<TrailBuilder>,
    camera: Arc<CameraController>,
    selection: Arc<RwLock<SelectionState>>,
    observers: Arc<ObserverCell>,
    running: Arc<RwLock<bool>>,
) {
    let snapshots = match source.fetch_objects().await {
        Ok(snapshots) => snapshots,
        Err(e) => {
            // Stale overlay is retained; next tick retries, no backoff.
            tracing::warn!(error = %e, "Object fetch failed, keeping last overlay");
            return;
        }
    };

    if !*running.read().await {
        tracing::debug!("Tick resolved after teardown, discarding");
        return;
    }

    overlay.reconcile(&snapshots, Utc::now()).await;
    trails.refresh(&snapshots).await;

    // Re-read the selection every tick; it is owned elsewhere and may have
    // changed while the fetches were in flight.
    let sel = selection.read().await.clone();
    if sel.follow {
        if let Some(object_id) = sel.selected_object.as_deref() {
            if let Some(snap) = snapshots.iter().find(|s| s.id == object_id) {
                camera.follow(snap.last_lat, snap.last_lon);
            }
        }
    }
    trails
        .refresh_selected_history(sel.selected_object.as_deref())
        .await;

    observers.notify(&snapshots);
}
