//! Geotracker Console Core
//!
//! Live state synchronization and map-overlay reconciliation engine for a
//! situational-awareness console.
//!
//! ## Architecture (7 Components)
//!
//! 1. TelemetryClient - request/response backend adapter
//! 2. StalenessClassifier - stale/live verdict per snapshot
//! 3. OverlayStateStore - marker and zone layer reconciliation
//! 4. TrailBuilder - bounded recent-position history paths
//! 5. CameraController - fly-to and follow behavior
//! 6. ZoneEditor - interactive zone drawing workflow
//! 7. PollingLoop - timer-driven orchestrator
//!
//! ## Design Principles
//!
//! - One owner per graphical handle: OverlayStateStore/TrailBuilder hold
//!   the only mapping from identity to on-screen primitive
//! - Pure planning, thin application: reconciliation computes operations,
//!   a [`map_surface::MapSurface`] implementation executes them
//! - All freshness from polling; a lost backend freezes the overlay,
//!   never crashes it

pub mod camera_controller;
pub mod error;
pub mod map_surface;
pub mod models;
pub mod overlay_store;
pub mod polling_loop;
pub mod staleness;
pub mod state;
pub mod telemetry_client;
pub mod trail_builder;
pub mod zone_editor;

pub use error::{Error, Result};
pub use state::{AppConfig, ConsoleState};
