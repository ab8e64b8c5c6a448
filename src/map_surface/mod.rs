//! MapSurface - Rendering Surface Abstraction
//!
//! ## Responsibilities
//!
//! - Define the seam between reconciliation logic and the actual map
//! - Carry all coordinates in map convention `[lon, lat]`
//! - Provide a logging implementation for headless runs
//!
//! The stores compute what must change; implementations of [`MapSurface`]
//! are the thin execution layer that applies those changes. The axis swap
//! from storage `(lat, lon)` to map `[lon, lat]` happens exactly once, on
//! the caller's side of this boundary.

/// Map-convention coordinate: `[lon, lat]`.
pub type LonLat = [f64; 2];

/// One renderable zone shape. `zone_id` ties a clicked shape back to the
/// originating [`crate::models::Zone`] for selection callbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneFeature {
    pub zone_id: Option<i64>,
    pub name: String,
    pub color: String,
    /// Closed ring in map convention (first vertex repeated last for
    /// bounding boxes; drawn polygons arrive already closed).
    pub ring: Vec<LonLat>,
}

/// Asymmetric camera padding, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraPadding {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

/// A one-shot animated camera transition.
#[derive(Debug, Clone, PartialEq)]
pub struct FlyTo {
    pub center: LonLat,
    pub zoom: f64,
    pub duration_ms: u64,
    pub padding: Option<CameraPadding>,
}

/// The rendering surface the console draws on.
///
/// Implementations own the graphical primitives keyed by the ids passed
/// here and mutate them in place. All methods are fire-and-forget from the
/// caller's perspective; a new `fly_to` issued before a prior animation
/// completes redirects it (last writer wins).
pub trait MapSurface: Send + Sync {
    /// Create a marker. Callers guarantee at most one call per id.
    fn add_marker(&self, object_id: &str, position: LonLat, rotation_deg: f64, color: &str);

    /// Move and rotate an existing marker in place.
    fn move_marker(&self, object_id: &str, position: LonLat, rotation_deg: f64);

    /// Recolor an existing marker (staleness flagging).
    fn set_marker_color(&self, object_id: &str, color: &str);

    /// Replace a trail path wholesale. Creates the trail on first call.
    fn set_trail(&self, trail_id: &str, path: Vec<LonLat>, color: &str);

    /// Remove a trail path.
    fn clear_trail(&self, trail_id: &str);

    /// Replace the zone layer wholesale.
    fn set_zone_features(&self, features: Vec<ZoneFeature>);

    /// Animated camera transition.
    fn fly_to(&self, fly: FlyTo);

    /// Instant recentre without changing zoom (follow-mode).
    fn pan_to(&self, center: LonLat);

    /// Switch the surface into polygon-drawing interaction mode.
    fn enable_polygon_draw(&self);

    /// Discard any user-drawn shape still on the surface.
    fn clear_drawn_shape(&self);

    /// Return to the neutral selection interaction mode.
    fn reset_draw_mode(&self);

    /// Surface an inline warning to the operator.
    fn show_warning(&self, message: &str);
}

mod log_surface;
pub use log_surface::LogSurface;

#[cfg(test)]
pub(crate) mod recording;
