//! Domain and wire types shared across components
//!
//! All types mirror the backend's JSON contract. Timestamps from the
//! backend are timezone-naive by convention and are interpreted as UTC
//! (see [`lenient_utc`]).

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current state of one tracked object, superseded wholesale each poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    pub id: String,
    #[serde(with = "lenient_utc")]
    pub last_seen: DateTime<Utc>,
    pub last_lat: f64,
    pub last_lon: f64,
    pub last_confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_mps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_pct: Option<f64>,
}

/// One historical position sample. Source order is not guaranteed;
/// consumers must sort ascending by `ts` before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub id: i64,
    pub object_id: String,
    #[serde(with = "lenient_utc")]
    pub ts: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_mps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_pct: Option<f64>,
}

/// A named geofence, either a bounding box or a polygon.
///
/// Exactly one shape representation is populated: `is_polygon` must agree
/// with which fields are present. Polygon coordinates are stored as an
/// opaque JSON payload of `[lat, lon]` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Absent for unsaved drafts; assigned by the backend on create.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default = "default_zone_color")]
    pub color: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_lon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_lon: Option<f64>,
    #[serde(default)]
    pub is_polygon: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polygon_coords: Option<String>,
}

/// Default display color for zones (cyan, matching the zone layer).
pub const DEFAULT_ZONE_COLOR: &str = "#0891b2";

fn default_zone_color() -> String {
    DEFAULT_ZONE_COLOR.to_string()
}

fn default_true() -> bool {
    true
}

impl Zone {
    /// Parse the polygon payload into storage-convention `(lat, lon)` pairs.
    ///
    /// Errors if the zone is not polygon-typed, the payload is missing, or
    /// the JSON is malformed.
    pub fn polygon_vertices(&self) -> crate::Result<Vec<(f64, f64)>> {
        if !self.is_polygon {
            return Err(crate::Error::Parse(format!(
                "zone '{}' is not polygon-typed",
                self.name
            )));
        }
        let payload = self.polygon_coords.as_deref().ok_or_else(|| {
            crate::Error::Parse(format!("zone '{}' has no polygon payload", self.name))
        })?;
        let pairs: Vec<[f64; 2]> = serde_json::from_str(payload).map_err(|e| {
            crate::Error::Parse(format!("zone '{}' polygon payload: {}", self.name, e))
        })?;
        Ok(pairs.into_iter().map(|p| (p[0], p[1])).collect())
    }
}

/// Alert types raised by the backend's zone evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    Enter,
    Exit,
    LowConfidence,
    Stale,
}

/// Alert event from `GET /alerts/`. Consumed by the alert-panel
/// collaborator; the core only passes these through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub id: i64,
    #[serde(with = "lenient_utc")]
    pub ts: DateTime<Utc>,
    pub object_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<i64>,
    pub alert_type: AlertType,
    pub message: String,
    pub ack: bool,
}

/// Which object/zone is selected and whether follow-mode is active.
///
/// Canonically owned by the surrounding application; the core holds a
/// shared handle and re-reads it every tick rather than caching it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    pub selected_object: Option<String>,
    pub selected_zone: Option<i64>,
    pub follow: bool,
}

/// Display class inferred from an object id's namespace substring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectClass {
    Drone,
    Vehicle,
    Other,
}

impl ObjectClass {
    /// Infer the class from the externally namespaced id.
    pub fn of(object_id: &str) -> Self {
        if object_id.contains("drone") {
            Self::Drone
        } else if object_id.contains("vehicle") {
            Self::Vehicle
        } else {
            Self::Other
        }
    }

    /// Marker/trail color for this class.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Drone => "#fbbf24",
            Self::Vehicle => "#34d399",
            Self::Other => "#fca5a5",
        }
    }
}

/// Serde adapter for backend timestamps.
///
/// Accepts RFC 3339 with an offset, or a naive ISO 8601 timestamp which is
/// normalized by assuming UTC.
pub mod lenient_utc {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(de)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    /// Parse a backend timestamp, assuming UTC when no offset is present.
    pub fn parse(raw: &str) -> crate::Result<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| crate::Error::Parse(format!("timestamp '{}': {}", raw, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naive_timestamp_assumed_utc() {
        let dt = lenient_utc::parse("2026-08-30T12:00:00.500000").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-08-30T12:00:00.500+00:00");
    }

    #[test]
    fn test_offset_timestamp_converted_to_utc() {
        let dt = lenient_utc::parse("2026-08-30T14:00:00+02:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-08-30T12:00:00+00:00");
    }

    #[test]
    fn test_garbage_timestamp_rejected() {
        assert!(lenient_utc::parse("yesterday").is_err());
    }

    #[test]
    fn test_object_class_inference() {
        assert_eq!(ObjectClass::of("drone-7"), ObjectClass::Drone);
        assert_eq!(ObjectClass::of("vehicle-2"), ObjectClass::Vehicle);
        assert_eq!(ObjectClass::of("beacon-1"), ObjectClass::Other);
    }

    #[test]
    fn test_polygon_vertices_parse() {
        let zone = Zone {
            id: Some(1),
            name: "perimeter".to_string(),
            color: DEFAULT_ZONE_COLOR.to_string(),
            enabled: true,
            min_lat: None,
            min_lon: None,
            max_lat: None,
            max_lon: None,
            is_polygon: true,
            polygon_coords: Some("[[10.0,20.0],[11.0,21.0],[12.0,22.0]]".to_string()),
        };
        let verts = zone.polygon_vertices().unwrap();
        assert_eq!(verts, vec![(10.0, 20.0), (11.0, 21.0), (12.0, 22.0)]);
    }

    #[test]
    fn test_polygon_vertices_malformed_payload() {
        let zone = Zone {
            id: Some(2),
            name: "broken".to_string(),
            color: DEFAULT_ZONE_COLOR.to_string(),
            enabled: true,
            min_lat: None,
            min_lon: None,
            max_lat: None,
            max_lon: None,
            is_polygon: true,
            polygon_coords: Some("not json".to_string()),
        };
        assert!(zone.polygon_vertices().is_err());
    }

    #[test]
    fn test_snapshot_deserializes_with_naive_timestamp() {
        let json = r#"{
            "id": "drone-7",
            "last_seen": "2026-08-30T12:00:00",
            "last_lat": 63.0,
            "last_lon": -68.0,
            "last_confidence": 0.9,
            "heading_deg": 90.0
        }"#;
        let snap: ObjectSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.id, "drone-7");
        assert_eq!(snap.heading_deg, Some(90.0));
        assert!(snap.battery_pct.is_none());
    }
}
