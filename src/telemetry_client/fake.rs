//! In-memory telemetry source for unit tests.

use super::TelemetrySource;
use crate::error::{Error, Result};
use crate::models::{AlertEvent, HistoryPoint, ObjectSnapshot, Zone};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub(crate) struct FakeTelemetrySource {
    pub objects: Mutex<Vec<ObjectSnapshot>>,
    pub history: Mutex<HashMap<String, Vec<HistoryPoint>>>,
    pub zones: Mutex<Vec<Zone>>,
    pub alerts: Mutex<Vec<AlertEvent>>,
    pub acked: Mutex<Vec<i64>>,
    /// Ids passed to `fetch_history`, in call order.
    pub history_calls: Mutex<Vec<String>>,
    pub fail_objects: AtomicBool,
    pub fail_create_zone: AtomicBool,
    pub fail_delete_zone: AtomicBool,
    next_zone_id: AtomicI64,
}

impl FakeTelemetrySource {
    pub fn new() -> Self {
        Self {
            next_zone_id: AtomicI64::new(1),
            ..Self::default()
        }
    }

    pub fn set_objects(&self, objects: Vec<ObjectSnapshot>) {
        *self.objects.lock().unwrap() = objects;
    }

    pub fn set_history(&self, object_id: &str, points: Vec<HistoryPoint>) {
        self.history
            .lock()
            .unwrap()
            .insert(object_id.to_string(), points);
    }

    pub fn set_zones(&self, zones: Vec<Zone>) {
        *self.zones.lock().unwrap() = zones;
    }

    pub fn history_call_count(&self, object_id: &str) -> usize {
        self.history_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|id| id.as_str() == object_id)
            .count()
    }
}

#[async_trait::async_trait]
impl TelemetrySource for FakeTelemetrySource {
    async fn fetch_objects(&self) -> Result<Vec<ObjectSnapshot>> {
        if self.fail_objects.load(Ordering::SeqCst) {
            return Err(Error::Api("objects fetch returned 500".to_string()));
        }
        Ok(self.objects.lock().unwrap().clone())
    }

    async fn fetch_history(&self, object_id: &str, limit: usize) -> Result<Vec<HistoryPoint>> {
        self.history_calls
            .lock()
            .unwrap()
            .push(object_id.to_string());
        let points = self
            .history
            .lock()
            .unwrap()
            .get(object_id)
            .cloned()
            .unwrap_or_default();
        Ok(points.into_iter().take(limit).collect())
    }

    async fn fetch_zones(&self) -> Result<Vec<Zone>> {
        Ok(self.zones.lock().unwrap().clone())
    }

    async fn create_zone(&self, zone: &Zone) -> Result<Zone> {
        if self.fail_create_zone.load(Ordering::SeqCst) {
            return Err(Error::Api("zone create returned 500".to_string()));
        }
        let mut created = zone.clone();
        created.id = Some(self.next_zone_id.fetch_add(1, Ordering::SeqCst));
        self.zones.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn delete_zone(&self, zone_id: i64) -> Result<()> {
        if self.fail_delete_zone.load(Ordering::SeqCst) {
            return Err(Error::Api("zone delete returned 500".to_string()));
        }
        self.zones.lock().unwrap().retain(|z| z.id != Some(zone_id));
        Ok(())
    }

    async fn fetch_alerts(&self, limit: usize) -> Result<Vec<AlertEvent>> {
        Ok(self
            .alerts
            .lock()
            .unwrap()
            .iter()
            .take(limit)
            .cloned()
            .collect())
    }

    async fn ack_alert(&self, alert_id: i64) -> Result<()> {
        self.acked.lock().unwrap().push(alert_id);
        Ok(())
    }
}
