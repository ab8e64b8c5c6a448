//! TelemetryClient - Backend Communication Adapter
//!
//! ## Responsibilities
//!
//! - Fetch object snapshots, per-object history, and zone definitions
//! - Create/delete zones
//! - Pass through alert queries for the alert panel
//!
//! All freshness comes from polling: the backend offers no streaming or
//! subscription transport, no auth, no pagination cursors. Any non-success
//! status is one uniform failure class.

use crate::error::{Error, Result};
use crate::models::{AlertEvent, HistoryPoint, ObjectSnapshot, Zone};
use reqwest::Client;
use std::time::Duration;

/// The request/response telemetry backend.
///
/// Implemented by [`HttpTelemetryClient`] in production and by an
/// in-memory fake in tests.
#[async_trait::async_trait]
pub trait TelemetrySource: Send + Sync {
    /// `GET /objects/` - current state per id.
    async fn fetch_objects(&self) -> Result<Vec<ObjectSnapshot>>;

    /// `GET /objects/{id}/history?limit=N` - unsorted history points.
    async fn fetch_history(&self, object_id: &str, limit: usize) -> Result<Vec<HistoryPoint>>;

    /// `GET /zones/` - all zone definitions.
    async fn fetch_zones(&self) -> Result<Vec<Zone>>;

    /// `POST /zones/` - submit a zone without an id, get it back assigned.
    async fn create_zone(&self, zone: &Zone) -> Result<Zone>;

    /// `DELETE /zones/{id}` - repeated delete of a gone id fails the same
    /// way as any other non-2xx response.
    async fn delete_zone(&self, zone_id: i64) -> Result<()>;

    /// `GET /alerts/?limit=N` - recent alerts, newest first.
    async fn fetch_alerts(&self, limit: usize) -> Result<Vec<AlertEvent>>;

    /// `POST /alerts/{id}/ack` - acknowledge one alert.
    async fn ack_alert(&self, alert_id: i64) -> Result<()>;
}

/// HTTP client for the telemetry backend.
pub struct HttpTelemetryClient {
    http: Client,
    base_url: String,
}

impl HttpTelemetryClient {
    /// Create a client for the given base URL (e.g. `http://localhost:8000/api`).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait::async_trait]
impl TelemetrySource for HttpTelemetryClient {
    async fn fetch_objects(&self) -> Result<Vec<ObjectSnapshot>> {
        let resp = self
            .http
            .get(self.url("/objects/"))
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    async fn fetch_history(&self, object_id: &str, limit: usize) -> Result<Vec<HistoryPoint>> {
        let resp = self
            .http
            .get(self.url(&format!("/objects/{}/history", object_id)))
            .query(&[("limit", limit)])
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    async fn fetch_zones(&self) -> Result<Vec<Zone>> {
        let resp = self
            .http
            .get(self.url("/zones/"))
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    async fn create_zone(&self, zone: &Zone) -> Result<Zone> {
        let resp = self
            .http
            .post(self.url("/zones/"))
            .json(zone)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Error::Api(format!(
                "zone create returned {}",
                resp.status()
            )));
        }
        Ok(resp.json().await?)
    }

    async fn delete_zone(&self, zone_id: i64) -> Result<()> {
        let resp = self
            .http
            .delete(self.url(&format!("/zones/{}", zone_id)))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Error::Api(format!(
                "zone delete returned {}",
                resp.status()
            )));
        }
        Ok(())
    }

    async fn fetch_alerts(&self, limit: usize) -> Result<Vec<AlertEvent>> {
        let resp = self
            .http
            .get(self.url("/alerts/"))
            .query(&[("limit", limit)])
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    async fn ack_alert(&self, alert_id: i64) -> Result<()> {
        let resp = self
            .http
            .post(self.url(&format!("/alerts/{}/ack", alert_id)))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Error::Api(format!("alert ack returned {}", resp.status())));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fake;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = HttpTelemetryClient::new("http://localhost:8000/api/").unwrap();
        assert_eq!(client.url("/objects/"), "http://localhost:8000/api/objects/");
    }
}
