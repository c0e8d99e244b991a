//! # Delivery Zone Directory
//!
//! Fetches the deliverable zones from the backend. Zone data is
//! display/selection data, not money, so a backend failure degrades to
//! a built-in fallback list instead of blocking the storefront.

use crate::config::{BackendConfig, BACKEND_TIMEOUT_SECS};
use bloom_core::{CheckoutError, CheckoutResult, DeliveryZone};
use reqwest::Client;
use tracing::{debug, instrument, warn};

/// Fallback zones served when the backend is unreachable
pub fn fallback_zones() -> Vec<DeliveryZone> {
    vec![
        DeliveryZone::new("1", "Paris", "75001"),
        DeliveryZone::new("2", "Lyon", "69001"),
        DeliveryZone::new("3", "Marseille", "13001"),
    ]
}

/// HTTP client for the zone directory
pub struct HttpZoneClient {
    config: BackendConfig,
    client: Client,
}

impl HttpZoneClient {
    pub fn new(config: BackendConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(BACKEND_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    async fn fetch(&self) -> CheckoutResult<Vec<DeliveryZone>> {
        let url = format!("{}/zones", self.config.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CheckoutError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CheckoutError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Vec<DeliveryZone>>()
            .await
            .map_err(|e| CheckoutError::Serialization(e.to_string()))
    }

    /// The zones currently offered for selection. Inactive zones are
    /// filtered out; on any backend failure the fallback list is
    /// returned instead.
    #[instrument(skip(self))]
    pub async fn active_zones(&self) -> Vec<DeliveryZone> {
        match self.fetch().await {
            Ok(zones) => {
                let active: Vec<DeliveryZone> =
                    zones.into_iter().filter(|zone| zone.active).collect();
                debug!("Loaded {} active delivery zones", active.len());
                active
            }
            Err(e) => {
                warn!("Zone fetch failed, serving fallback list: {}", e);
                fallback_zones()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_inactive_zones_are_filtered() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/zones"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "1", "name": "Paris", "postalCode": "75001", "active": true },
                { "id": "9", "name": "Bordeaux", "postalCode": "33000", "active": false }
            ])))
            .mount(&server)
            .await;

        let zones = HttpZoneClient::new(BackendConfig::new(server.uri()))
            .active_zones()
            .await;

        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].name, "Paris");
    }

    #[tokio::test]
    async fn test_backend_failure_serves_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/zones"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let zones = HttpZoneClient::new(BackendConfig::new(server.uri()))
            .active_zones()
            .await;

        assert_eq!(zones.len(), 3);
        assert_eq!(zones[0].postal_code, "75001");
        assert_eq!(zones[2].name, "Marseille");
    }
}
