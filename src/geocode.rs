use crate::config::AppConfig;
use crate::error::FetchError;
use crate::http::send_json;
use crate::models::provider::{Address, GeocodeResponse};
use std::time::Duration;
use tracing::warn;

/// Reverse geocoding: coordinates to a structured address.
pub trait Geocoder {
    async fn reverse(&self, lat: f64, lon: f64) -> Result<Address, FetchError>;
}

pub struct GeocodeClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    max_retries: u32,
    retry_backoff: Duration,
}

impl GeocodeClient {
    pub fn new(http: reqwest::Client, config: &AppConfig) -> Self {
        Self {
            http,
            url: config.geocode_url.clone(),
            api_key: config.service.geocode_api_key.clone(),
            max_retries: config.geocode_max_retries,
            retry_backoff: config.geocode_interval.max(Duration::from_millis(500)),
        }
    }

    async fn lookup(&self, lat: f64, lon: f64) -> Result<Address, FetchError> {
        let request = self.http.get(&self.url).query(&[
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("api_key", self.api_key.clone()),
        ]);
        let reply: GeocodeResponse = send_json(request, &self.url).await?;
        Ok(reply.address)
    }
}

impl Geocoder for GeocodeClient {
    async fn reverse(&self, lat: f64, lon: f64) -> Result<Address, FetchError> {
        let mut attempt = 0;
        loop {
            match self.lookup(lat, lon).await {
                Ok(address) => return Ok(address),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        "Geocode lookup for ({}, {}) failed: {}. Retry {} / {}",
                        lat, lon, e, attempt, self.max_retries
                    );
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    #[tokio::test]
    async fn test_error_does_not_leak_api_key() {
        let mut config = test_config();
        config.service.geocode_api_key = "super-secret".to_string();
        let client = GeocodeClient::new(reqwest::Client::new(), &config);

        let err = client.reverse(36.1, -80.2).await.unwrap_err();
        assert!(err.is_transient());
        assert!(!err.to_string().contains("super-secret"));
    }
}
