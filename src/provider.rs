use crate::config::AppConfig;
use crate::error::FetchError;
use crate::http::send_json;
use crate::models::provider::{AreaOfInterest, Envelope, OutageBatch, ProviderConfig};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Source of outage reports and area summaries for one jurisdiction.
pub trait OutageSource {
    /// Fetches API credentials. Must succeed before any other call.
    async fn authenticate(&mut self) -> Result<(), FetchError>;
    async fn fetch_counties(&self) -> Result<Vec<AreaOfInterest>, FetchError>;
    async fn fetch_outages(&self) -> Result<OutageBatch, FetchError>;
}

struct Credentials {
    key: String,
    secret: String,
}

/// HTTP client for the utility's public outage-map API.
pub struct OutageMapClient {
    http: reqwest::Client,
    config_url: String,
    api_base: String,
    jurisdiction: String,
    credentials: Option<Credentials>,
}

impl OutageMapClient {
    pub fn new(http: reqwest::Client, config: &AppConfig) -> Self {
        Self {
            http,
            config_url: config.provider_config_url.clone(),
            api_base: config.provider_api_base.clone(),
            jurisdiction: config.service.jurisdiction.clone(),
            credentials: None,
        }
    }

    async fn get_envelope<T>(&self, resource: &'static str) -> Result<Vec<T>, FetchError>
    where
        T: serde::de::DeserializeOwned,
    {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(FetchError::NotAuthenticated(resource))?;
        let endpoint = format!("{}/{}", self.api_base, resource);
        let request = self
            .http
            .get(&endpoint)
            .query(&[("jurisdiction", self.jurisdiction.as_str())])
            .basic_auth(&credentials.key, Some(&credentials.secret));

        let envelope: Envelope<T> = send_json(request, &endpoint).await?;
        let data = envelope.into_data(&endpoint).inspect_err(|e| {
            warn!("Provider refused {} request: {}", resource, e);
        })?;
        debug!("Fetched {} {} records", data.len(), resource);
        Ok(data)
    }
}

impl OutageSource for OutageMapClient {
    async fn authenticate(&mut self) -> Result<(), FetchError> {
        let config: ProviderConfig =
            send_json(self.http.get(&self.config_url), &self.config_url).await?;
        self.credentials = Some(Credentials {
            key: config.consumer_key,
            secret: config.consumer_secret,
        });
        info!("Authenticated with outage provider for jurisdiction {}", self.jurisdiction);
        Ok(())
    }

    async fn fetch_counties(&self) -> Result<Vec<AreaOfInterest>, FetchError> {
        self.get_envelope("counties").await
    }

    async fn fetch_outages(&self) -> Result<OutageBatch, FetchError> {
        let raw: Vec<Value> = self.get_envelope("outages").await?;
        Ok(OutageBatch::from_raw(raw))
    }
}
