use crate::error::ConfigError;
use dotenvy::dotenv;
use std::collections::BTreeSet;
use std::env;
use std::time::Duration;

const DEFAULT_PROVIDER_CONFIG_URL: &str =
    "https://outagemap.duke-energy.com/config/config.prod.json";
const DEFAULT_PROVIDER_API_BASE: &str = "https://prod.apigee.duke-energy.app/outage-maps/v1";
const DEFAULT_GEOCODE_URL: &str = "https://geocode.maps.co/reverse";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub database_url: String,
    pub log_level: String,
    pub provider_config_url: String,
    pub provider_api_base: String,
    pub geocode_url: String,
    pub geocode_interval: Duration,
    pub geocode_max_retries: u32,
    pub http_timeout: Duration,
}

/// What the reconciler needs to know about the operator's area of interest.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub service_areas: BTreeSet<String>,
    pub geocode_api_key: String,
    pub jurisdiction: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let number = |key: &'static str, default: u64| -> Result<u64, ConfigError> {
            match lookup(key) {
                None => Ok(default),
                Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    var: key,
                    value: raw,
                }),
            }
        };

        let service_areas = parse_service_areas(&required("SERVICE_AREA")?)?;
        let geocode_api_key = required("API_KEY")?;
        let jurisdiction = required("JURISDICTION")?;

        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://outages.db".to_string());
        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let provider_config_url = lookup("PROVIDER_CONFIG_URL")
            .unwrap_or_else(|| DEFAULT_PROVIDER_CONFIG_URL.to_string());
        let provider_api_base = lookup("PROVIDER_API_BASE")
            .unwrap_or_else(|| DEFAULT_PROVIDER_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();
        let geocode_url = lookup("GEOCODE_URL").unwrap_or_else(|| DEFAULT_GEOCODE_URL.to_string());

        let geocode_interval = Duration::from_millis(number("GEOCODE_INTERVAL_MS", 1000)?);
        let geocode_max_retries = u32::try_from(number("GEOCODE_MAX_RETRIES", 2)?).map_err(|_| {
            ConfigError::Invalid {
                var: "GEOCODE_MAX_RETRIES",
                value: lookup("GEOCODE_MAX_RETRIES").unwrap_or_default(),
            }
        })?;
        let http_timeout = match number("HTTP_TIMEOUT_SECS", 30)? {
            0 => {
                return Err(ConfigError::Invalid {
                    var: "HTTP_TIMEOUT_SECS",
                    value: "0".to_string(),
                })
            }
            secs => Duration::from_secs(secs),
        };

        Ok(Self {
            service: ServiceConfig {
                service_areas,
                geocode_api_key,
                jurisdiction,
            },
            database_url,
            log_level,
            provider_config_url,
            provider_api_base,
            geocode_url,
            geocode_interval,
            geocode_max_retries,
            http_timeout,
        })
    }
}

fn parse_service_areas(raw: &str) -> Result<BTreeSet<String>, ConfigError> {
    let areas: BTreeSet<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();
    if areas.is_empty() {
        return Err(ConfigError::EmptyServiceArea);
    }
    Ok(areas)
}

/// Configuration pointing every endpoint at a closed local port.
#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        service: ServiceConfig {
            service_areas: BTreeSet::from(["Forsyth".to_string()]),
            geocode_api_key: "key".to_string(),
            jurisdiction: "DEC".to_string(),
        },
        database_url: "sqlite::memory:".to_string(),
        log_level: "info".to_string(),
        provider_config_url: "http://127.0.0.1:9/config.json".to_string(),
        provider_api_base: "http://127.0.0.1:9/v1".to_string(),
        geocode_url: "http://127.0.0.1:9/reverse".to_string(),
        geocode_interval: Duration::ZERO,
        geocode_max_retries: 0,
        http_timeout: Duration::from_secs(1),
    }
}
