use thiserror::Error;

/// Startup configuration problems. Always fatal, raised before any I/O.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
    #[error("SERVICE_AREA does not name any county")]
    EmptyServiceArea,
}

/// Failure talking to an external HTTP collaborator.
///
/// `url` is the endpoint only. Query strings are left out so the geocoder
/// API key never ends up in logs.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("malformed response from {url}: {source}")]
    Malformed {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{url} reported errors: {messages}")]
    Rejected { url: String, messages: String },
    #[error("{0} called before authenticating with the provider")]
    NotAuthenticated(&'static str),
}

impl FetchError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Transport { .. } => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            FetchError::Malformed { .. }
            | FetchError::Rejected { .. }
            | FetchError::NotAuthenticated(_) => false,
        }
    }
}

/// Errors that abort a whole reconciliation cycle.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("provider authentication failed: {0}")]
    Auth(#[source] FetchError),
    #[error("outage fetch failed: {0}")]
    Fetch(#[source] FetchError),
    #[error("geocoder unavailable, no event could be located: {0}")]
    Geocode(#[source] FetchError),
    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}

impl CycleError {
    pub fn kind(&self) -> &'static str {
        match self {
            CycleError::Auth(_) => "auth",
            CycleError::Fetch(_) => "fetch",
            CycleError::Geocode(_) => "geocode",
            CycleError::Storage(_) => "storage",
        }
    }
}
