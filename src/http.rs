use crate::error::FetchError;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub fn build_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(concat!("outage-tracker/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
}

/// Sends `request` and decodes the JSON body.
///
/// `endpoint` is only used for error reporting and must not carry secrets.
pub async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    endpoint: &str,
) -> Result<T, FetchError> {
    // reqwest errors echo the full URL, query string included.
    let transport = |source: reqwest::Error| FetchError::Transport {
        url: endpoint.to_string(),
        source: source.without_url(),
    };

    let response = request.send().await.map_err(transport)?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: endpoint.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(transport)?;
    serde_json::from_slice(&body).map_err(|source| FetchError::Malformed {
        url: endpoint.to_string(),
        source,
    })
}
