//! HTTP executor implementation
//!
//! This module issues API calls with reqwest, including:
//! - Building the HTTP client with a user agent and timeouts
//! - Appending the developer key to every request
//! - Decoding successful bodies into [`RawPage`]
//! - Classifying failed responses into [`ApiError`]

use super::{classify_error, ApiError, RawPage, RequestDescriptor, RequestExecutor};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `timeout` - Total per-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`RequestExecutor`] backed by a reqwest client
pub struct HttpExecutor {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpExecutor {
    /// Creates an executor for the API rooted at `base_url`
    pub fn new(client: Client, base_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn url_for(&self, request: &RequestDescriptor) -> String {
        format!("{}/{}", self.base_url, request.endpoint().path())
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self, request: &RequestDescriptor) -> Result<RawPage, ApiError> {
        let endpoint = request.endpoint().path();
        let transport_error = |e: reqwest::Error| ApiError::Unknown {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        };

        tracing::debug!("GET {} {:?}", endpoint, request.params());

        let response = self
            .client
            .get(self.url_for(request))
            .query(request.params())
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(classify_error(endpoint, status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Unknown {
            endpoint: endpoint.to_string(),
            message: format!("Invalid response body: {}", e),
        })
    }
}
