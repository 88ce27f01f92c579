//! `CatalogClient` - IMDb chart API client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::instrument;
use url::Url;

use super::api::CatalogApi;
use super::error::CatalogError;
use super::rate_limiter::RequestPacer;
use super::types::{Chart, Item};

/// Default base URL of the RapidAPI IMDb host.
const DEFAULT_BASE_URL: &str = "https://imdb236.p.rapidapi.com/api/";

/// Default `X-RapidAPI-Host` header value.
const DEFAULT_API_HOST: &str = "imdb236.p.rapidapi.com";

/// Maximum number of retries for HTTP 429 responses.
const MAX_RETRIES: u32 = 3;

/// Backoff duration between retries.
const RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Error body returned by RapidAPI gateways.
#[derive(Debug, Deserialize)]
struct GatewayError {
    /// Human readable message.
    message: String,
}

/// IMDb chart API client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct CatalogClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests.
    base_url: Url,
    /// RapidAPI key.
    api_key: String,
    /// RapidAPI host header.
    api_host: String,
    /// Request pacing.
    pacer: Arc<Mutex<RequestPacer>>,
}

/// Builder for `CatalogClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct CatalogClientBuilder {
    base_url: Option<Url>,
    api_key: Option<String>,
    api_host: Option<String>,
    user_agent: Option<String>,
    min_interval: Option<Duration>,
    timeout: Option<Duration>,
}

impl CatalogClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            api_host: None,
            user_agent: None,
            min_interval: None,
            timeout: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the RapidAPI key (required).
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Overrides the `X-RapidAPI-Host` header (default: `imdb236.p.rapidapi.com`).
    #[must_use]
    pub fn api_host(mut self, host: impl Into<String>) -> Self {
        self.api_host = Some(host.into());
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the minimum request interval (default: 250ms).
    #[must_use]
    pub const fn min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = Some(interval);
        self
    }

    /// Bounds every request (connect + body) by `timeout`. Unbounded by default.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `api_key` is not set.
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<CatalogClient, CatalogError> {
        let api_key = self
            .api_key
            .ok_or_else(|| CatalogError::Config(String::from("api_key is required")))?;
        let user_agent = self
            .user_agent
            .ok_or_else(|| CatalogError::Config(String::from("user_agent is required")))?;

        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)
                .map_err(|e| CatalogError::Config(format!("invalid default base URL: {e}")))?,
        };

        let pacer = self
            .min_interval
            .map_or_else(RequestPacer::with_default_interval, RequestPacer::new);

        let mut http = Client::builder().user_agent(&user_agent).gzip(true);
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        let http_client = http
            .build()
            .map_err(|e| CatalogError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(CatalogClient {
            http_client,
            base_url,
            api_key,
            api_host: self.api_host.unwrap_or_else(|| String::from(DEFAULT_API_HOST)),
            pacer: Arc::new(Mutex::new(pacer)),
        })
    }
}

impl CatalogClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> CatalogClientBuilder {
        CatalogClientBuilder::new()
    }

    /// Sends a GET request with RapidAPI headers and pacing.
    /// Retries up to `MAX_RETRIES` times on HTTP 429.
    #[instrument(skip(self))]
    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, CatalogError> {
        self.pacer.lock().await.wait().await;

        let url = self
            .base_url
            .join(path)
            .map_err(|e| CatalogError::Config(format!("failed to join URL path {path}: {e}")))?;

        let mut retries = 0u32;
        loop {
            let request = self
                .http_client
                .get(url.clone())
                .header("X-RapidAPI-Key", &self.api_key)
                .header("X-RapidAPI-Host", &self.api_host)
                .build()?;

            tracing::debug!(url = %request.url(), "catalog API request");

            let response = self.http_client.execute(request).await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                retries = retries.saturating_add(1);
                if retries > MAX_RETRIES {
                    return Err(CatalogError::Server {
                        status: status.as_u16(),
                        message: format!("rate limit exceeded after {MAX_RETRIES} retries"),
                    });
                }
                tracing::warn!(
                    retry = retries,
                    max_retries = MAX_RETRIES,
                    "catalog API rate limited (429). Retrying..."
                );
                tokio::time::sleep(RETRY_BACKOFF.saturating_mul(retries)).await;
                self.pacer.lock().await.wait().await;
                continue;
            }

            let body = response.text().await?;

            if !status.is_success() {
                let message = serde_json::from_str::<GatewayError>(&body)
                    .map_or(body, |gateway| gateway.message);
                return Err(CatalogError::Server {
                    status: status.as_u16(),
                    message,
                });
            }

            return serde_json::from_str(&body)
                .map_err(|e| CatalogError::Decode(format!("{path}: {e}")));
        }
    }
}

impl CatalogApi for CatalogClient {
    #[instrument(skip(self))]
    async fn fetch_chart(&self, chart: Chart) -> Result<Vec<Item>, CatalogError> {
        let items: Vec<Item> = self.get_json(chart.path()).await?;
        tracing::debug!(%chart, count = items.len(), "chart fetched");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;

    /// Builds a client against a wiremock server with pacing disabled.
    fn test_client(server: &wiremock::MockServer) -> CatalogClient {
        let base_url = format!("{}/api/", server.uri());
        CatalogClient::builder()
            .base_url(base_url.parse().unwrap())
            .api_key("test-key")
            .user_agent("test/0.0.0")
            .min_interval(Duration::from_millis(0))
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_api_key() {
        // Arrange & Act
        let result = CatalogClient::builder().user_agent("test/0.0.0").build();

        // Assert
        assert_eq!(
            result.unwrap_err(),
            CatalogError::Config(String::from("api_key is required"))
        );
    }

    #[test]
    fn test_builder_requires_user_agent() {
        // Arrange & Act
        let result = CatalogClient::builder().api_key("k").build();

        // Assert
        assert!(result.unwrap_err().to_string().contains("user_agent is required"));
    }

    #[test]
    fn test_builder_defaults() {
        // Arrange & Act
        let client = CatalogClient::builder()
            .api_key("k")
            .user_agent("test/0.0.0")
            .build()
            .unwrap();

        // Assert
        assert_eq!(client.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(client.api_host, DEFAULT_API_HOST);
    }

    #[tokio::test]
    async fn test_fetch_chart_via_http() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let json_body = include_str!("../../fixtures/top250_movies.json");

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/api/imdb/top250-movies"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(json_body))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);

        // Act
        let items = client.fetch_chart(Chart::TopMovies).await.unwrap();

        // Assert
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].title, "The Godfather");
    }

    #[tokio::test]
    async fn test_rapidapi_headers_are_sent() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::header("X-RapidAPI-Key", "test-key"))
            .and(wiremock::matchers::header(
                "X-RapidAPI-Host",
                DEFAULT_API_HOST,
            ))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("[]"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);

        // Act
        let items = client.fetch_chart(Chart::PopularSeries).await.unwrap();

        // Assert (mock expect(1) verifies headers)
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_http_error_is_server_failure() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(
                wiremock::ResponseTemplate::new(403)
                    .set_body_string(r#"{"message":"You are not subscribed to this API."}"#),
            )
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);

        // Act
        let err = client.fetch_chart(Chart::TopSeries).await.unwrap_err();

        // Assert
        assert_eq!(
            err,
            CatalogError::Server {
                status: 403,
                message: String::from("You are not subscribed to this API."),
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_failure() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);

        // Act
        let err = client.fetch_chart(Chart::TopMovies).await.unwrap_err();

        // Assert
        assert!(matches!(err, CatalogError::Decode(_)));
    }

    #[tokio::test]
    async fn test_http_429_retries() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;

        // Initial request plus MAX_RETRIES retries
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(429))
            .expect(u64::from(MAX_RETRIES) + 1)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);

        // Act
        let err = client.fetch_chart(Chart::TopMovies).await.unwrap_err();

        // Assert
        assert_eq!(err.status(), Some(429));
        assert!(err.to_string().contains("rate limit"));
    }

    #[tokio::test]
    async fn test_timeout_is_network_failure() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string("[]")
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let client = CatalogClient::builder()
            .base_url(format!("{}/api/", mock_server.uri()).parse().unwrap())
            .api_key("test-key")
            .user_agent("test/0.0.0")
            .min_interval(Duration::from_millis(0))
            .timeout(Duration::from_millis(100))
            .build()
            .unwrap();

        // Act
        let err = client.fetch_chart(Chart::TopMovies).await.unwrap_err();

        // Assert
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_failure() {
        // Arrange: nothing listens on port 1
        let base_url = "http://127.0.0.1:1/api/";

        let client = CatalogClient::builder()
            .base_url(base_url.parse().unwrap())
            .api_key("test-key")
            .user_agent("test/0.0.0")
            .min_interval(Duration::from_millis(0))
            .build()
            .unwrap();

        // Act
        let err = client.fetch_chart(Chart::TopMovies).await.unwrap_err();

        // Assert
        assert!(err.is_network());
    }
}
