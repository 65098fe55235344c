//! YouTube Data API search client.
//!
//! Fetches the most relevant videos for a topic and normalizes them into
//! [`TrendVideo`]s, preserving the service's ranking.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};
use trendbot_models::TrendVideo;

use crate::error::{ClientError, ClientResult};
use crate::API_KEY_HEADER;

/// Source of trending videos for a topic.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
#[async_trait]
pub trait TrendSource: Send + Sync {
    /// Fetch trending videos for `query`.
    ///
    /// An empty list is a successful "no data" answer; errors are reserved
    /// for failed calls.
    async fn fetch_trends(&self, query: &str) -> ClientResult<Vec<TrendVideo>>;
}

// =============================================================================
// Configuration
// =============================================================================

/// YouTube search configuration.
#[derive(Debug, Clone)]
pub struct YouTubeConfig {
    /// API key; empty when not configured
    pub api_key: String,
    /// Base URL of the Data API
    pub base_url: String,
    /// Number of results requested per search
    pub max_results: u32,
    /// Language results are biased towards
    pub relevance_language: String,
    /// Region results are biased towards
    pub region_code: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            max_results: 15,
            relevance_language: "id".to_string(),
            region_code: "ID".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl YouTubeConfig {
    /// Create config from environment variables.
    ///
    /// `YOUTUBE_API_KEY` falls back to `GEMINI_API_KEY`, since one Google
    /// API key is often enabled for both services.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            api_key: std::env::var("YOUTUBE_API_KEY")
                .or_else(|_| std::env::var("GEMINI_API_KEY"))
                .unwrap_or_default(),
            base_url: std::env::var("YOUTUBE_API_BASE_URL").unwrap_or(defaults.base_url),
            max_results: std::env::var("YOUTUBE_MAX_RESULTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_results),
            relevance_language: std::env::var("YOUTUBE_RELEVANCE_LANGUAGE")
                .unwrap_or(defaults.relevance_language),
            region_code: std::env::var("YOUTUBE_REGION_CODE").unwrap_or(defaults.region_code),
            timeout: std::env::var("YOUTUBE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    medium: Option<Thumbnail>,
    high: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl Thumbnails {
    /// Medium is the size the front end renders; the others are fallbacks.
    fn best_url(self) -> Option<String> {
        self.medium.or(self.high).or(self.default).map(|t| t.url)
    }
}

impl SearchResponse {
    fn into_trends(self) -> Vec<TrendVideo> {
        self.items
            .into_iter()
            .filter_map(|item| {
                let snippet = item.snippet?;
                match snippet.thumbnails.best_url() {
                    Some(url) => Some(TrendVideo::new(snippet.title, url)),
                    None => {
                        debug!(title = %snippet.title, "Skipping search result without thumbnail");
                        None
                    }
                }
            })
            .collect()
    }
}

// =============================================================================
// Client
// =============================================================================

/// YouTube Data API client.
#[derive(Clone)]
pub struct YouTubeClient {
    http: Client,
    config: YouTubeConfig,
}

impl YouTubeClient {
    /// Create a new YouTube client.
    pub fn new(config: YouTubeConfig) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("trendbot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(YouTubeConfig::from_env())
    }

    pub fn config(&self) -> &YouTubeConfig {
        &self.config
    }

    async fn search(&self, query: &str) -> ClientResult<Vec<TrendVideo>> {
        if !self.config.is_configured() {
            return Err(ClientError::config("YOUTUBE_API_KEY not configured"));
        }

        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        let max_results = self.config.max_results.to_string();

        let response = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, self.config.api_key.as_str())
            .query(&[
                ("part", "snippet"),
                ("q", query),
                ("maxResults", max_results.as_str()),
                ("type", "video"),
                ("relevanceLanguage", self.config.relevance_language.as_str()),
                ("regionCode", self.config.region_code.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse = response.json().await?;
        Ok(body.into_trends())
    }
}

#[async_trait]
impl TrendSource for YouTubeClient {
    async fn fetch_trends(&self, query: &str) -> ClientResult<Vec<TrendVideo>> {
        info!(query = %query, "Searching YouTube for trending videos");

        match self.search(query).await {
            Ok(videos) if videos.is_empty() => {
                warn!(query = %query, "YouTube returned no videos for query");
                Ok(videos)
            }
            Ok(videos) => {
                info!(query = %query, count = videos.len(), "Fetched trending videos");
                Ok(videos)
            }
            Err(e) => {
                warn!(query = %query, error = %e, "YouTube search failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn item(title: &str, thumb: &str) -> serde_json::Value {
        json!({
            "id": { "kind": "youtube#video", "videoId": "abc" },
            "snippet": {
                "title": title,
                "thumbnails": {
                    "default": { "url": format!("{thumb}/default.jpg") },
                    "medium": { "url": format!("{thumb}/mqdefault.jpg") },
                    "high": { "url": format!("{thumb}/hqdefault.jpg") }
                }
            }
        })
    }

    fn client(server: &MockServer) -> YouTubeClient {
        let config = YouTubeConfig::default()
            .with_api_key("test-key")
            .with_base_url(server.uri());
        YouTubeClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_trends_sends_search_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("part", "snippet"))
            .and(query_param("q", "gadget review"))
            .and(header(API_KEY_HEADER, "test-key"))
            .and(query_param("maxResults", "15"))
            .and(query_param("type", "video"))
            .and(query_param("relevanceLanguage", "id"))
            .and(query_param("regionCode", "ID"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [item("First", "https://i.ytimg.com/vi/1"), item("Second", "https://i.ytimg.com/vi/2")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let videos = client(&server).fetch_trends("gadget review").await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert!(!requests[0].url.as_str().contains("test-key"));
        assert_eq!(
            videos,
            vec![
                TrendVideo::new("First", "https://i.ytimg.com/vi/1/mqdefault.jpg"),
                TrendVideo::new("Second", "https://i.ytimg.com/vi/2/mqdefault.jpg"),
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_trends_empty_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .mount(&server)
            .await;

        let videos = client(&server).fetch_trends("obscure topic").await.unwrap();
        assert!(videos.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_trends_thumbnail_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    { "snippet": { "title": "Only default", "thumbnails": { "default": { "url": "https://img/d.jpg" } } } },
                    { "snippet": { "title": "No thumbnails", "thumbnails": {} } },
                    { "id": { "kind": "youtube#video" } }
                ]
            })))
            .mount(&server)
            .await;

        let videos = client(&server).fetch_trends("cats").await.unwrap();
        assert_eq!(videos, vec![TrendVideo::new("Only default", "https://img/d.jpg")]);
    }

    #[tokio::test]
    async fn test_fetch_trends_upstream_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": { "code": 403, "message": "The request cannot be completed because you have exceeded your quota." }
            })))
            .mount(&server)
            .await;

        let err = client(&server).fetch_trends("cats").await.unwrap_err();
        match err {
            ClientError::Status { status, message } => {
                assert_eq!(status, 403);
                assert!(message.contains("exceeded your quota"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_trends_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "items": [] }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let mut config = YouTubeConfig::default()
            .with_api_key("test-key")
            .with_base_url(server.uri());
        config.timeout = Duration::from_millis(50);

        let err = YouTubeClient::new(config)
            .unwrap()
            .fetch_trends("cats")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Timeout));
    }

    #[tokio::test]
    async fn test_fetch_trends_without_key_skips_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let config = YouTubeConfig::default().with_base_url(server.uri());
        let err = YouTubeClient::new(config)
            .unwrap()
            .fetch_trends("cats")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[tokio::test]
    async fn test_network_error_does_not_leak_key() {
        let config = YouTubeConfig::default()
            .with_api_key("SECRET-YT-KEY")
            .with_base_url("http://127.0.0.1:1");

        let err = YouTubeClient::new(config)
            .unwrap()
            .fetch_trends("cats")
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Network(_)));
        assert!(!err.to_string().contains("SECRET-YT-KEY"));
    }
}
