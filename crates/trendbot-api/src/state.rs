//! Application state.

use std::sync::Arc;

use trendbot_clients::{
    ClientResult, GeminiClient, GeminiConfig, RecommendationGenerator, TrendSource, YouTubeClient,
    YouTubeConfig,
};

use crate::config::ApiConfig;
use crate::services::AnalysisPipeline;

/// Which upstream credentials are present, reported by the readiness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpstreamReadiness {
    pub youtube_configured: bool,
    pub gemini_configured: bool,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pipeline: AnalysisPipeline,
    pub upstreams: UpstreamReadiness,
}

impl AppState {
    /// Create application state backed by the real YouTube and Gemini clients.
    pub fn new(
        config: ApiConfig,
        youtube: YouTubeConfig,
        gemini: GeminiConfig,
    ) -> ClientResult<Self> {
        let upstreams = UpstreamReadiness {
            youtube_configured: youtube.is_configured(),
            gemini_configured: gemini.is_configured(),
        };

        let trends = Arc::new(YouTubeClient::new(youtube)?);
        let generator = Arc::new(GeminiClient::new(gemini)?);

        Ok(Self {
            config,
            pipeline: AnalysisPipeline::new(trends, generator),
            upstreams,
        })
    }

    /// Create application state from explicit capability implementations.
    pub fn with_services(
        config: ApiConfig,
        trends: Arc<dyn TrendSource>,
        generator: Arc<dyn RecommendationGenerator>,
    ) -> Self {
        Self {
            config,
            pipeline: AnalysisPipeline::new(trends, generator),
            upstreams: UpstreamReadiness {
                youtube_configured: true,
                gemini_configured: true,
            },
        }
    }
}
