//! Clients for the two upstream services behind an analysis.
//!
//! Each service sits behind a narrow capability trait so the analysis
//! pipeline can run against deterministic fakes:
//! - [`TrendSource`]: trending videos for a topic (YouTube Data API)
//! - [`RecommendationGenerator`]: structured recommendations (Gemini)

pub mod error;
pub mod gemini;
pub mod youtube;

pub use error::{ClientError, ClientResult};
pub use gemini::{GeminiClient, GeminiConfig, RecommendationGenerator};
pub use youtube::{TrendSource, YouTubeClient, YouTubeConfig};

/// Both Google APIs take the key here, keeping it out of request URLs.
pub(crate) const API_KEY_HEADER: &str = "x-goog-api-key";

#[cfg(any(test, feature = "mocks"))]
pub use gemini::MockRecommendationGenerator;
#[cfg(any(test, feature = "mocks"))]
pub use youtube::MockTrendSource;
