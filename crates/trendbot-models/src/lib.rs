//! Shared data models for the trendbot backend.
//!
//! This crate provides Serde-serializable types for:
//! - Inbound analysis requests and their validation
//! - Trending videos returned by the video-search service
//! - Generated recommendations and the structured-output schema
//! - The assembled analysis result returned to the front end

pub mod recommendation;
pub mod request;
pub mod trend;

// Re-export common types
pub use recommendation::{
    structured_output_schema, AnalysisResult, GeneratedRecommendation, TRENDING_SAMPLE_SIZE,
};
pub use request::{
    AnalysisRequest, RequestError, ValidatedRequest, DEFAULT_LOCATION_AUDIENCE,
    DEFAULT_TARGET_AUDIENCE,
};
pub use trend::TrendVideo;
