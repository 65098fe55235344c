//! Axum HTTP API server.
//!
//! This crate provides:
//! - `POST /api/analyze`: trending-video driven content recommendations
//! - Liveness, readiness and Prometheus metrics endpoints
//! - CORS, security headers and request-id middleware

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{AnalysisError, AnalysisPipeline};
pub use state::AppState;
