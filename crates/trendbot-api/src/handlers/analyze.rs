//! Trend analysis handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::{info, warn};

use trendbot_models::{AnalysisRequest, AnalysisResult};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Run a trend analysis for a niche.
///
/// A body without a JSON content type is treated as an empty request, so it
/// is rejected for the missing niche rather than for its encoding.
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> ApiResult<Json<AnalysisResult>> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => AnalysisRequest::default(),
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Malformed analysis request body");
            return Err(ApiError::bad_request("Invalid request body"));
        }
    };

    info!("Received analysis request");

    let result = state.pipeline.run(request).await?;
    Ok(Json(result))
}

/// Fallback for non-POST methods on the analyze route.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
