//! Analysis pipeline.
//!
//! Runs one analysis strictly in sequence:
//! `ValidatingInput -> FetchingTrends -> GeneratingRecommendation -> Assembling -> Done`.
//! Any stage may fail; nothing is retried and no partial result is returned.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, error, info, info_span, warn, Instrument};

use trendbot_clients::{ClientError, RecommendationGenerator, TrendSource};
use trendbot_models::{AnalysisRequest, AnalysisResult, RequestError, TrendVideo, ValidatedRequest};

use crate::metrics;
use crate::services::prompt::build_prompt;

/// Stage of a single analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    ValidatingInput,
    FetchingTrends,
    GeneratingRecommendation,
    Assembling,
    Done,
}

impl AnalysisStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStage::ValidatingInput => "validating_input",
            AnalysisStage::FetchingTrends => "fetching_trends",
            AnalysisStage::GeneratingRecommendation => "generating_recommendation",
            AnalysisStage::Assembling => "assembling",
            AnalysisStage::Done => "done",
        }
    }
}

impl fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of an analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    InvalidInput(#[from] RequestError),

    #[error("Trend fetch failed: {0}")]
    UpstreamFetch(#[source] ClientError),

    #[error("Recommendation generation failed: {0}")]
    UpstreamGeneration(#[source] ClientError),
}

impl AnalysisError {
    /// Failure kind, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::InvalidInput(_) => "invalid_input",
            AnalysisError::UpstreamFetch(_) => "upstream_fetch",
            AnalysisError::UpstreamGeneration(_) => "upstream_generation",
        }
    }

    /// Stage the run was in when it failed.
    pub fn stage(&self) -> AnalysisStage {
        match self {
            AnalysisError::InvalidInput(_) => AnalysisStage::ValidatingInput,
            AnalysisError::UpstreamFetch(_) => AnalysisStage::FetchingTrends,
            AnalysisError::UpstreamGeneration(_) => AnalysisStage::GeneratingRecommendation,
        }
    }
}

/// Orchestrates trend fetching, prompt building and generation.
///
/// Holds no per-request state, so one instance serves concurrent requests.
#[derive(Clone)]
pub struct AnalysisPipeline {
    trends: Arc<dyn TrendSource>,
    generator: Arc<dyn RecommendationGenerator>,
}

impl AnalysisPipeline {
    pub fn new(trends: Arc<dyn TrendSource>, generator: Arc<dyn RecommendationGenerator>) -> Self {
        Self { trends, generator }
    }

    /// Run one analysis end to end.
    pub async fn run(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let request = match request.validated() {
            Ok(request) => request,
            Err(e) => {
                info!(error = %e, "Rejected analysis request");
                let err = AnalysisError::from(e);
                metrics::record_analysis_failed(err.kind());
                return Err(err);
            }
        };

        let span = info_span!("analysis", niche = %request.niche);
        async {
            let started = Instant::now();
            metrics::record_analysis_started();

            let result = self.run_validated(&request).await;
            match &result {
                Ok(res) => {
                    info!(
                        trending_videos = res.trending_videos.len(),
                        titles = res.recommendation.titles.len(),
                        hashtags = res.recommendation.hashtags.len(),
                        duration_ms = started.elapsed().as_millis() as u64,
                        "Analysis completed"
                    );
                    metrics::record_analysis_completed(started.elapsed().as_secs_f64());
                }
                Err(e) => {
                    error!(stage = %e.stage(), error = %e, "Analysis failed");
                    metrics::record_analysis_failed(e.kind());
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run_validated(&self, request: &ValidatedRequest) -> Result<AnalysisResult, AnalysisError> {
        debug!(stage = %AnalysisStage::FetchingTrends, "Entering stage");
        let trends = self.fetch_trends(&request.niche).await?;

        let titles: Vec<&str> = trends.iter().map(|t| t.title.as_str()).collect();
        if titles.is_empty() {
            warn!("No trending titles, prompting from general knowledge");
        }
        let prompt = build_prompt(
            &request.niche,
            request.target_audience.as_deref(),
            request.location_audience.as_deref(),
            &titles,
        );

        debug!(stage = %AnalysisStage::GeneratingRecommendation, "Entering stage");
        let started = Instant::now();
        let generated = self.generator.generate(&prompt).await;
        metrics::record_upstream_call("gemini", generated.is_ok(), started.elapsed().as_secs_f64());
        let recommendation = generated.map_err(AnalysisError::UpstreamGeneration)?;

        debug!(stage = %AnalysisStage::Assembling, "Entering stage");
        let result = AnalysisResult::assemble(recommendation, &trends);

        debug!(stage = %AnalysisStage::Done, "Entering stage");
        Ok(result)
    }

    async fn fetch_trends(&self, niche: &str) -> Result<Vec<TrendVideo>, AnalysisError> {
        let started = Instant::now();
        let fetched = self.trends.fetch_trends(niche).await;
        metrics::record_upstream_call("youtube", fetched.is_ok(), started.elapsed().as_secs_f64());
        fetched.map_err(AnalysisError::UpstreamFetch)
    }
}
