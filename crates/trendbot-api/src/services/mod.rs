//! Business logic services.

pub mod pipeline;
pub mod prompt;

pub use pipeline::{AnalysisError, AnalysisPipeline, AnalysisStage};
pub use prompt::{build_prompt, NO_TRENDS_FALLBACK};
