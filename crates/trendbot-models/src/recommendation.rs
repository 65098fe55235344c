//! Generated recommendation and assembled result models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::trend::TrendVideo;

/// Number of trending videos echoed back to the caller.
pub const TRENDING_SAMPLE_SIZE: usize = 5;

/// Structured output produced by the generative model.
///
/// Every field is required; a response missing any of them is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedRecommendation {
    /// Fifteen new video titles patterned on the trending examples
    pub titles: Vec<String>,

    /// A single prompt for generating a thumbnail image
    pub thumbnail_prompt: String,

    /// Ten to fifteen relevant hashtags
    pub hashtags: Vec<String>,
}

/// Response body for a successful analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisResult {
    #[serde(flatten)]
    pub recommendation: GeneratedRecommendation,

    /// The first few trending videos the recommendation was based on
    #[serde(rename = "trendingVideos")]
    pub trending_videos: Vec<TrendVideo>,
}

impl AnalysisResult {
    /// Merge a recommendation with the leading sample of the fetched trends.
    pub fn assemble(recommendation: GeneratedRecommendation, trends: &[TrendVideo]) -> Self {
        Self {
            recommendation,
            trending_videos: trends.iter().take(TRENDING_SAMPLE_SIZE).cloned().collect(),
        }
    }
}

/// Response schema for the generative model, derived from [`GeneratedRecommendation`].
///
/// Gemini accepts an OpenAPI-style subset: upper-case type names and only
/// `type`, `description`, `items`, `properties` and `required` keywords.
pub fn structured_output_schema() -> Value {
    let root = serde_json::to_value(schemars::schema_for!(GeneratedRecommendation))
        .unwrap_or_default();
    to_gemini_schema(&root)
}

fn to_gemini_schema(node: &Value) -> Value {
    let mut out = Map::new();

    if let Some(ty) = node.get("type").and_then(Value::as_str) {
        out.insert("type".to_string(), Value::String(ty.to_ascii_uppercase()));
    }
    if let Some(description) = node.get("description") {
        out.insert("description".to_string(), description.clone());
    }
    if let Some(items) = node.get("items") {
        out.insert("items".to_string(), to_gemini_schema(items));
    }
    if let Some(properties) = node.get("properties").and_then(Value::as_object) {
        let properties = properties
            .iter()
            .map(|(name, schema)| (name.clone(), to_gemini_schema(schema)))
            .collect();
        out.insert("properties".to_string(), Value::Object(properties));
    }
    if let Some(required) = node.get("required") {
        out.insert("required".to_string(), required.clone());
    }

    Value::Object(out)
}
