//! Trending video models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single trending video as returned to the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrendVideo {
    /// Video title as reported by the search service
    pub title: String,

    /// Thumbnail image URL
    pub thumbnail_url: String,
}

impl TrendVideo {
    pub fn new(title: impl Into<String>, thumbnail_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            thumbnail_url: thumbnail_url.into(),
        }
    }
}
