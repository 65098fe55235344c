//! Analysis request model and validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Audience used in the prompt when the caller does not name one.
pub const DEFAULT_TARGET_AUDIENCE: &str = "general";

/// Audience location used in the prompt when the caller does not name one.
pub const DEFAULT_LOCATION_AUDIENCE: &str = "Global/Indonesia";

/// Errors produced while validating an [`AnalysisRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("topic required")]
    MissingNiche,

    #[error("{0}")]
    Invalid(String),
}

/// Request body for `POST /api/analyze`.
///
/// Every field is optional at the wire level so that a missing niche can be
/// reported as a validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    /// Content topic, used as the search query and the subject of the analysis
    #[serde(default)]
    #[validate(length(max = 200, message = "niche must be at most 200 characters"))]
    pub niche: Option<String>,

    /// Who the content is for
    #[serde(default)]
    #[validate(length(max = 200, message = "targetAudience must be at most 200 characters"))]
    pub target_audience: Option<String>,

    /// Where the audience is located
    #[serde(default)]
    #[validate(length(max = 200, message = "locationAudience must be at most 200 characters"))]
    pub location_audience: Option<String>,
}

/// A request that passed validation. Blank optional fields are normalized to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub niche: String,
    pub target_audience: Option<String>,
    pub location_audience: Option<String>,
}

impl AnalysisRequest {
    pub fn new(niche: impl Into<String>) -> Self {
        Self {
            niche: Some(niche.into()),
            ..Default::default()
        }
    }

    pub fn with_target_audience(mut self, audience: impl Into<String>) -> Self {
        self.target_audience = Some(audience.into());
        self
    }

    pub fn with_location_audience(mut self, location: impl Into<String>) -> Self {
        self.location_audience = Some(location.into());
        self
    }

    /// Validate the request and trim its fields.
    pub fn validated(self) -> Result<ValidatedRequest, RequestError> {
        let niche = non_blank(self.niche.as_deref()).ok_or(RequestError::MissingNiche)?;

        self.validate()
            .map_err(|e| RequestError::Invalid(e.to_string()))?;

        Ok(ValidatedRequest {
            niche,
            target_audience: non_blank(self.target_audience.as_deref()),
            location_audience: non_blank(self.location_audience.as_deref()),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case_fields() {
        let request: AnalysisRequest = serde_json::from_str(
            r#"{"niche":"gadget review","targetAudience":"students","locationAudience":"Jakarta"}"#,
        )
        .unwrap();

        assert_eq!(request.niche.as_deref(), Some("gadget review"));
        assert_eq!(request.target_audience.as_deref(), Some("students"));
        assert_eq!(request.location_audience.as_deref(), Some("Jakarta"));
    }

    #[test]
    fn test_missing_niche_rejected() {
        let request: AnalysisRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.validated(), Err(RequestError::MissingNiche));

        let request: AnalysisRequest = serde_json::from_str(r#"{"niche":null}"#).unwrap();
        assert_eq!(request.validated(), Err(RequestError::MissingNiche));
    }

    #[test]
    fn test_blank_niche_rejected() {
        assert_eq!(
            AnalysisRequest::new("").validated(),
            Err(RequestError::MissingNiche)
        );
        assert_eq!(
            AnalysisRequest::new("   ").validated(),
            Err(RequestError::MissingNiche)
        );
    }

    #[test]
    fn test_missing_niche_message() {
        assert_eq!(RequestError::MissingNiche.to_string(), "topic required");
    }

    #[test]
    fn test_overlong_field_rejected() {
        let request = AnalysisRequest::new("a".repeat(201));
        assert!(matches!(request.validated(), Err(RequestError::Invalid(_))));

        let request = AnalysisRequest::new("cooking").with_target_audience("b".repeat(201));
        let err = request.validated().unwrap_err();
        assert!(err.to_string().contains("targetAudience"));
    }

    #[test]
    fn test_optional_fields_normalized() {
        let validated = AnalysisRequest::new("  cooking  ")
            .with_target_audience(" ")
            .with_location_audience(" Bandung ")
            .validated()
            .unwrap();

        assert_eq!(validated.niche, "cooking");
        assert_eq!(validated.target_audience, None);
        assert_eq!(validated.location_audience.as_deref(), Some("Bandung"));
    }
}
