use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::{SCORE_MAX, SCORE_MIN};

/// Per-category breakdown of the total score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ScoreDetails {
    #[validate(range(min = SCORE_MIN, max = SCORE_MAX, message = "face score must be within 0-100"))]
    pub face: f64,

    #[validate(range(min = SCORE_MIN, max = SCORE_MAX, message = "color score must be within 0-100"))]
    pub color: f64,

    #[validate(range(min = SCORE_MIN, max = SCORE_MAX, message = "ratio score must be within 0-100"))]
    pub ratio: f64,

    #[validate(range(min = SCORE_MIN, max = SCORE_MAX, message = "combination score must be within 0-100"))]
    pub combination: f64,

    #[validate(range(min = SCORE_MIN, max = SCORE_MAX, message = "item score must be within 0-100"))]
    pub item: f64,
}

/// Structured output of one analysis call. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CritiqueResult {
    #[validate(range(min = SCORE_MIN, max = SCORE_MAX, message = "totalScore must be within 0-100"))]
    pub total_score: f64,

    #[validate(nested)]
    pub details: ScoreDetails,

    /// Polite, standard-register critique.
    #[validate(length(min = 1, message = "gentleCritique cannot be empty"))]
    pub gentle_critique: String,

    /// Raw, unfiltered critique shown behind a reveal button.
    #[validate(length(min = 1, message = "sincereCritique cannot be empty"))]
    pub sincere_critique: String,

    #[validate(length(min = 1, message = "oneLiner cannot be empty"))]
    pub one_liner: String,
}

impl CritiqueResult {
    pub fn details_as_list(&self) -> [(&'static str, f64); 5] {
        [
            ("face", self.details.face),
            ("color", self.details.color),
            ("ratio", self.details.ratio),
            ("combination", self.details.combination),
            ("item", self.details.item),
        ]
    }
}

/// What is sent to the model for one analysis.
#[derive(Debug, Clone)]
pub struct CritiqueRequest {
    pub image_base64: String,
    pub mime_type: String,
}

/// Body of `POST /api/analyze`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[validate(length(min = 1, message = "image is required"))]
    pub image: String,

    pub mime_type: Option<String>,
}
