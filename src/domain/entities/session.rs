use serde::Serialize;

use crate::entities::critique::CritiqueResult;

/// Lifecycle of one analysis cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "lowercase")]
pub enum AnalysisState {
    Idle,
    Loading,
    Success(CritiqueResult),
    Error(String),
}

impl AnalysisState {
    pub fn is_loading(&self) -> bool {
        matches!(self, AnalysisState::Loading)
    }

    pub fn critique(&self) -> Option<&CritiqueResult> {
        match self {
            AnalysisState::Success(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AnalysisState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Which steps of the post-analysis upload sequence went through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AutoSaveReport {
    pub skipped: bool,
    pub score_saved: bool,
    pub portrait_saved: bool,
    pub result_saved: bool,
}
