use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Contents of a user's `score.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub score: f64,
    #[serde(default)]
    pub user_name: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub user_id: String,
    pub user_name: Option<String>,
    pub score: f64,
    pub updated_at: DateTime<Utc>,
}

impl RankingEntry {
    pub fn from_record(user_id: impl Into<String>, record: ScoreRecord) -> Self {
        RankingEntry {
            user_id: user_id.into(),
            user_name: record.user_name,
            score: record.score,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingsResponse {
    pub rankings: Vec<RankingEntry>,
}

/// Highest score first. The sort is stable, so ties keep their listing order.
pub fn sort_rankings(entries: &mut [RankingEntry]) {
    entries.sort_by(|a, b| b.score.total_cmp(&a.score));
}
