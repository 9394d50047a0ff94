use serde::{Deserialize, Serialize};

/// Client-visible progress of a video generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum VideoGenerationState {
    Idle,
    Generating,
    /// `url` is absent when the video was kept local only
    Completed {
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    Error { error: String },
}

/// Input of one generation job.
#[derive(Debug, Clone)]
pub struct VideoRequest {
    pub prompt: String,
    pub image_base64: String,
    pub mime_type: String,
}

/// Snapshot of a long-running generation job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoOperation {
    pub name: String,
    pub done: bool,
    pub error: Option<String>,
    pub filtered_count: u32,
    pub filtered_reasons: Vec<String>,
    pub video_uri: Option<String>,
}

/// Body of `POST /api/generate-video`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoRequest {
    pub user_id: Option<crate::entities::media::UserIdValue>,
    pub image: String,
    pub mime_type: Option<String>,
}
