use async_trait::async_trait;

use crate::{
    entities::{
        critique::{CritiqueRequest, CritiqueResult},
        video::{VideoOperation, VideoRequest},
    },
    errors::GenAiError,
};

/// Hosted generative-AI service used for critiques and videos.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    fn has_credential(&self) -> bool;
    async fn generate_critique(&self, request: &CritiqueRequest) -> Result<CritiqueResult, GenAiError>;
    async fn start_video_job(&self, model: &str, request: &VideoRequest) -> Result<VideoOperation, GenAiError>;
    async fn poll_video_job(&self, operation_name: &str) -> Result<VideoOperation, GenAiError>;
    async fn download_video(&self, uri: &str) -> Result<Vec<u8>, GenAiError>;
}
