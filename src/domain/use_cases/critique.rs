use std::time::Duration;

use validator::Validate;

use crate::{
    entities::{
        critique::CritiqueResult,
        submission::ImageSubmission,
        video::{VideoOperation, VideoRequest},
    },
    errors::GenAiError,
    infrastructure::genai::prompts::NODDING_VIDEO_PROMPT,
    repositories::generative::GenerativeClient,
};

/// Runs analyses and video generations against a [`GenerativeClient`].
pub struct CritiqueHandler<G>
where
    G: GenerativeClient,
{
    pub client: G,
    video_models: Vec<String>,
    poll_interval: Duration,
}

impl<G> CritiqueHandler<G>
where
    G: GenerativeClient,
{
    pub fn new(client: G, video_models: Vec<String>, poll_interval: Duration) -> Self {
        CritiqueHandler {
            client,
            video_models,
            poll_interval,
        }
    }

    pub fn has_credential(&self) -> bool {
        self.client.has_credential()
    }

    /// One critique call. Failures are returned as-is, without retry.
    pub async fn analyze(&self, submission: &ImageSubmission) -> Result<CritiqueResult, GenAiError> {
        if !self.client.has_credential() {
            return Err(GenAiError::MissingCredential);
        }

        let critique = self.client.generate_critique(&submission.critique_request()).await?;
        critique
            .validate()
            .map_err(|e| GenAiError::Decode(e.to_string()))?;

        tracing::info!(total_score = critique.total_score, "Critique generated");
        Ok(critique)
    }

    /// Generates a video from the cropped portrait.
    ///
    /// Models are tried in order. Only a quota error moves on to the next model; any
    /// other failure ends the chain.
    pub async fn generate_video(&self, image_base64: &str, mime_type: &str) -> Result<Vec<u8>, GenAiError> {
        if !self.client.has_credential() {
            return Err(GenAiError::MissingCredential);
        }

        let request = VideoRequest {
            prompt: NODDING_VIDEO_PROMPT.to_string(),
            image_base64: image_base64.to_string(),
            mime_type: mime_type.to_string(),
        };

        let mut last_quota_error = None;
        for model in &self.video_models {
            match self.run_video_job(model, &request).await {
                Ok(video) => return Ok(video),
                Err(e) if e.is_quota() => {
                    tracing::warn!(model = %model, "Video model quota exhausted, trying next: {}", e);
                    last_quota_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_quota_error
            .unwrap_or_else(|| GenAiError::Failed("No video model is configured".to_string())))
    }

    async fn run_video_job(&self, model: &str, request: &VideoRequest) -> Result<Vec<u8>, GenAiError> {
        tracing::info!(model, "Starting video generation");
        let mut operation = self.client.start_video_job(model, request).await?;

        while !operation.done && operation.error.is_none() {
            tokio::time::sleep(self.poll_interval).await;
            let name = std::mem::take(&mut operation.name);
            operation = self.client.poll_video_job(&name).await?;
            if operation.name.is_empty() {
                operation.name = name;
            }
            tracing::debug!(model, done = operation.done, "Polled video operation");
        }

        let uri = finished_video_uri(operation)?;
        let video = self.client.download_video(&uri).await?;
        tracing::info!(model, bytes = video.len(), "Video downloaded");
        Ok(video)
    }
}

fn finished_video_uri(operation: VideoOperation) -> Result<String, GenAiError> {
    if let Some(message) = operation.error {
        return Err(GenAiError::classify(None, &message));
    }

    if operation.filtered_count > 0 {
        let reason = operation
            .filtered_reasons
            .into_iter()
            .next()
            .unwrap_or_else(|| "Content was filtered".to_string());
        return Err(GenAiError::SafetyBlocked(reason));
    }

    operation
        .video_uri
        .ok_or_else(|| GenAiError::Failed("Failed to retrieve the generated video URI.".to_string()))
}
