use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;

use crate::{
    constants::{SCORE_FILE_NAME, SCORE_MAX, SCORE_MIN},
    entities::{
        media::{latest_version, GetImageQuery, ImageUrlResponse, MediaKind, SaveResultRequest, SaveResultResponse, StoredObject},
        ranking::{sort_rankings, RankingEntry, RankingsResponse, ScoreRecord},
    },
    errors::AppError,
    repositories::{blob_store::BlobStore, result_sink::ResultSink},
    settings::OverwritePolicy,
    utils::{data_url::decode_base64_payload, valid_user_id::valid_user_id},
};

const MAX_VERSION_ATTEMPTS: u32 = 32;

/// Reads and writes per-user results in the blob store.
pub struct ResultsHandler<B>
where
    B: BlobStore,
{
    pub blob_store: B,
    namespace: String,
    policy: OverwritePolicy,
}

impl<B> ResultsHandler<B>
where
    B: BlobStore,
{
    pub fn new(blob_store: B, namespace: &str, policy: OverwritePolicy) -> Self {
        ResultsHandler {
            blob_store,
            namespace: namespace.trim_matches('/').to_string(),
            policy,
        }
    }

    fn user_prefix(&self, user_id: &str) -> String {
        format!("{}/{}/", self.namespace, user_id)
    }

    /// Handles `POST /api/save-result`.
    pub async fn save_result(&self, request: SaveResultRequest) -> Result<SaveResultResponse, AppError> {
        let user_id = request
            .user_id()
            .ok_or_else(|| AppError::InvalidInput("User ID is required".to_string()))?;
        let user_id = valid_user_id(&user_id)?;

        if request.kind.as_deref() == Some("score") {
            if let Some(score) = request.score {
                let stored = self.save_score(user_id, score, request.user_name.as_deref()).await?;
                return Ok(SaveResultResponse { success: true, url: stored.url });
            }
        }

        let (kind, payload) = match (&request.image, &request.video) {
            (Some(image), _) => {
                let kind = request
                    .kind
                    .as_deref()
                    .and_then(MediaKind::parse)
                    .filter(|k| matches!(k, MediaKind::UpperBody | MediaKind::Result))
                    .ok_or_else(|| AppError::InvalidInput("Invalid image type for saving.".to_string()))?;
                (kind, image)
            }
            (None, Some(video)) => (MediaKind::Video, video),
            (None, None) => return Err(AppError::InvalidInput("No media data provided".to_string())),
        };

        let bytes = decode_base64_payload(payload)
            .map_err(|e| AppError::InvalidInput(format!("Invalid media payload: {}", e)))?;

        let stored = self.store_media(user_id, kind, bytes).await?;
        tracing::info!(user_id, kind = kind.as_str(), pathname = %stored.pathname, "Media saved");

        Ok(SaveResultResponse { success: true, url: stored.url })
    }

    async fn save_score(&self, user_id: &str, score: f64, user_name: Option<&str>) -> Result<StoredObject, AppError> {
        if !score.is_finite() || !(SCORE_MIN..=SCORE_MAX).contains(&score) {
            return Err(AppError::InvalidInput(format!(
                "Score must be between {} and {}",
                SCORE_MIN, SCORE_MAX
            )));
        }

        let record = ScoreRecord {
            score,
            user_name: user_name.map(str::trim).filter(|n| !n.is_empty()).map(String::from),
            updated_at: Utc::now(),
        };
        let body = serde_json::to_vec(&record).map_err(|e| AppError::InternalError(e.to_string()))?;

        let pathname = format!("{}{}", self.user_prefix(user_id), SCORE_FILE_NAME);
        let stored = self.blob_store.put(&pathname, body, "application/json").await?;
        tracing::info!(user_id, score, "Score saved");

        Ok(stored)
    }

    /// Writes a media object under the user's namespace following the overwrite policy.
    pub async fn store_media(&self, user_id: &str, kind: MediaKind, bytes: Vec<u8>) -> Result<StoredObject, AppError> {
        let user_id = valid_user_id(user_id)?;
        let existing = self.blob_store.list(&self.user_prefix(user_id)).await?;
        let latest = latest_version(&existing, kind).map(|(version, _)| version);

        if self.policy == OverwritePolicy::Overwrite {
            let pathname = format!("{}{}", self.user_prefix(user_id), kind.file_name(latest.unwrap_or(1)));
            return Ok(self.blob_store.put(&pathname, bytes, kind.content_type()).await?);
        }

        // Another writer may claim the same name between list and put.
        let first = latest.map_or(1, |v| v + 1);
        for version in first..first + MAX_VERSION_ATTEMPTS {
            let pathname = format!("{}{}", self.user_prefix(user_id), kind.file_name(version));
            match self.blob_store.put_if_absent(&pathname, bytes.clone(), kind.content_type()).await? {
                Some(stored) => return Ok(stored),
                None => tracing::debug!(user_id, %pathname, "Version taken, trying the next one"),
            }
        }

        Err(AppError::InternalError(format!(
            "No free version slot for {} after {} attempts",
            kind.as_str(),
            MAX_VERSION_ATTEMPTS
        )))
    }

    /// Handles `GET /api/get-rankings`.
    pub async fn get_rankings(&self) -> Result<RankingsResponse, AppError> {
        let objects = self.blob_store.list(&format!("{}/", self.namespace)).await?;

        let score_files: Vec<(String, StoredObject)> = objects
            .into_iter()
            .filter_map(|object| {
                let segments: Vec<&str> = object.pathname.split('/').collect();
                match segments.as_slice() {
                    [_, user_id, file] if *file == SCORE_FILE_NAME && !user_id.is_empty() => {
                        Some((user_id.to_string(), object.clone()))
                    }
                    _ => None,
                }
            })
            .collect();

        let reads = score_files.iter().map(|(user_id, object)| async move {
            let body = self.blob_store.fetch(object).await.map_err(|e| e.to_string())?;
            let record: ScoreRecord = serde_json::from_slice(&body).map_err(|e| e.to_string())?;
            Ok::<_, String>(RankingEntry::from_record(user_id.as_str(), record))
        });

        let mut rankings: Vec<RankingEntry> = join_all(reads)
            .await
            .into_iter()
            .zip(score_files.iter())
            .filter_map(|(result, (user_id, _))| match result {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!(user_id = %user_id, "Skipping unreadable score file: {}", e);
                    None
                }
            })
            .collect();

        sort_rankings(&mut rankings);
        Ok(RankingsResponse { rankings })
    }

    /// Handles `GET /api/get-image`.
    pub async fn get_image(&self, query: GetImageQuery) -> Result<ImageUrlResponse, AppError> {
        let (user_id, image_type) = match (
            query.user_id.as_deref().map(str::trim).filter(|s| !s.is_empty()),
            query.image_type.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        ) {
            (Some(user_id), Some(image_type)) => (user_id, image_type),
            _ => return Err(AppError::InvalidInput("User ID and imageType are required".to_string())),
        };

        let kind = MediaKind::parse(image_type)
            .ok_or_else(|| AppError::InvalidInput("Invalid imageType".to_string()))?;
        let user_id = valid_user_id(user_id)?;

        let objects = self.blob_store.list(&self.user_prefix(user_id)).await?;
        latest_version(&objects, kind)
            .map(|(_, object)| ImageUrlResponse { url: object.url.clone() })
            .ok_or_else(|| AppError::NotFound("Image not found for this user.".to_string()))
    }
}

#[async_trait]
impl<B> ResultSink for ResultsHandler<B>
where
    B: BlobStore,
{
    async fn save(&self, request: &SaveResultRequest) -> Result<SaveResultResponse, AppError> {
        self.save_result(request.clone()).await
    }
}
