use actix_web::{web, Error, HttpResponse, Responder};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::instrument;
use validator::Validate;

use crate::{
    entities::{
        critique::AnalyzeRequest,
        media::{MediaKind, SaveResultResponse},
        submission::ImageSubmission,
        video::GenerateVideoRequest,
    },
    errors::AppError,
    imaging::crop::crop_to_aspect,
    utils::valid_user_id::valid_user_id,
    AppState,
};

#[instrument(skip_all, fields(mime_type = ?payload.mime_type))]
pub async fn analyze(
    state: web::Data<AppState>,
    payload: web::Json<AnalyzeRequest>,
) -> Result<impl Responder, Error> {
    payload.validate().map_err(AppError::from)?;

    let submission = ImageSubmission::from_data_url(&payload.image, payload.mime_type.as_deref())?;
    let critique = state.critique_handler
        .analyze(&submission).await
        .map_err(AppError::from)?;

    Ok(HttpResponse::Ok().json(critique))
}

#[instrument(skip_all)]
pub async fn generate_video(
    state: web::Data<AppState>,
    payload: web::Json<GenerateVideoRequest>,
) -> Result<impl Responder, Error> {
    let payload = payload.into_inner();
    let user_id = payload
        .user_id
        .as_ref()
        .and_then(|id| id.normalized())
        .ok_or_else(|| AppError::InvalidInput("User ID is required".to_string()))?;
    valid_user_id(&user_id)?;

    let submission = ImageSubmission::from_data_url(&payload.image, payload.mime_type.as_deref())?;

    let options = state.crop_options.clone();
    let portrait = web::block(move || crop_to_aspect(&submission.bytes, &options))
        .await
        .map_err(AppError::from)?
        .map_err(AppError::from)?;

    let video = state.critique_handler
        .generate_video(&STANDARD.encode(&portrait), "image/jpeg").await
        .map_err(AppError::from)?;

    let stored = state.results_handler
        .store_media(&user_id, MediaKind::Video, video).await?;
    tracing::info!(user_id = %user_id, url = %stored.url, "Video stored");

    Ok(HttpResponse::Ok().json(SaveResultResponse { success: true, url: stored.url }))
}
