use actix_web::{http::header, web, Error, HttpResponse, Responder};

use crate::{errors::AppError, repositories::blob_store::BlobStore, AppState};

/// Serves stored objects so public URLs of the in-memory backend resolve.
pub async fn serve_blob(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<impl Responder, Error> {
    let pathname = path.into_inner();
    if pathname.split('/').any(|segment| segment.is_empty() || segment == "..") {
        return Err(AppError::InvalidInput("Invalid blob path".to_string()).into());
    }

    let store = &state.results_handler.blob_store;
    let object = store
        .head(&pathname).await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound("Blob not found".to_string()))?;

    let body = store.fetch(&object).await.map_err(AppError::from)?;
    let content_type = object
        .content_type
        .clone()
        .unwrap_or_else(|| "application/octet-stream".to_string());

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, content_type))
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .body(body))
}
