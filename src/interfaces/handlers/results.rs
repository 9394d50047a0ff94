use actix_web::{web, Error, HttpResponse, Responder};
use tracing::instrument;

use crate::{entities::media::{GetImageQuery, SaveResultRequest}, AppState};

#[instrument(skip_all, fields(kind = ?payload.kind))]
pub async fn save_result(
    state: web::Data<AppState>,
    payload: web::Json<SaveResultRequest>,
) -> Result<impl Responder, Error> {
    let response = state.results_handler
        .save_result(payload.into_inner()).await?;

    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip_all)]
pub async fn get_rankings(state: web::Data<AppState>) -> Result<impl Responder, Error> {
    let response = state.results_handler.get_rankings().await?;

    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip(state))]
pub async fn get_image(
    state: web::Data<AppState>,
    query: web::Query<GetImageQuery>,
) -> Result<impl Responder, Error> {
    let response = state.results_handler
        .get_image(query.into_inner()).await?;

    Ok(HttpResponse::Ok().json(response))
}
