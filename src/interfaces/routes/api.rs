use actix_web::web;

use crate::handlers::{critique, json_error::method_not_allowed, results};


pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/save-result")
            .route(web::post().to(results::save_result))
            .default_service(web::to(method_not_allowed))
    )
    .service(
        web::resource("/get-rankings")
            .route(web::get().to(results::get_rankings))
            .default_service(web::to(method_not_allowed))
    )
    .service(
        web::resource("/get-image")
            .route(web::get().to(results::get_image))
            .default_service(web::to(method_not_allowed))
    )
    .service(
        web::resource("/analyze")
            .route(web::post().to(critique::analyze))
            .default_service(web::to(method_not_allowed))
    )
    .service(
        web::resource("/generate-video")
            .route(web::post().to(critique::generate_video))
            .default_service(web::to(method_not_allowed))
    );
}
