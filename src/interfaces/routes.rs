use actix_web::web;

use crate::handlers::{home::home, json_error::not_found, system::health_check};

mod api;
mod blob;
pub mod json_error;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home);
    cfg.service(health_check);

    cfg.service(
        web::scope("/api")
            .configure(api::config_routes)
    );

    cfg.configure(blob::config_routes);
    cfg.default_service(web::to(not_found));
}
