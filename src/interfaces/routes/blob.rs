use actix_web::web;

use crate::handlers::blob::serve_blob;


pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/blob/{pathname:.*}")
            .route(web::get().to(serve_blob))
    );
}
