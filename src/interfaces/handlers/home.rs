use actix_web::{get, HttpResponse, Responder};

#[get("/")]
pub async fn home() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Welcome to the Fashion King API!",
        "status": "Ok",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "POST /api/analyze",
            "POST /api/generate-video",
            "POST /api/save-result",
            "GET /api/get-rankings",
            "GET /api/get-image",
            "GET /health"
        ]
    }))
}
