use actix_web::{http::StatusCode, HttpResponse};

pub fn json_error(status: StatusCode, error: &str) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({ "error": error }))
}

pub async fn method_not_allowed() -> HttpResponse {
    json_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

pub async fn not_found() -> HttpResponse {
    json_error(StatusCode::NOT_FOUND, "Resource not found")
}
