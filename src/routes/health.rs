use actix_web::{get, HttpResponse};
use chrono::Utc;
use crate::models::health::HealthResponse;

/// GET /health - Liveness du backend EduBridge (PUBLIC)
#[get("/health")]
pub async fn health_check() -> HttpResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        time: Utc::now(),
    };

    HttpResponse::Ok().json(response)
}
