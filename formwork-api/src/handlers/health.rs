use actix_web::{get, HttpResponse, Responder};
use shared_types::ServerStatus;

#[get("/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(ServerStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
