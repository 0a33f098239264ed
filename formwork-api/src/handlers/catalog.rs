use actix_web::{get, web, HttpResponse, Responder};
use formwork_engine::{CatalogLookup, Database};
use shared_types::{Carrier, CarrierFormResponse, ErrorResponse};
use std::sync::Arc;
use tracing::error;

#[get("/catalog/services/{service_id}/form")]
pub async fn service_form(
    service_id: web::Path<i64>,
    db: web::Data<Arc<Database>>,
) -> impl Responder {
    carrier_form(&db, Carrier::Service(service_id.into_inner())).await
}

#[get("/catalog/offers/{offer_id}/form")]
pub async fn offer_form(offer_id: web::Path<i64>, db: web::Data<Arc<Database>>) -> impl Responder {
    carrier_form(&db, Carrier::Offer(offer_id.into_inner())).await
}

/// A carrier without an active form answers `{"form": null}`
async fn carrier_form(db: &Database, carrier: Carrier) -> HttpResponse {
    match db.form_for_carrier(carrier).await {
        Ok(form) => HttpResponse::Ok().json(CarrierFormResponse { form }),
        Err(e) => {
            error!(error = %e, carrier = %carrier, "Catalog lookup failed");
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: format!("Failed to look up form: {}", e),
            })
        }
    }
}
