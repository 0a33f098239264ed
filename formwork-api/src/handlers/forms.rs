use super::form_error_response;
use crate::FormAuthoring;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use shared_types::{FormDraft, FormFilter, FormListResponse, FormResponse, SetActiveRequest};
use tracing::info;

#[get("/forms")]
pub async fn list_forms(
    filter: web::Query<FormFilter>,
    authoring: web::Data<FormAuthoring>,
) -> impl Responder {
    match authoring.list_forms(&filter).await {
        Ok(forms) => HttpResponse::Ok().json(FormListResponse { forms }),
        Err(e) => form_error_response(e),
    }
}

#[post("/forms")]
pub async fn create_form(
    draft: web::Json<FormDraft>,
    authoring: web::Data<FormAuthoring>,
) -> impl Responder {
    info!(title = %draft.title, "Creating form");
    match authoring.create_form(&draft).await {
        Ok(form) => HttpResponse::Created().json(FormResponse { form }),
        Err(e) => form_error_response(e),
    }
}

/// Form with its fields in render order
#[get("/forms/{form_id}")]
pub async fn get_form(
    form_id: web::Path<i64>,
    authoring: web::Data<FormAuthoring>,
) -> impl Responder {
    match authoring.form_with_fields(form_id.into_inner()).await {
        Ok(form) => HttpResponse::Ok().json(form),
        Err(e) => form_error_response(e),
    }
}

#[put("/forms/{form_id}")]
pub async fn update_form(
    form_id: web::Path<i64>,
    draft: web::Json<FormDraft>,
    authoring: web::Data<FormAuthoring>,
) -> impl Responder {
    match authoring.update_form(form_id.into_inner(), &draft).await {
        Ok(form) => HttpResponse::Ok().json(FormResponse { form }),
        Err(e) => form_error_response(e),
    }
}

#[delete("/forms/{form_id}")]
pub async fn delete_form(
    form_id: web::Path<i64>,
    authoring: web::Data<FormAuthoring>,
) -> impl Responder {
    match authoring.delete_form(form_id.into_inner()).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => form_error_response(e),
    }
}

#[put("/forms/{form_id}/active")]
pub async fn set_form_active(
    form_id: web::Path<i64>,
    request: web::Json<SetActiveRequest>,
    authoring: web::Data<FormAuthoring>,
) -> impl Responder {
    match authoring
        .set_active(form_id.into_inner(), request.active)
        .await
    {
        Ok(form) => HttpResponse::Ok().json(FormResponse { form }),
        Err(e) => form_error_response(e),
    }
}

#[post("/forms/{form_id}/duplicate")]
pub async fn duplicate_form(
    form_id: web::Path<i64>,
    authoring: web::Data<FormAuthoring>,
) -> impl Responder {
    match authoring.duplicate_form(form_id.into_inner()).await {
        Ok(copy) => HttpResponse::Created().json(copy),
        Err(e) => form_error_response(e),
    }
}
