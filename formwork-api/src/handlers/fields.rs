use super::form_error_response;
use crate::FormAuthoring;
use actix_web::{delete, post, put, web, HttpResponse, Responder};
use shared_types::{FieldDraft, FieldResponse, FieldUpdate, FormWithFields, MoveFieldRequest};

#[post("/forms/{form_id}/fields")]
pub async fn add_field(
    form_id: web::Path<i64>,
    draft: web::Json<FieldDraft>,
    authoring: web::Data<FormAuthoring>,
) -> impl Responder {
    match authoring.add_field(form_id.into_inner(), &draft).await {
        Ok(field) => HttpResponse::Created().json(FieldResponse { field }),
        Err(e) => form_error_response(e),
    }
}

#[put("/forms/{form_id}/fields/{field_id}")]
pub async fn update_field(
    path: web::Path<(i64, i64)>,
    update: web::Json<FieldUpdate>,
    authoring: web::Data<FormAuthoring>,
) -> impl Responder {
    let (form_id, field_id) = path.into_inner();
    match authoring.update_field(form_id, field_id, &update).await {
        Ok(field) => HttpResponse::Ok().json(FieldResponse { field }),
        Err(e) => form_error_response(e),
    }
}

#[delete("/forms/{form_id}/fields/{field_id}")]
pub async fn delete_field(
    path: web::Path<(i64, i64)>,
    authoring: web::Data<FormAuthoring>,
) -> impl Responder {
    let (form_id, field_id) = path.into_inner();
    match authoring.delete_field(form_id, field_id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => form_error_response(e),
    }
}

/// Move a field one step up or down; answers with the reordered form
#[post("/forms/{form_id}/fields/{field_id}/move")]
pub async fn move_field(
    path: web::Path<(i64, i64)>,
    request: web::Json<MoveFieldRequest>,
    authoring: web::Data<FormAuthoring>,
) -> impl Responder {
    let (form_id, field_id) = path.into_inner();
    let fields = match authoring
        .reorder_field(form_id, field_id, request.direction)
        .await
    {
        Ok(fields) => fields,
        Err(e) => return form_error_response(e),
    };

    match authoring.form_with_fields(form_id).await {
        Ok(with_fields) => HttpResponse::Ok().json(FormWithFields {
            form: with_fields.form,
            fields,
        }),
        Err(e) => form_error_response(e),
    }
}
