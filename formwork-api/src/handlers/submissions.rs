use crate::auth::{AuthFailure, TokenPolicy};
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use formwork_engine::{Database, StorageError};
use shared_types::{ErrorResponse, Submission, SubmissionListResponse};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Receive a finished submission. Answers are stored as sent.
#[post("/submissions")]
pub async fn create_submission(
    req: HttpRequest,
    submission: web::Json<Submission>,
    db: web::Data<Arc<Database>>,
    policy: web::Data<TokenPolicy>,
) -> impl Responder {
    match policy.check(&req) {
        Ok(()) => {}
        Err(AuthFailure::Missing) => {
            warn!(form_id = submission.form_id, "Submission without bearer token");
            return HttpResponse::Unauthorized().json(ErrorResponse {
                error: "Missing bearer token".to_string(),
            });
        }
        Err(AuthFailure::Rejected) => {
            warn!(form_id = submission.form_id, "Submission with rejected token");
            return HttpResponse::Forbidden().json(ErrorResponse {
                error: "Session is not valid".to_string(),
            });
        }
    }

    match db.store_submission(&submission) {
        Ok(receipt) => {
            info!(
                form_id = submission.form_id,
                submission_id = receipt.submission_id,
                "Submission received"
            );
            HttpResponse::Created().json(receipt)
        }
        Err(StorageError::NotFound(message)) => HttpResponse::NotFound().json(ErrorResponse {
            error: format!("{} not found", message),
        }),
        Err(e) => {
            error!(error = %e, form_id = submission.form_id, "Failed to store submission");
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: format!("Failed to store submission: {}", e),
            })
        }
    }
}

#[get("/forms/{form_id}/submissions")]
pub async fn list_submissions(
    form_id: web::Path<i64>,
    db: web::Data<Arc<Database>>,
) -> impl Responder {
    let form_id = form_id.into_inner();
    match db.list_submissions(form_id) {
        Ok(submissions) => HttpResponse::Ok().json(SubmissionListResponse { submissions }),
        Err(e) => {
            error!(error = %e, form_id, "Failed to list submissions");
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: format!("Failed to list submissions: {}", e),
            })
        }
    }
}
