pub mod catalog;
pub mod fields;
pub mod forms;
pub mod health;
pub mod submissions;

use actix_web::HttpResponse;
use formwork_engine::{FormError, StorageError};
use shared_types::ErrorResponse;
use tracing::{error, warn};

/// Map an authoring error onto a status code and log it
pub(crate) fn form_error_response(e: FormError) -> HttpResponse {
    match e {
        FormError::Validation(message) => {
            warn!(error = %message, "Rejected invalid request");
            HttpResponse::BadRequest().json(ErrorResponse { error: message })
        }
        FormError::NotFound(message) | FormError::Storage(StorageError::NotFound(message)) => {
            warn!(error = %message, "Resource not found");
            HttpResponse::NotFound().json(ErrorResponse {
                error: format!("{} not found", message),
            })
        }
        FormError::Storage(e) => {
            error!(error = %e, "Storage failure");
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: format!("Storage failure: {}", e),
            })
        }
    }
}
