use actix_web::web;
use formwork_engine::{AuthoringService, Database};

pub mod auth;
pub mod config;
pub mod handlers;

pub type FormAuthoring = AuthoringService<Database>;

/// Register every route. Shared by the binary and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(handlers::health::health_check)
        .service(handlers::forms::list_forms)
        .service(handlers::forms::create_form)
        .service(handlers::forms::get_form)
        .service(handlers::forms::update_form)
        .service(handlers::forms::delete_form)
        .service(handlers::forms::set_form_active)
        .service(handlers::forms::duplicate_form)
        .service(handlers::fields::add_field)
        .service(handlers::fields::update_field)
        .service(handlers::fields::delete_field)
        .service(handlers::fields::move_field)
        .service(handlers::catalog::service_form)
        .service(handlers::catalog::offer_form)
        .service(handlers::submissions::create_submission)
        .service(handlers::submissions::list_submissions);
}
