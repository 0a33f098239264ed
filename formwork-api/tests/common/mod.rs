use actix_web::{test, web, App};
use formwork_api::auth::TokenPolicy;
use formwork_api::{configure, FormAuthoring};
use formwork_engine::Database;
use std::sync::Arc;

pub const TOKEN: &str = "test-session-token";

pub struct TestApp<S> {
    pub db: Arc<Database>,
    pub authoring: FormAuthoring,
    pub app: S,
}

pub fn setup_test_db() -> anyhow::Result<Database> {
    Database::in_memory()
}

pub async fn setup_test_app() -> anyhow::Result<
    TestApp<
        impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
    >,
> {
    let db = Arc::new(setup_test_db()?);
    let authoring = FormAuthoring::new(db.clone());
    let policy = TokenPolicy::new(vec![TOKEN.to_string()]);

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(authoring.clone()))
            .app_data(web::Data::new(policy))
            .configure(configure),
    )
    .await;

    Ok(TestApp { db, authoring, app })
}

#[allow(dead_code)]
pub fn bearer() -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", TOKEN))
}
