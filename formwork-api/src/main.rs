use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use clap::Parser;
use formwork_api::auth::TokenPolicy;
use formwork_api::config::ApiConfig;
use formwork_api::{configure, FormAuthoring};
use formwork_engine::Database;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the config file. Defaults to <config dir>/formwork/api.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the port from the config file
    #[arg(short, long)]
    port: Option<u16>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (mut config, config_path) = match args.config {
        Some(path) => ApiConfig::load_from(path)?,
        None => ApiConfig::load()?,
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_tracing(&config);
    info!(config = %config_path.display(), "Loaded configuration");

    let db = Arc::new(Database::new(&config.database.path)?);
    info!(path = %config.database.path.display(), "Opened form database");

    let authoring = FormAuthoring::new(db.clone())
        .with_duplicate_suffix(config.forms.duplicate_title_suffix.clone());
    let policy = TokenPolicy::new(config.auth.tokens.clone());
    let allowed_origins = config
        .cors
        .as_ref()
        .map(|c| c.allowed_origins.clone())
        .unwrap_or_default();

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting formwork-api server at http://{}", bind_addr);

    HttpServer::new(move || {
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(authoring.clone()))
            .app_data(web::Data::new(policy.clone()))
            .configure(configure)
    })
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}

fn init_tracing(config: &ApiConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout = tracing_subscriber::fmt::layer().with_target(false);

    match &config.logging {
        Some(logging) => {
            let appender = tracing_appender::rolling::daily(&logging.directory, "formwork-api.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stdout)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry().with(filter).with(stdout).init();
            None
        }
    }
}
