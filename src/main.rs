use actix_web::{web, App, HttpServer};
use onestop_server::config::{DEVELOPMENT_SECRET, JWT_SECRET_ENV};
use onestop_server::{configure, cors, AppError, AppState, Settings};
use dotenv::dotenv;
use std::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> onestop_server::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    // Load configuration
    let config = Settings::new()?;
    info!("Configuration loaded successfully ({})", config.environment);

    if config.auth.jwt_secret == DEVELOPMENT_SECRET {
        warn!("Using the built-in development signing secret; set {}", JWT_SECRET_ENV);
    }

    // Initialize application state
    let state = web::Data::new(AppState::new(config.clone()).await?);

    let listener = TcpListener::bind(format!("{}:{}", config.server.host, config.server.port))?;
    info!("Starting server at {}:{}", config.server.host, config.server.port);

    let workers = config.server.workers as usize;
    let cors_config = config.cors.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(cors(&cors_config))
            .app_data(state.clone())
            .configure(configure)
    })
    .listen(listener)?
    .workers(workers)
    .run()
    .await
    .map_err(|e| AppError::InternalError(e.to_string()))?;

    Ok(())
}
