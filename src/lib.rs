pub mod auth;
pub mod config;
pub mod error;
pub mod stories;
pub mod store;

use std::sync::Arc;
use actix_cors::Cors;
use actix_web::{web, HttpResponse};
use tracing::info;

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use auth::{AuthService, CurrentUser, PasswordHasher, TokenIssuer};
pub use stories::Story;
pub use store::{User, UserProfile, UserStore};

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Welcome to the ONE STOP SHOP API!"
    }))
}

/// Registers every route. Shared by `main` and the HTTP tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(root))
        .route("/health", web::get().to(health_check))
        .route("/token", web::post().to(auth::handlers::login))
        .route("/signup", web::post().to(auth::handlers::signup))
        .route("/users/me", web::get().to(auth::handlers::me))
        .route("/stories", web::get().to(stories::list_stories));
}

pub fn cors(config: &config::CorsConfig) -> Cors {
    if !config.enabled {
        // CORS disabled - use most restrictive settings
        return Cors::default();
    }

    let cors = if config.allow_any_origin {
        Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .expose_any_header()
            .supports_credentials()
    } else {
        config
            .allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
    };

    cors.max_age(config.max_age as usize)
}

/// Application state shared across all components
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub users: Arc<UserStore>,
    pub auth_service: Arc<AuthService>,
    pub stories: Arc<Vec<Story>>,
}

impl AppState {
    pub async fn new(config: Settings) -> Result<Self> {
        let users = Arc::new(UserStore::new());
        let auth_service = AuthService::from_config(users.clone(), &config.auth).await?;

        if config.seed.enabled {
            let seed = &config.seed;
            auth_service
                .register(&seed.email, &seed.password, &seed.display_name)
                .await?;
            info!("Seeded demo account {}", seed.email);
        }

        Ok(Self {
            config: Arc::new(config),
            users,
            auth_service: Arc::new(auth_service),
            stories: Arc::new(stories::seed_stories()),
        })
    }
}
