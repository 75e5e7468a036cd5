use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use jsonwebtoken::Algorithm;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Secret used when nothing else is configured. Fine for local runs only.
pub const DEVELOPMENT_SECRET: &str = "YOUR_SUPER_SECRET_KEY_CHANGE_ME";

/// Environment variable that overrides `auth.jwt_secret`.
pub const JWT_SECRET_ENV: &str = "APP_AUTH__JWT_SECRET";

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_algorithm: String,
    pub token_expiry_minutes: i64,
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    /// Signing algorithm, restricted to the HMAC family.
    pub fn algorithm(&self) -> Result<Algorithm, ConfigError> {
        let algorithm = Algorithm::from_str(&self.jwt_algorithm).map_err(|_| {
            ConfigError::Message(format!("unknown token algorithm: {}", self.jwt_algorithm))
        })?;

        match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
            other => Err(ConfigError::Message(format!(
                "token algorithm must be HMAC based, got {:?}",
                other
            ))),
        }
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.token_expiry_minutes)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub enabled: bool,
    pub allow_any_origin: bool,
    pub allowed_origins: Vec<String>,
    pub max_age: u32,
}

/// Demo account inserted at startup.
#[derive(Debug, Deserialize, Clone)]
pub struct SeedConfig {
    pub enabled: bool,
    pub email: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub environment: String,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
    pub seed: SeedConfig,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let settings: Settings = Self::defaults()?
            // Add in settings from the config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // E.g., `APP_SERVER__PORT=5001` would set `Settings.server.port`
            .add_source(Self::environment())
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Deterministic settings for tests: no files, no environment, cheapest hash cost.
    pub fn new_for_test() -> Result<Self, ConfigError> {
        let settings: Settings = Self::defaults()?
            .set_override("environment", "test")?
            .set_override("auth.jwt_secret", "test_secret")?
            .set_override("auth.bcrypt_cost", 4)?
            .set_override("server.workers", 1)?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("environment", "development")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("auth.jwt_secret", DEVELOPMENT_SECRET)?
            .set_default("auth.jwt_algorithm", "HS256")?
            .set_default("auth.token_expiry_minutes", 30)?
            .set_default("auth.bcrypt_cost", bcrypt::DEFAULT_COST as i64)?
            .set_default("cors.enabled", true)?
            .set_default("cors.allow_any_origin", true)?
            .set_default("cors.allowed_origins", Vec::<String>::new())?
            .set_default("cors.max_age", 3600)?
            .set_default("seed.enabled", true)?
            .set_default("seed.email", "test@onestop.shop")?
            .set_default("seed.password", "password123")?
            .set_default("seed.display_name", "Test User")
    }

    fn environment() -> Environment {
        Environment::with_prefix("app")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::Message("auth.jwt_secret must not be empty".into()));
        }
        self.auth.algorithm()?;
        if self.auth.token_expiry_minutes <= 0 {
            return Err(ConfigError::Message(
                "auth.token_expiry_minutes must be positive".into(),
            ));
        }
        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err(ConfigError::Message(format!(
                "auth.bcrypt_cost must be between 4 and 31, got {}",
                self.auth.bcrypt_cost
            )));
        }
        Ok(())
    }
}
