use std::sync::Arc;

use chrono::Duration;
use tracing::{info, warn};

use crate::auth::password::PasswordHasher;
use crate::auth::token::TokenIssuer;
use crate::config::AuthConfig;
use crate::error::{AppError, AuthError, StoreError};
use crate::store::{User, UserStore};

/// Verified against when a login names an unknown email, so that path costs
/// one bcrypt comparison like every other login.
const TIMING_DECOY_PASSWORD: &str = "onestop-timing-decoy";

pub struct AuthService {
    users: Arc<UserStore>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
    token_ttl: Duration,
    decoy_hash: String,
}

impl AuthService {
    pub async fn new(
        users: Arc<UserStore>,
        hasher: PasswordHasher,
        tokens: TokenIssuer,
        token_ttl: Duration,
    ) -> Result<Self, AppError> {
        let decoy_hash = hash_blocking(hasher, TIMING_DECOY_PASSWORD.to_string()).await?;

        Ok(Self {
            users,
            hasher,
            tokens,
            token_ttl,
            decoy_hash,
        })
    }

    pub async fn from_config(users: Arc<UserStore>, config: &AuthConfig) -> Result<Self, AppError> {
        Self::new(
            users,
            PasswordHasher::new(config.bcrypt_cost),
            TokenIssuer::from_config(config)?,
            config.token_ttl(),
        )
        .await
    }

    /// Check credentials and mint an access token for the user.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<String, AppError> {
        let (hash, user) = match self.users.lookup(email).await {
            Ok(user) => (user.password_hash.clone(), Some(user)),
            Err(StoreError::NotFound) => (self.decoy_hash.clone(), None),
            Err(e) => return Err(e.into()),
        };

        let verified = verify_blocking(self.hasher, password.to_string(), hash).await?;

        match user {
            Some(user) if verified => {
                let token = self.tokens.issue(&user.email, self.token_ttl)?;
                info!("Issued access token for {}", user.email);
                Ok(token)
            }
            _ => {
                warn!("Rejected credentials for {}", email);
                Err(AuthError::InvalidCredentials.into())
            }
        }
    }

    /// Create a new account. Reports `StoreError::AlreadyExists` for a taken email.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<User, AppError> {
        validate_registration(email, password, display_name)?;

        // Skip the expensive hash when the answer is already known; the
        // insert below still decides races.
        if self.users.contains(email).await {
            return Err(StoreError::AlreadyExists.into());
        }

        let hash = hash_blocking(self.hasher, password.to_string()).await?;
        let user = self.users.insert(email, display_name, hash).await?;
        info!("Registered user {}", user.email);
        Ok(user)
    }

    /// Turn a bearer token into the user it names. A valid token whose subject
    /// is not in the store is reported exactly like a forged one.
    pub async fn resolve(&self, token: &str) -> Result<User, AuthError> {
        let subject = self.tokens.validate(token)?;

        self.users.lookup(&subject).await.map_err(|_| {
            warn!("Token subject {} has no matching user", subject);
            AuthError::InvalidToken
        })
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }
}

fn validate_registration(email: &str, password: &str, display_name: &str) -> Result<(), AppError> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(AppError::ValidationError("a valid email is required".into()));
    }
    if password.is_empty() {
        return Err(AppError::ValidationError("password must not be empty".into()));
    }
    if display_name.trim().is_empty() {
        return Err(AppError::ValidationError("full name must not be empty".into()));
    }
    Ok(())
}

async fn hash_blocking(hasher: PasswordHasher, password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hasher.hash(&password)).await?
}

async fn verify_blocking(
    hasher: PasswordHasher,
    password: String,
    hash: String,
) -> Result<bool, AppError> {
    Ok(tokio::task::spawn_blocking(move || hasher.verify(&password, &hash)).await?)
}
