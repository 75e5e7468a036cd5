use actix_multipart::form::{text::Text, MultipartForm};
use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest, HttpResponse};
use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;
use tracing::{info, error};

/// OAuth2 password-grant form, sent either urlencoded or as
/// `multipart/form-data`. Other grant fields are accepted and ignored.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(MultipartForm)]
struct MultipartLoginForm {
    username: Text<String>,
    password: Text<String>,
}

impl FromRequest for LoginForm {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        if is_multipart(req) {
            let form = MultipartForm::<MultipartLoginForm>::from_request(req, payload);
            Box::pin(async move {
                let form = form.await?.into_inner();
                Ok(LoginForm {
                    username: form.username.0,
                    password: form.password.0,
                })
            })
        } else {
            let form = web::Form::<LoginForm>::from_request(req, payload);
            Box::pin(async move { Ok(form.await?.into_inner()) })
        }
    }
}

fn is_multipart(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,  // Seconds
}

impl TokenResponse {
    pub fn bearer(access_token: String, ttl: chrono::Duration) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: ttl.num_seconds(),
        }
    }
}

pub async fn login(
    form: LoginForm,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received login request for email: {}", form.username);
    let token = state.auth_service.authenticate(&form.username, &form.password).await?;
    let ttl = state.auth_service.token_ttl();
    Ok(HttpResponse::Ok().json(TokenResponse::bearer(token, ttl)))
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(alias = "fullName")]
    pub full_name: String,
}

pub async fn signup(
    req: web::Json<SignupRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received registration request for email: {}", req.email);

    match state.auth_service.register(&req.email, &req.password, &req.full_name).await {
        Ok(_) => Ok(HttpResponse::Created().json(serde_json::json!({
            "message": "Account created successfully! Please sign in."
        }))),
        Err(e) => {
            error!("Registration failed for email: {}: {}", req.email, e);
            Err(e)
        }
    }
}

pub async fn me(user: CurrentUser) -> HttpResponse {
    HttpResponse::Ok().json(user.profile())
}
