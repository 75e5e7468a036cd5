use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;

use crate::error::{AppError, AuthError};
use crate::store::User;
use crate::AppState;

/// The user behind the request's bearer token. Adding this as a handler
/// argument makes the route require authentication.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl std::ops::Deref for CurrentUser {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let state = state
                .ok_or_else(|| AppError::InternalError("application state not configured".into()))?;
            let token = token.ok_or(AuthError::MissingToken)?;
            let user = state.auth_service.resolve(&token).await?;
            Ok(CurrentUser(user))
        })
    }
}

/// Token from an `Authorization: Bearer <token>` header. The scheme name is
/// matched case-insensitively.
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token.to_string())
    } else {
        None
    }
}
