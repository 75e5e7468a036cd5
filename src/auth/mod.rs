//! Authentication module for the One Stop Shop server
//!
//! Password hashing, token issue/validation, and resolving a bearer token
//! back to a stored user.

pub mod extractor;
pub mod handlers;
mod password;
mod service;
mod token;

pub use extractor::CurrentUser;
pub use password::{PasswordHasher, MAX_PASSWORD_BYTES};
pub use service::AuthService;
pub use token::{Claims, TokenIssuer};
