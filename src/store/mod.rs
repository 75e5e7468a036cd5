//! In-memory user store for the One Stop Shop server
//!
//! Records live for the lifetime of the process. The store is built once at
//! startup and shared through `AppState`; nothing here is global.

pub mod models;
pub mod users;

pub use models::{User, UserProfile};
pub use users::UserStore;
