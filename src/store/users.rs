use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::StoreError;
use crate::store::models::User;

/// Users keyed by email.
///
/// Lookups share a read guard; inserts take the write guard for both the
/// duplicate check and the insert, so two signups racing on one email
/// cannot both land.
#[derive(Debug, Default)]
pub struct UserStore {
    users: RwLock<HashMap<String, User>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lookup(&self, email: &str) -> Result<User, StoreError> {
        let users = self.users.read().await;
        users.get(email).cloned().ok_or(StoreError::NotFound)
    }

    pub async fn contains(&self, email: &str) -> bool {
        self.users.read().await.contains_key(email)
    }

    pub async fn insert(
        &self,
        email: &str,
        display_name: &str,
        password_hash: String,
    ) -> Result<User, StoreError> {
        let mut users = self.users.write().await;

        match users.entry(email.to_string()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists),
            Entry::Vacant(slot) => {
                let user = User::new(email.to_string(), display_name.to_string(), password_hash);
                slot.insert(user.clone());
                debug!("Stored user record for {}", email);
                Ok(user)
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}
