//! Password hashing and verification.
use crate::error::AppError;

/// bcrypt ignores everything past this many bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Salted bcrypt hashing. The salt is generated per call and embedded in the
/// returned string, so equal passwords never share a hash.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a password. Rejects input bcrypt would silently truncate.
    pub fn hash(&self, plain: &str) -> Result<String, AppError> {
        if plain.len() > MAX_PASSWORD_BYTES {
            return Err(AppError::ValidationError(format!(
                "password must be at most {} bytes",
                MAX_PASSWORD_BYTES
            )));
        }
        Ok(bcrypt::hash(plain, self.cost)?)
    }

    /// Verify a password against a stored hash. Malformed hashes never verify.
    pub fn verify(&self, plain: &str, hash: &str) -> bool {
        // No stored hash can come from an over-long password.
        if plain.len() > MAX_PASSWORD_BYTES {
            return false;
        }
        bcrypt::verify(plain, hash).unwrap_or(false)
    }
}
