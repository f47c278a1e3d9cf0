//! Link share passwords, stored as Argon2id PHC strings.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use cumulus_core::error::AppError;

/// Hashes and checks the passwords protecting public links.
#[derive(Debug, Clone, Default)]
pub struct LinkPasswordHasher {
    argon: Argon2<'static>,
}

impl LinkPasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// PHC string for `plain` with a fresh salt.
    pub fn hash(&self, plain: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon
            .hash_password(plain.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::internal(format!("Cannot hash link password: {e}")))
    }

    /// Whether `plain` matches the stored PHC string. A malformed stored
    /// value is an error, a wrong password is `Ok(false)`.
    pub fn verify(&self, plain: &str, stored: &str) -> Result<bool, AppError> {
        let parsed = PasswordHash::new(stored)
            .map_err(|e| AppError::internal(format!("Stored link password is malformed: {e}")))?;

        match self.argon.verify_password(plain.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!("Cannot verify link password: {e}"))),
        }
    }
}
