//! Argon2id password storage.

use argon2::Argon2;
use argon2::password_hash::{
    self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
};

use yatube_core::ports::{AuthError, PasswordHasher};

/// Stores passwords as PHC strings (`$argon2id$v=19$...`).
#[derive(Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        Ok(self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::BadHash(e.to_string()))?
            .to_string())
    }

    fn verify(&self, password: &str, stored: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(stored).map_err(|e| AuthError::BadHash(e.to_string()))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::BadHash(e.to_string())),
        }
    }
}
