//! Password credentials.
//!
//! New accounts get Argon2 PHC strings. Collections carried over from the
//! earlier Node service hold bcrypt hashes (`$2a$`/`$2b$`/`$2y$`) under
//! `passwordHash`; those still verify so existing users can sign in.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("stored credential is not a recognised hash: {0}")]
    Unrecognised(String),
    #[error("argon2 credential is malformed: {0}")]
    Argon2(argon2::password_hash::Error),
    #[error("bcrypt credential is malformed: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scheme {
    Argon2,
    Bcrypt,
}

fn scheme_of(stored: &str) -> Option<Scheme> {
    if stored.starts_with("$argon2") {
        Some(Scheme::Argon2)
    } else if ["$2a$", "$2b$", "$2y$"].iter().any(|p| stored.starts_with(p)) {
        Some(Scheme::Bcrypt)
    } else {
        None
    }
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// One-way comparison of a plain password against a stored credential.
///
/// `Ok(false)` is a mismatch; `Err` means the stored value itself is unusable.
pub fn verify_password(plain: &str, stored: &str) -> Result<bool, CredentialError> {
    match scheme_of(stored) {
        Some(Scheme::Argon2) => {
            let parsed = PasswordHash::new(stored).map_err(CredentialError::Argon2)?;
            Ok(Argon2::default()
                .verify_password(plain.as_bytes(), &parsed)
                .is_ok())
        }
        Some(Scheme::Bcrypt) => Ok(bcrypt::verify(plain, stored)?),
        None => {
            let prefix: String = stored.chars().take(4).collect();
            Err(CredentialError::Unrecognised(prefix))
        }
    }
}
