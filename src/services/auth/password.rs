//! Argon2id password hashing.
//!
//! Hashing and verification are CPU-bound, so both run on tokio's blocking
//! pool instead of the request task.
use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        self, PasswordHash as PhcHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
        rand_core::OsRng,
    },
};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing error: {0}")]
    Hash(String),
    #[error("hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<password_hash::Error> for PasswordError {
    fn from(e: password_hash::Error) -> Self {
        PasswordError::Hash(e.to_string())
    }
}

/// Plaintext password as received from a client. Never printed.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    #[cfg(test)]
    pub fn new(plain: impl Into<String>) -> Self {
        Self(plain.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// PHC-format hash, the only password form the repository accepts.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

#[derive(Clone, Debug)]
pub struct PasswordHasher {
    params: Params,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher {
    /// argon2 crate defaults (19 MiB, 2 iterations, 1 lane).
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    #[cfg(test)]
    pub fn with_params(params: Params) -> Self {
        Self { params }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub async fn hash(&self, password: Password) -> Result<PasswordHash, PasswordError> {
        let argon2 = self.argon2();
        tokio::task::spawn_blocking(move || -> Result<PasswordHash, PasswordError> {
            let salt = SaltString::generate(&mut OsRng);
            let hash = argon2.hash_password(password.expose().as_bytes(), &salt)?;
            Ok(PasswordHash(hash.to_string()))
        })
        .await?
    }

    /// `Ok(false)` for a wrong password. A stored hash that does not parse is an error.
    pub async fn verify(&self, password: Password, stored: String) -> Result<bool, PasswordError> {
        let argon2 = self.argon2();
        tokio::task::spawn_blocking(move || -> Result<bool, PasswordError> {
            let parsed = PhcHash::new(&stored)?;
            match argon2.verify_password(password.expose().as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(password_hash::Error::Password) => Ok(false),
                Err(e) => Err(e.into()),
            }
        })
        .await?
    }

    /// Same argon2 cost as `verify`, for a login whose account does not exist.
    /// Always `Ok(false)`.
    pub async fn verify_absent(&self, password: Password) -> Result<bool, PasswordError> {
        self.hash(password).await.map(|_| false)
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> PasswordHasher {
    // 最小パラメータ (テスト高速化)
    PasswordHasher::with_params(Params::new(Params::MIN_M_COST, 1, 1, None).unwrap())
}
