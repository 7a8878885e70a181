//! Argon2id `PasswordHasher` adapter.
//!
//! Hashing is CPU-bound, so both operations run on the blocking pool.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher as _, PasswordVerifier as _};
use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::PasswordDigest;
use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Argon2id with the crate's default parameters.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2PasswordHasher;

fn hash_blocking(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

fn verify_blocking(password: &str, encoded: &str) -> Result<bool, password_hash::Error> {
    let parsed = PasswordHash::new(encoded)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(err) => Err(err),
    }
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> Result<PasswordDigest, PasswordHashError> {
        let password = Zeroizing::new(password.to_owned());
        let encoded = tokio::task::spawn_blocking(move || hash_blocking(&password))
            .await
            .map_err(|err| PasswordHashError::hashing(err.to_string()))?
            .map_err(|err| PasswordHashError::hashing(err.to_string()))?;
        Ok(PasswordDigest::new(encoded))
    }

    async fn verify(
        &self,
        password: &str,
        digest: &PasswordDigest,
    ) -> Result<bool, PasswordHashError> {
        let password = Zeroizing::new(password.to_owned());
        let encoded = digest.as_str().to_owned();
        tokio::task::spawn_blocking(move || verify_blocking(&password, &encoded))
            .await
            .map_err(|err| PasswordHashError::hashing(err.to_string()))?
            .map_err(|err| PasswordHashError::hashing(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hashes_verify_and_reject_wrong_passwords() {
        let hasher = Argon2PasswordHasher;
        let digest = hasher.hash("correct horse").await.expect("hash");

        assert!(digest.as_str().starts_with("$argon2id$"));
        assert!(hasher.verify("correct horse", &digest).await.expect("verify"));
        assert!(!hasher.verify("battery staple", &digest).await.expect("verify"));
    }

    #[tokio::test]
    async fn salts_differ_between_hashes() {
        let hasher = Argon2PasswordHasher;
        let first = hasher.hash("same").await.expect("hash");
        let second = hasher.hash("same").await.expect("hash");
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn malformed_digest_is_an_error() {
        let err = Argon2PasswordHasher
            .verify("pw", &PasswordDigest::new("not-a-phc-string"))
            .await
            .expect_err("malformed digest");
        assert!(matches!(err, PasswordHashError::Hashing { .. }));
    }
}
