//! Password digest primitive: argon2id PHC strings.

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};

use crate::expends::error::Error;

/// Hash a plaintext password into a PHC-format digest.
pub fn hash(plain: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|digest| digest.to_string())
        .map_err(|err| Error::internal(anyhow::anyhow!("password hashing failed: {err}")))
}

/// Check a plaintext password against a stored digest.
/// A malformed digest verifies as false rather than erroring.
#[must_use]
pub fn verify(plain: &str, digest: &str) -> bool {
    PasswordHash::new(digest)
        .map(|parsed| {
            Argon2::default()
                .verify_password(plain.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
