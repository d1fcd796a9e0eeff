use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use secrecy::{ExposeSecret, Secret};

/// Hash a password with Argon2id and a fresh salt. The result is a PHC string.
pub fn hash_password(password: &Secret<String>) -> Result<String, anyhow::Error> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
}

/// Check a password against a stored PHC string.
///
/// A corrupt stored hash is an error; a mismatch is `Ok(false)`.
pub fn verify_password(password: &Secret<String>, stored_hash: &str) -> Result<bool, anyhow::Error> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {}", e))?;

    Ok(Argon2::default()
        .verify_password(password.expose_secret().as_bytes(), &parsed)
        .is_ok())
}
