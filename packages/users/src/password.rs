// ABOUTME: Password hashing with Argon2
// ABOUTME: Only hashes are ever persisted

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;
use docuapp_storage::StorageError;

/// Hash a plaintext password into a PHC string
pub fn hash_password(password: &str) -> Result<String, StorageError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StorageError::Database(format!("Failed to hash password: {}", e)))
}
