//! Password hashing and verification using argon2id.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};

use super::error::AuthError;

/// Hash a password using argon2id with a random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::HashingFailure(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored argon2id hash.
///
/// A mismatch is `Ok(false)`. A stored hash that cannot be used (bad PHC
/// string, unknown algorithm, invalid params) is `HashingFailure`.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AuthError::HashingFailure(e.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(e) => Err(AuthError::HashingFailure(e.to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("Abc12345!").unwrap();
        assert!(verify_password("Abc12345!", &hash).unwrap());
        assert!(!verify_password("wrongpassword", &hash).unwrap());
    }

    #[test]
    fn hash_never_contains_plaintext() {
        let hash = hash_password("Abc12345!").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("Abc12345!"));
    }

    #[test]
    fn same_password_salts_differently() {
        let h1 = hash_password("password1").unwrap();
        let h2 = hash_password("password1").unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn malformed_hash_is_hashing_failure() {
        let err = verify_password("anything", "not-a-phc-string").unwrap_err();
        assert!(matches!(err, AuthError::HashingFailure(_)));

        // Parses as PHC but the argon2 params are unusable.
        let hash = hash_password("Abc12345!").unwrap();
        let bad_params = hash.replacen("m=19456", "m=1", 1);
        assert_ne!(bad_params, hash);
        let result = verify_password("Abc12345!", &bad_params);
        assert!(matches!(result, Err(AuthError::HashingFailure(_))));

        // Parses as PHC but names an algorithm argon2 cannot verify.
        let foreign = hash.replacen("$argon2id$", "$scrypt$", 1);
        let result = verify_password("Abc12345!", &foreign);
        assert!(matches!(result, Err(AuthError::HashingFailure(_))));
    }
}
