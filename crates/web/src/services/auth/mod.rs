//! Authentication service.
//!
//! Email/password registration and login with Argon2id hashing. The role
//! is fixed at sign-up and never changes afterwards; sellers may attach a
//! location at the same time.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use nani_connect_core::{Coordinates, Email, Role};

use crate::db::{RepositoryError, users::UserRepository};
use crate::models::user::User;

mod error;

pub use error::AuthError;

/// Minimum password length accepted at registration.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Service for user authentication.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: UserRepository<'a>) -> Self {
        Self { users }
    }

    /// Register a new account.
    ///
    /// Coordinates are only meaningful for sellers but harmless for
    /// buyers; callers pass whatever the sign-up form collected.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` for a malformed address,
    /// `AuthError::WeakPassword` when the password fails validation, and
    /// `AuthError::UserAlreadyExists` when the email is taken.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        role: Role,
        coordinates: Option<Coordinates>,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        self.users
            .create(&email, &password_hash, role, coordinates)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Log a user in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` when the email is unknown
    /// or the password does not match.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let Some((user, stored_hash)) = self.users.get_with_password_hash(&email).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        if verify_password(password, &stored_hash)? {
            Ok(user)
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

/// Hash a password with Argon2id and a fresh random salt.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored PHC-format hash.
fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| AuthError::PasswordHash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Reject passwords that are too short.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_short_password_rejected() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_minimum_length_password_accepted() {
        assert!(validate_password("12345678").is_ok());
    }

    #[test]
    fn test_garbage_hash_fails_closed() {
        assert!(verify_password("anything", "not-a-phc-hash").is_err());
    }
}
