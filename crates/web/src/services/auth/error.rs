//! Authentication error types.

use nani_connect_core::EmailError;

use crate::db::RepositoryError;

/// Errors from authentication operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Email or password did not match a stored account. Deliberately
    /// indistinguishable between "no such user" and "wrong password".
    #[error("invalid email or password")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("an account with this email already exists")]
    UserAlreadyExists,

    /// The supplied password failed validation.
    #[error("{0}")]
    WeakPassword(String),

    /// The supplied email address is not valid.
    #[error("invalid email address: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password hashing or verification failed internally.
    #[error("password processing failed")]
    PasswordHash,

    /// Underlying repository error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
