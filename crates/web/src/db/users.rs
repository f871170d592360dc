//! User repository for database operations.
//!
//! Provides database access for accounts and the seller-profile listing
//! backing the nearby-sellers lookup.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use nani_connect_core::{Coordinates, Email, Role, UserId};

use super::RepositoryError;
use crate::models::user::{SellerProfile, User};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    role: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        // Role is a closed set; anything else in the column degrades to
        // buyer rather than poisoning the whole read.
        let (role, known) = Role::parse_lossy(&row.role);
        if !known {
            tracing::warn!(user_id = row.id, stored = %row.role, "unknown role, defaulting to buyer");
        }

        Ok(Self {
            id: UserId::new(row.id),
            email,
            role,
            coordinates: coordinates_from_columns(row.latitude, row.longitude),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Internal row type for seller profile queries.
#[derive(Debug, sqlx::FromRow)]
struct SellerRow {
    id: i32,
    email: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl From<SellerRow> for SellerProfile {
    fn from(row: SellerRow) -> Self {
        Self {
            id: UserId::new(row.id),
            // Email lookup is best-effort; a malformed address is dropped
            email: row.email.as_deref().and_then(|e| Email::parse(e).ok()),
            coordinates: coordinates_from_columns(row.latitude, row.longitude),
        }
    }
}

/// A location exists only when both columns are set.
const fn coordinates_from_columns(lat: Option<f64>, lon: Option<f64>) -> Option<Coordinates> {
    match (lat, lon) {
        (Some(latitude), Some(longitude)) => Some(Coordinates::new(latitude, longitude)),
        _ => None,
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user with email, password hash, role, and optional
    /// seller coordinates.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        password_hash: &str,
        role: Role,
        coordinates: Option<Coordinates>,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (email, password_hash, role, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, role, latitude, longitude, created_at, updated_at
            ",
        )
        .bind(email.as_str())
        .bind(password_hash)
        .bind(role.as_str())
        .bind(coordinates.map(|c| c.latitude))
        .bind(coordinates.map(|c| c.longitude))
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, email, role, latitude, longitude, created_at, updated_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, email, role, latitude, longitude, created_at, updated_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user together with their stored password hash, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct UserWithHashRow {
            #[sqlx(flatten)]
            user: UserRow,
            password_hash: String,
        }

        let row = sqlx::query_as::<_, UserWithHashRow>(
            r"
            SELECT id, email, role, latitude, longitude, created_at, updated_at,
                   password_hash
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => {
                let user: User = r.user.try_into()?;
                Ok(Some((user, r.password_hash)))
            }
            None => Ok(None),
        }
    }

    /// List all seller profiles, with best-effort email.
    ///
    /// Distance filtering happens in the caller; this returns every seller
    /// so the no-fix fallback can list coordinate-less sellers too.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_sellers(&self) -> Result<Vec<SellerProfile>, RepositoryError> {
        let rows = sqlx::query_as::<_, SellerRow>(
            r"
            SELECT id, email, latitude, longitude
            FROM users
            WHERE role = 'seller'
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
