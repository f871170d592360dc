//! Product repository for database operations.
//!
//! Every mutation carries the ownership predicate
//! (`seller_id = authenticated seller`) in its WHERE clause, so a seller
//! can never touch another seller's rows. A mutation matching zero rows
//! returns `None`/`false` and the caller decides how to report it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use nani_connect_core::{Price, ProductId, UserId};

use super::RepositoryError;
use crate::models::product::Product;

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    price: Decimal,
    image_url: Option<String>,
    seller_id: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price,
            image_url: row.image_url,
            seller_id: UserId::new(row.seller_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Escape LIKE metacharacters so user input matches literally.
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products (buyer view), optionally filtered by a
    /// case-insensitive substring match over name and description.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_all(&self, filter: Option<&str>) -> Result<Vec<Product>, RepositoryError> {
        let pattern = filter
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| format!("%{}%", escape_like(q)));

        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, image_url, seller_id,
                   created_at, updated_at
            FROM products
            WHERE $1::text IS NULL
               OR name ILIKE $1
               OR description ILIKE $1
            ORDER BY created_at DESC
            ",
        )
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// List the products owned by one seller (seller view).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_by_seller(&self, seller_id: UserId) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, image_url, seller_id,
                   created_at, updated_at
            FROM products
            WHERE seller_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(seller_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, image_url, seller_id,
                   created_at, updated_at
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Insert a new product for a seller. The image URL starts null; the
    /// two-phase create patches it in once the image is stored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        seller_id: UserId,
        name: &str,
        description: &str,
        price: Price,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO products (name, description, price, seller_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, price, image_url, seller_id,
                      created_at, updated_at
            ",
        )
        .bind(name)
        .bind(description)
        .bind(price.amount())
        .bind(seller_id.as_i32())
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Update a product's fields, scoped to its owner.
    ///
    /// Returns `None` when no row matched (wrong ID or not this seller's
    /// product) - the caller reports that as not found.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: ProductId,
        seller_id: UserId,
        name: &str,
        description: &str,
        price: Price,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE products
            SET name = $3, description = $4, price = $5, updated_at = now()
            WHERE id = $1 AND seller_id = $2
            RETURNING id, name, description, price, image_url, seller_id,
                      created_at, updated_at
            ",
        )
        .bind(id.as_i32())
        .bind(seller_id.as_i32())
        .bind(name)
        .bind(description)
        .bind(price.amount())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Set or clear a product's image URL, scoped to its owner.
    ///
    /// Returns whether a row was updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_image_url(
        &self,
        id: ProductId,
        seller_id: UserId,
        image_url: Option<&str>,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET image_url = $3, updated_at = now()
            WHERE id = $1 AND seller_id = $2
            ",
        )
        .bind(id.as_i32())
        .bind(seller_id.as_i32())
        .bind(image_url)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a product, scoped to its owner.
    ///
    /// Returns the deleted row so the caller can clean up its stored image,
    /// or `None` when no row matched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(
        &self,
        id: ProductId,
        seller_id: UserId,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            DELETE FROM products
            WHERE id = $1 AND seller_id = $2
            RETURNING id, name, description, price, image_url, seller_id,
                      created_at, updated_at
            ",
        )
        .bind(id.as_i32())
        .bind(seller_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_passthrough() {
        assert_eq!(escape_like("camera"), "camera");
    }

    #[test]
    fn test_escape_like_metacharacters() {
        assert_eq!(escape_like("100%_\\"), "100\\%\\_\\\\");
    }
}
