//! Product domain types.

use chrono::{DateTime, Utc};

use nani_connect_core::{Price, ProductId, UserId};

/// A seller-owned product (domain type).
///
/// This is the persisted, canonical shape: every product belongs to
/// exactly one seller and carries an optional public image URL.
#[derive(Debug, Clone)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Non-negative price.
    pub price: Price,
    /// Public URL of the stored product image, if one was uploaded.
    pub image_url: Option<String>,
    /// The seller who owns this product.
    pub seller_id: UserId,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}
