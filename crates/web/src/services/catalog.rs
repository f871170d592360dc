//! Product catalog service.
//!
//! Owns the product lifecycle, including the two-phase create: insert the
//! row, store the image under a key derived from the new row's ID, then
//! patch the public URL back onto the row. If a later step fails, the
//! earlier steps are compensated (row deleted, object removed) so no
//! half-created product survives.

use nani_connect_core::{Price, ProductId, UserId};

use crate::db::{RepositoryError, products::ProductRepository};
use crate::models::product::Product;
use crate::services::storage::{ImageStore, StorageError};

/// Errors from catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The product does not exist or is not owned by this seller.
    #[error("product not found")]
    NotFound,

    /// Underlying repository error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Image storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Fields for creating or updating a product.
#[derive(Debug)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Price,
}

/// An image payload from a multipart upload.
#[derive(Debug)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub extension: String,
}

/// What to do with a product's image on update.
#[derive(Debug)]
pub enum ImageAction {
    /// Leave the stored image as is.
    Keep,
    /// Remove the stored image.
    Clear,
    /// Replace the stored image with a new upload.
    Replace(ImageUpload),
}

/// Service for seller product management.
pub struct CatalogService<'a> {
    products: ProductRepository<'a>,
    images: &'a ImageStore,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(products: ProductRepository<'a>, images: &'a ImageStore) -> Self {
        Self { products, images }
    }

    /// Create a product for a seller, optionally with an image.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` or `CatalogError::Storage` when
    /// a step fails; compensating cleanup has already run by then.
    pub async fn create(
        &self,
        seller: UserId,
        draft: ProductDraft,
        image: Option<ImageUpload>,
    ) -> Result<Product, CatalogError> {
        let product = self
            .products
            .insert(seller, &draft.name, &draft.description, draft.price)
            .await?;

        let Some(image) = image else {
            return Ok(product);
        };

        match self.attach_image(seller, product.id, &image).await {
            Ok(url) => Ok(Product {
                image_url: Some(url),
                ..product
            }),
            Err(e) => {
                self.rollback_create(seller, product.id, &image.extension)
                    .await;
                Err(e)
            }
        }
    }

    /// Update a product's fields and apply an image action, scoped to the
    /// owning seller.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` when the product is missing or
    /// owned by someone else.
    pub async fn update(
        &self,
        seller: UserId,
        id: ProductId,
        draft: ProductDraft,
        action: ImageAction,
    ) -> Result<Product, CatalogError> {
        let product = self
            .products
            .update(id, seller, &draft.name, &draft.description, draft.price)
            .await?
            .ok_or(CatalogError::NotFound)?;

        match action {
            ImageAction::Keep => Ok(product),
            ImageAction::Clear => {
                self.products.set_image_url(id, seller, None).await?;
                if let Some(url) = &product.image_url {
                    self.remove_object_best_effort(url).await;
                }
                Ok(Product {
                    image_url: None,
                    ..product
                })
            }
            ImageAction::Replace(image) => {
                // Same-key uploads overwrite in place; a stale object under
                // a different extension is swept afterwards.
                let url = self.attach_image(seller, id, &image).await?;
                if let Some(old) = product.image_url.as_deref().filter(|old| *old != url) {
                    self.remove_object_best_effort(old).await;
                }
                Ok(Product {
                    image_url: Some(url),
                    ..product
                })
            }
        }
    }

    /// Delete a product and its stored image, scoped to the owning seller.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` when the product is missing or
    /// owned by someone else.
    pub async fn delete(&self, seller: UserId, id: ProductId) -> Result<(), CatalogError> {
        let deleted = self
            .products
            .delete(id, seller)
            .await?
            .ok_or(CatalogError::NotFound)?;

        // The row is gone; a leftover object is only wasted disk.
        if let Some(url) = &deleted.image_url {
            self.remove_object_best_effort(url).await;
        }
        Ok(())
    }

    /// Store the image object and patch its public URL onto the row.
    async fn attach_image(
        &self,
        seller: UserId,
        id: ProductId,
        image: &ImageUpload,
    ) -> Result<String, CatalogError> {
        let key = ImageStore::object_key(seller, id, &image.extension);
        self.images.put(&key, &image.bytes).await?;

        let url = ImageStore::public_url(&key);
        let patched = self
            .products
            .set_image_url(id, seller, Some(&url))
            .await?;
        if !patched {
            return Err(CatalogError::NotFound);
        }
        Ok(url)
    }

    /// Compensate a failed create: drop the row, sweep the object.
    async fn rollback_create(&self, seller: UserId, id: ProductId, extension: &str) {
        if let Err(e) = self.products.delete(id, seller).await {
            tracing::error!(product_id = %id, error = %e, "rollback failed to delete product row");
        }
        let key = ImageStore::object_key(seller, id, extension);
        if let Err(e) = self.images.remove(&key).await {
            tracing::warn!(key, error = %e, "rollback failed to remove image object");
        }
    }

    /// Remove a stored object referenced by a public URL, logging rather
    /// than failing the caller's operation.
    async fn remove_object_best_effort(&self, url: &str) {
        let Some(key) = ImageStore::key_from_public_url(url) else {
            tracing::warn!(url, "image URL does not map to a stored object, skipping removal");
            return;
        };
        if let Err(e) = self.images.remove(&key).await {
            tracing::warn!(key, error = %e, "failed to remove image object");
        }
    }
}
