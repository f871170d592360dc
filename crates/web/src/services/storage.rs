//! Local-disk image storage.
//!
//! Product images live on disk under `<uploads root>/product-images/`,
//! keyed `{seller_id}/{product_id}.{ext}`, and are served back over HTTP
//! at `/uploads/product-images/...`. One image per product: re-uploading
//! under the same key replaces the old object.

use std::path::{Path, PathBuf};

use nani_connect_core::{ProductId, UserId};

/// Bucket directory name under the uploads root.
const BUCKET: &str = "product-images";

/// URL prefix at which the uploads root is served.
const PUBLIC_PREFIX: &str = "/uploads";

/// Allowed image file extensions.
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// Errors from image storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Filesystem I/O failure.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The object key was malformed or escaped the bucket.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// Disk-backed store for product images.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Create a store rooted at the configured uploads directory.
    #[must_use]
    pub fn new(uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: uploads_dir.into(),
        }
    }

    /// Directory to hand to the static file service for `/uploads`.
    #[must_use]
    pub fn serve_root(&self) -> &Path {
        &self.root
    }

    /// Object key for a product image: `{seller_id}/{product_id}.{ext}`.
    #[must_use]
    pub fn object_key(seller: UserId, product: ProductId, ext: &str) -> String {
        format!("{seller}/{product}.{ext}")
    }

    /// Public URL at which a stored object is served.
    #[must_use]
    pub fn public_url(key: &str) -> String {
        format!("{PUBLIC_PREFIX}/{BUCKET}/{key}")
    }

    /// Recover the object key from a public URL, if it points into the
    /// bucket and every path component is safe.
    #[must_use]
    pub fn key_from_public_url(url: &str) -> Option<String> {
        let key = url.strip_prefix(&format!("{PUBLIC_PREFIX}/{BUCKET}/"))?;
        if key.is_empty() || !key.split('/').all(is_safe_component) {
            return None;
        }
        Some(key.to_owned())
    }

    /// Store an object, replacing any previous content under the key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidKey` for unsafe keys and
    /// `StorageError::Io` when the write fails.
    pub async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    /// Remove an object. Missing objects are not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidKey` for unsafe keys and
    /// `StorageError::Io` for filesystem failures other than not-found.
    pub async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.object_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    /// Resolve a key to its on-disk path, rejecting traversal attempts.
    fn object_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() || !key.split('/').all(is_safe_component) {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }
        let mut path = self.root.join(BUCKET);
        for component in key.split('/') {
            path.push(component);
        }
        Ok(path)
    }
}

/// A path component is safe when it is non-empty, not a dot-reference,
/// and free of separators and NULs.
fn is_safe_component(component: &str) -> bool {
    !component.is_empty()
        && component != "."
        && component != ".."
        && !component.contains(['\\', '\0'])
}

/// Pick a stored file extension from the uploaded filename, falling back
/// to the content type, then to "jpg".
#[must_use]
pub fn extension_for(filename: Option<&str>, content_type: Option<&str>) -> String {
    if let Some(ext) = filename
        .and_then(|f| f.rsplit('.').next())
        .map(str::to_lowercase)
        && ALLOWED_EXTENSIONS.contains(&ext.as_str())
    {
        return ext;
    }

    match content_type {
        Some("image/png") => "png".to_owned(),
        Some("image/webp") => "webp".to_owned(),
        Some("image/gif") => "gif".to_owned(),
        _ => "jpg".to_owned(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_shape() {
        let key = ImageStore::object_key(UserId::new(7), ProductId::new(42), "png");
        assert_eq!(key, "7/42.png");
    }

    #[test]
    fn test_public_url_roundtrip() {
        let key = "7/42.png";
        let url = ImageStore::public_url(key);
        assert_eq!(url, "/uploads/product-images/7/42.png");
        assert_eq!(ImageStore::key_from_public_url(&url).unwrap(), key);
    }

    #[test]
    fn test_key_from_foreign_url_rejected() {
        assert!(ImageStore::key_from_public_url("https://cdn.example.com/a.png").is_none());
        assert!(ImageStore::key_from_public_url("/uploads/other-bucket/a.png").is_none());
    }

    #[test]
    fn test_traversal_keys_rejected() {
        let store = ImageStore::new("/tmp/uploads");
        assert!(store.object_path("../etc/passwd").is_err());
        assert!(store.object_path("7/../../secret").is_err());
        assert!(store.object_path("7//42.png").is_err());
        assert!(store.object_path("").is_err());
        assert!(ImageStore::key_from_public_url("/uploads/product-images/../x").is_none());
    }

    #[test]
    fn test_safe_key_resolves_under_bucket() {
        let store = ImageStore::new("/tmp/uploads");
        let path = store.object_path("7/42.png").unwrap();
        assert_eq!(path, PathBuf::from("/tmp/uploads/product-images/7/42.png"));
    }

    #[test]
    fn test_extension_from_filename() {
        assert_eq!(extension_for(Some("photo.PNG"), None), "png");
        assert_eq!(extension_for(Some("photo.jpeg"), None), "jpeg");
    }

    #[test]
    fn test_extension_falls_back_to_content_type() {
        assert_eq!(extension_for(Some("photo.exe"), Some("image/webp")), "webp");
        assert_eq!(extension_for(None, Some("image/png")), "png");
    }

    #[test]
    fn test_extension_default() {
        assert_eq!(extension_for(None, None), "jpg");
        assert_eq!(extension_for(Some("noext"), Some("image/jpeg")), "jpg");
    }

    #[tokio::test]
    async fn test_put_writes_object_under_bucket() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());
        let key = ImageStore::object_key(UserId::new(7), ProductId::new(42), "png");

        store.put(&key, b"image bytes").await.unwrap();

        let path = store.object_path(&key).unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"image bytes");
    }

    #[tokio::test]
    async fn test_put_same_key_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());
        let key = "7/42.jpg";

        store.put(key, b"first").await.unwrap();
        store.put(key, b"second").await.unwrap();

        let path = store.object_path(key).unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_remove_deletes_object() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());
        let key = "7/42.jpg";

        store.put(key, b"bytes").await.unwrap();
        store.remove(key).await.unwrap();

        assert!(!store.object_path(key).unwrap().exists());
    }

    #[tokio::test]
    async fn test_remove_missing_object_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        // Best-effort contract: cleanup of an absent object is a no-op.
        store.remove("7/42.jpg").await.unwrap();
    }

    #[tokio::test]
    async fn test_put_rejects_traversal_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        assert!(matches!(
            store.put("../escape.png", b"x").await,
            Err(StorageError::InvalidKey(_))
        ));
    }
}
