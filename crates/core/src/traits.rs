use crate::error::StoreError;
use async_trait::async_trait;

/// Opaque durable blob boundary. Keys are logical names under the store's
/// fixed prefix; the synchronizer owns the key layout.
#[async_trait]
pub trait ObjectStore {
    /// Fetches a blob. A missing blob is `StoreError::NotFound`, which the
    /// synchronizer treats as the expected first-run case.
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Writes a blob, overwriting any previous content under `key`.
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: ObjectStore + ?Sized + Sync> ObjectStore for Box<T> {
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        (**self).fetch(key).await
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        (**self).put(key, bytes).await
    }
}
