use crate::error::StoreError;
use crate::traits::ObjectStore;
use async_trait::async_trait;
use std::path::PathBuf;

/// Directory-rooted blob store. Each logical key maps to one file under
/// the root; good for local deployments and tests.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.blob_path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(path.display().to_string()))
            }
            Err(error) => Err(StoreError::Io(error)),
        }
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.blob_path(key), bytes).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::FsObjectStore;
    use crate::error::StoreError;
    use crate::traits::ObjectStore;
    use tempfile::tempdir;

    #[tokio::test]
    async fn missing_blob_is_not_found() {
        let dir = tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());
        let result = store.fetch("vector_store.index.json").await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn put_then_fetch_round_trips() {
        let dir = tempdir().unwrap();
        let store = FsObjectStore::new(dir.path().join("blobs"));

        store.put("metadata_store.json", b"{}").await.unwrap();
        let bytes = store.fetch("metadata_store.json").await.unwrap();
        assert_eq!(bytes, b"{}");
    }

    #[tokio::test]
    async fn put_overwrites_previous_content() {
        let dir = tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());

        store.put("blob", b"old").await.unwrap();
        store.put("blob", b"new").await.unwrap();
        assert_eq!(store.fetch("blob").await.unwrap(), b"new");
    }
}
