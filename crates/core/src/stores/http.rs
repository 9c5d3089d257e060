use crate::error::StoreError;
use crate::traits::ObjectStore;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

/// Blob store speaking plain GET/PUT against an S3-compatible HTTP
/// gateway. Objects live under `{endpoint}/{prefix}/{key}`.
pub struct HttpObjectStore {
    client: Client,
    endpoint: Url,
    prefix: String,
    api_key: Option<String>,
}

impl HttpObjectStore {
    pub fn new(
        endpoint: &str,
        prefix: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            client: Client::new(),
            endpoint: Url::parse(endpoint)?,
            prefix: prefix.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    fn object_url(&self, key: &str) -> Result<Url, StoreError> {
        let path = format!(
            "{}/{}/{}",
            self.endpoint.path().trim_end_matches('/'),
            self.prefix.trim_matches('/'),
            key
        );
        let mut url = self.endpoint.clone();
        url.set_path(&path);
        Ok(url)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(api_key) => request.bearer_auth(api_key),
            None => request,
        }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let url = self.object_url(key)?;
        let response = self.authorized(self.client.get(url.clone())).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(url.to_string()));
        }
        if !response.status().is_success() {
            return Err(StoreError::BackendResponse {
                backend: "blob-gateway".to_string(),
                details: response.status().to_string(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let url = self.object_url(key)?;
        let response = self
            .authorized(self.client.put(url.clone()))
            .body(bytes.to_vec())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Upload(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::HttpObjectStore;

    #[test]
    fn object_urls_nest_under_the_prefix() {
        let store =
            HttpObjectStore::new("http://localhost:9000", "vector_store", None).unwrap();
        let url = store.object_url("metadata_store.json").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9000/vector_store/metadata_store.json"
        );
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        assert!(HttpObjectStore::new("not a url", "p", None).is_err());
    }
}
