use super::BlobStore;
use crate::domain::error::{AppError, Result};
use crate::domain::proof::BlobReceipt;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::info;

/// Walrus publisher (writes) and aggregator (reads) over HTTP
pub struct WalrusBlobStore {
    client: reqwest::Client,
    publisher_url: String,
    aggregator_url: String,
    epochs: u32,
    timeout: Duration,
}

impl WalrusBlobStore {
    pub fn new(publisher_url: &str, aggregator_url: &str, epochs: u32, timeout_secs: u64) -> Self {
        Self {
            client: reqwest::Client::new(),
            publisher_url: publisher_url.trim_end_matches('/').to_string(),
            aggregator_url: aggregator_url.trim_end_matches('/').to_string(),
            epochs,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn blob_url(&self, blob_id: &str) -> String {
        format!("{}/v1/blobs/{}", self.aggregator_url, blob_id)
    }

    /// `(blob_id, sui object id)` from either publisher answer shape
    fn parse_ids(body: &Value) -> Option<(String, Option<String>)> {
        if let Some(created) = body.get("newlyCreated") {
            let object = created.get("blobObject")?;
            let blob_id = object.get("blobId")?.as_str()?.to_string();
            let object_id = object.get("id").and_then(Value::as_str).map(str::to_string);
            return Some((blob_id, object_id));
        }
        if let Some(certified) = body.get("alreadyCertified") {
            let blob_id = certified.get("blobId")?.as_str()?.to_string();
            let object_id = certified
                .get("object")
                .and_then(Value::as_str)
                .map(str::to_string);
            return Some((blob_id, object_id));
        }
        None
    }
}

#[async_trait]
impl BlobStore for WalrusBlobStore {
    async fn put(&self, bytes: Vec<u8>) -> Result<BlobReceipt> {
        let url = format!("{}/v1/blobs", self.publisher_url);
        let size = bytes.len();

        let response = self
            .client
            .put(&url)
            .query(&[("epochs", self.epochs)])
            .timeout(self.timeout)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::StorageError(format!("Publisher request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::StorageError(format!(
                "Publisher error ({}): {}",
                status, text
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::StorageError(format!("Failed to parse publisher JSON: {}", e)))?;

        let (blob_id, object_id) = Self::parse_ids(&body).ok_or_else(|| {
            AppError::StorageError(format!("Unexpected publisher response: {}", body))
        })?;
        info!(blob_id = %blob_id, size, "Bundle stored on Walrus");

        Ok(BlobReceipt {
            blob_url: self.blob_url(&blob_id),
            blob_id,
            object_id,
            object_url: None,
            raw_response: body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_bytes, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn store_for(server: &MockServer) -> WalrusBlobStore {
        WalrusBlobStore::new(&server.uri(), "https://aggregator.test/", 2, 5)
    }

    #[tokio::test]
    async fn test_newly_created_blob() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/blobs"))
            .and(query_param("epochs", "2"))
            .and(body_bytes(b"bundle".to_vec()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "newlyCreated": {
                    "blobObject": { "id": "0xobj", "blobId": "blob123", "size": 6 },
                    "cost": 1000
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let receipt = store_for(&server).await.put(b"bundle".to_vec()).await.unwrap();
        assert_eq!(receipt.blob_id, "blob123");
        assert_eq!(receipt.object_id.as_deref(), Some("0xobj"));
        assert_eq!(receipt.blob_url, "https://aggregator.test/v1/blobs/blob123");
        assert_eq!(receipt.raw_response["newlyCreated"]["cost"], 1000);
    }

    #[tokio::test]
    async fn test_already_certified_blob() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "alreadyCertified": { "blobId": "blob123", "object": "0xobj", "endEpoch": 40 }
            })))
            .mount(&server)
            .await;

        let receipt = store_for(&server).await.put(b"bundle".to_vec()).await.unwrap();
        assert_eq!(receipt.blob_id, "blob123");
        assert_eq!(receipt.object_id.as_deref(), Some("0xobj"));
    }

    #[tokio::test]
    async fn test_publisher_error_is_storage_error() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let err = store_for(&server).await.put(b"x".to_vec()).await.unwrap_err();
        assert!(matches!(err, AppError::StorageError(ref msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_storage_error() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .mount(&server)
            .await;

        let err = store_for(&server).await.put(b"x".to_vec()).await.unwrap_err();
        assert!(matches!(err, AppError::StorageError(_)));
    }
}
