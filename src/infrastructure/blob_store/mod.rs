//! Content-addressed storage for audit bundles.

pub mod local;
pub mod walrus;

use crate::domain::error::Result;
use crate::domain::proof::BlobReceipt;
use crate::infrastructure::config::{BlobBackend, BlobStoreConfig};
use async_trait::async_trait;
use std::sync::Arc;

pub use local::LocalBlobStore;
pub use walrus::WalrusBlobStore;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes`; equal bytes always yield the same `blob_id`
    async fn put(&self, bytes: Vec<u8>) -> Result<BlobReceipt>;
}

pub fn build_blob_store(config: &BlobStoreConfig) -> Arc<dyn BlobStore> {
    match config.backend {
        BlobBackend::Walrus => Arc::new(WalrusBlobStore::new(
            &config.publisher_url,
            &config.aggregator_url,
            config.epochs,
            config.timeout_secs,
        )),
        BlobBackend::Local => Arc::new(LocalBlobStore::new(&config.local_dir)),
    }
}
