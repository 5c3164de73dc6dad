use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;

use super::blobs::{content_hash, BlobStore, BlobStoreError};
use super::kv::{KvStore, KvStoreError};
use crate::content_id::ContentId;

/// In-memory key-value store using a HashMap
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvStoreError> {
        let inner = self.inner.read().map_err(|e| {
            KvStoreError::Internal(format!("failed to acquire read lock: {}", e))
        })?;
        Ok(inner.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvStoreError> {
        let mut inner = self.inner.write().map_err(|e| {
            KvStoreError::Internal(format!("failed to acquire write lock: {}", e))
        })?;
        inner.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// In-memory blob store, content-addressed like the filesystem store
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    inner: Arc<RwLock<HashMap<ContentId, Bytes>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct blobs held
    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, data: Bytes, filename: &str) -> Result<ContentId, BlobStoreError> {
        let cid = content_hash(&data);
        tracing::debug!("MemoryBlobStore::put {} -> {}", filename, cid);
        let mut inner = self.inner.write().map_err(|e| {
            BlobStoreError::Internal(format!("failed to acquire write lock: {}", e))
        })?;
        inner.insert(cid.clone(), data);
        Ok(cid)
    }

    async fn get(&self, cid: &ContentId) -> Result<Bytes, BlobStoreError> {
        let inner = self.inner.read().map_err(|e| {
            BlobStoreError::Internal(format!("failed to acquire read lock: {}", e))
        })?;
        inner
            .get(cid)
            .cloned()
            .ok_or_else(|| BlobStoreError::NotFound(cid.clone()))
    }
}
