use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;

use crate::content_id::ContentId;

#[derive(Debug, thiserror::Error)]
pub enum BlobStoreError {
    #[error("blob store i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("blob not found: {0}")]
    NotFound(ContentId),
    #[error("invalid content id: {0}")]
    InvalidContentId(ContentId),
    #[error("blob store error: {0}")]
    Internal(String),
}

/// Storage for the raw bytes behind file nodes.
///  The tree only keeps the [`ContentId`] a put hands back.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug {
    /// Store `data`, returning the handle to fetch it by
    async fn put(&self, data: Bytes, filename: &str) -> Result<ContentId, BlobStoreError>;

    async fn get(&self, cid: &ContentId) -> Result<Bytes, BlobStoreError>;
}

/// Content id of `data`: the hex BLAKE3 digest
pub fn content_hash(data: &[u8]) -> ContentId {
    ContentId::new(blake3::hash(data).to_hex().to_string())
}

/// Blob store laid out on the local filesystem, one file per blob
///  named by its content hash.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    path: PathBuf,
}

impl FsBlobStore {
    /// Open (and create if needed) a blob directory
    pub async fn open(path: &Path) -> Result<Self, BlobStoreError> {
        tracing::debug!("FsBlobStore::open called with path: {:?}", path);
        tokio::fs::create_dir_all(path).await?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn blob_path(&self, cid: &ContentId) -> Result<PathBuf, BlobStoreError> {
        // blob files are named by hex digests only
        let valid = !cid.as_str().is_empty() && cid.as_str().chars().all(|c| c.is_ascii_hexdigit());
        if !valid {
            return Err(BlobStoreError::InvalidContentId(cid.clone()));
        }
        Ok(self.path.join(cid.as_str()))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, data: Bytes, filename: &str) -> Result<ContentId, BlobStoreError> {
        let cid = content_hash(&data);
        let blob_path = self.blob_path(&cid)?;

        if tokio::fs::try_exists(&blob_path).await? {
            tracing::debug!("FsBlobStore::put {} already stored as {}", filename, cid);
            return Ok(cid);
        }

        // readers only ever see whole blobs
        let partial = blob_path.with_extension("partial");
        tokio::fs::write(&partial, &data).await?;
        tokio::fs::rename(&partial, &blob_path).await?;
        tracing::debug!(
            "FsBlobStore::put stored {} ({} bytes) as {}",
            filename,
            data.len(),
            cid
        );
        Ok(cid)
    }

    async fn get(&self, cid: &ContentId) -> Result<Bytes, BlobStoreError> {
        let blob_path = self.blob_path(cid)?;
        match tokio::fs::read(&blob_path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobStoreError::NotFound(cid.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
