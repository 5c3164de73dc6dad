use std::path::PathBuf;

use bytes::Bytes;
use clap::Args;
use common::prelude::ServiceError;

use crate::cli::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct Upload {
    /// Local file to upload
    pub file: PathBuf,

    /// Folder to upload into (defaults to root)
    #[arg(long, default_value = "")]
    pub to: String,

    /// Name to store the file under (defaults to the local file name)
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot derive a file name from {0}; pass --name")]
    NoFileName(PathBuf),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Upload {
    type Error = UploadError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let user = ctx.user()?;

        let name = match &self.name {
            Some(name) => name.clone(),
            None => self
                .file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .ok_or_else(|| UploadError::NoFileName(self.file.clone()))?,
        };

        let data = tokio::fs::read(&self.file)
            .await
            .map_err(|source| UploadError::Read {
                path: self.file.clone(),
                source,
            })?;
        let size = data.len();

        let service = ctx.service().await?;
        let root = service
            .upload_file(user, &self.to, &name, Bytes::from(data))
            .await?;

        let stored_path = common::tree::path::join(&self.to, &name);
        let cid = root
            .find_by_path(&stored_path)
            .and_then(|node| node.file_ref())
            .map(|file_ref| file_ref.content_id.to_string())
            .unwrap_or_default();

        Ok(format!(
            "Uploaded /{} ({} bytes) [{}]",
            stored_path, size, cid
        ))
    }
}
