use std::path::PathBuf;

use clap::Args;
use common::prelude::{Scope, ServiceError};

use crate::cli::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct Download {
    /// Path of the file to fetch
    pub path: String,

    /// Fetch from a share: the path starts with the owner
    #[arg(long)]
    pub shared: bool,

    /// Where to write the file (defaults to its name in the current directory)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Download {
    type Error = DownloadError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let user = ctx.user()?;
        let service = ctx.service().await?;

        let scope = if self.shared {
            Scope::Shared
        } else {
            Scope::Owned
        };
        let download = service.download(user, &self.path, scope).await?;

        let out = self
            .out
            .clone()
            .unwrap_or_else(|| PathBuf::from(&download.filename));
        tokio::fs::write(&out, &download.data)
            .await
            .map_err(|source| DownloadError::Write {
                path: out.clone(),
                source,
            })?;

        Ok(format!(
            "Downloaded {} ({} bytes) to {}",
            download.filename,
            download.data.len(),
            out.display()
        ))
    }
}
