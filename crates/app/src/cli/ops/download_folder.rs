use std::path::{Component, Path, PathBuf};

use clap::Args;
use common::prelude::{Scope, ServiceError};

use crate::cli::op::ContextError;

#[derive(Args, Debug, Clone)]
pub struct DownloadFolder {
    /// Path of the folder to fetch
    pub path: String,

    /// Fetch from a share: the path starts with the owner
    #[arg(long)]
    pub shared: bool,

    /// Directory to write into (defaults to the folder's name)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadFolderError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("refusing to write '{0}' outside the output directory")]
    UnsafePath(String),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[async_trait::async_trait]
impl crate::cli::op::Op for DownloadFolder {
    type Error = DownloadFolderError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let user = ctx.user()?;
        let service = ctx.service().await?;

        let scope = if self.shared {
            Scope::Shared
        } else {
            Scope::Owned
        };
        let files = service.download_folder(user, &self.path, scope).await?;

        let out = match &self.out {
            Some(out) => out.clone(),
            None => PathBuf::from(folder_name(&self.path)),
        };

        // stored trees are not re-validated on load, so check every
        // name before anything is written
        if let Some((relative_path, _)) = files
            .iter()
            .find(|(relative_path, _)| !is_contained(relative_path))
        {
            return Err(DownloadFolderError::UnsafePath(relative_path.clone()));
        }

        let mut total = 0;
        for (relative_path, data) in &files {
            let target = out.join(relative_path);
            write_file(&target, data).await?;
            total += data.len();
        }

        Ok(format!(
            "Downloaded {} files ({} bytes) to {}",
            files.len(),
            total,
            out.display()
        ))
    }
}

/// Last segment of a folder path, `root` for the root itself
fn folder_name(path: &str) -> &str {
    path.trim_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(common::tree::path::ROOT_NAME)
}

/// Whether `relative_path` stays below the directory it is joined to
fn is_contained(relative_path: &str) -> bool {
    let path = Path::new(relative_path);
    path.components().next().is_some()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

async fn write_file(target: &Path, data: &[u8]) -> Result<(), DownloadFolderError> {
    let write_err = |source| DownloadFolderError::Write {
        path: target.to_path_buf(),
        source,
    };
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }
    tokio::fs::write(target, data).await.map_err(write_err)
}
