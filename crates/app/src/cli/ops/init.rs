use std::path::PathBuf;

use clap::Args;

use crate::state::{AppConfig, AppState, BlobStoreConfig};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Default log level (overridable through RUST_LOG)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Keep blobs somewhere other than the state directory
    #[arg(long, conflicts_with = "memory_blobs")]
    pub blobs_path: Option<PathBuf>,

    /// Keep blobs in memory only (nothing survives the command)
    #[arg(long)]
    pub memory_blobs: bool,

    /// Reject uploads larger than this many bytes
    #[arg(long)]
    pub max_file_size: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] crate::state::StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let blob_store = if self.memory_blobs {
            BlobStoreConfig::Memory
        } else {
            BlobStoreConfig::Filesystem {
                path: self.blobs_path.clone(),
            }
        };
        let config = AppConfig {
            log_level: self.log_level.clone(),
            blob_store,
            max_file_size: self.max_file_size,
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        let blobs_str = match &state.config.blob_store {
            BlobStoreConfig::Filesystem { path: Some(path) } => path.display().to_string(),
            BlobStoreConfig::Filesystem { path: None } => state.blobs_path.display().to_string(),
            BlobStoreConfig::Memory => "in memory".to_string(),
        };

        let max_size_str = match state.config.max_file_size {
            Some(limit) => format!("{} bytes", limit),
            None => "unlimited".to_string(),
        };

        let output = format!(
            "Initialized resshare directory at: {}\n\
             - Database: {}\n\
             - Blobs: {}\n\
             - Config: {}\n\
             - Log level: {}\n\
             - Max file size: {}",
            state.resshare_dir.display(),
            state.db_path.display(),
            blobs_str,
            state.config_path.display(),
            state.config.log_level,
            max_size_str,
        );

        Ok(output)
    }
}
