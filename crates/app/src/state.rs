use std::{fs, path::PathBuf, sync::Arc};

use common::prelude::{BlobStore, FsBlobStore, MemoryBlobStore, SqliteKvStore, TreeService};
use common::store::{BlobStoreError, KvStoreError};
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "resshare";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DB_FILE_NAME: &str = "db.sqlite";
pub const BLOBS_DIR_NAME: &str = "blobs";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default log level, overridable through RUST_LOG
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Largest accepted upload in bytes, unlimited when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<u64>,
    /// Where file bytes are kept
    #[serde(default)]
    pub blob_store: BlobStoreConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            max_file_size: None,
            blob_store: BlobStoreConfig::default(),
        }
    }
}

impl AppConfig {
    /// The configured level, falling back to `info` if it does not parse
    pub fn level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}

/// Configuration for the blob storage backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlobStoreConfig {
    /// Content-addressed files on the local filesystem
    Filesystem {
        /// Path for blob storage (defaults to resshare_dir/blobs/)
        path: Option<PathBuf>,
    },

    /// Process memory; nothing survives the command
    Memory,
}

impl Default for BlobStoreConfig {
    fn default() -> Self {
        Self::Filesystem { path: None }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the resshare directory (~/.resshare)
    pub resshare_dir: PathBuf,
    /// Path to the SQLite database holding trees and share lists
    pub db_path: PathBuf,
    /// Path to the blobs directory
    pub blobs_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the resshare directory path (custom or default ~/.resshare)
    pub fn resshare_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new resshare state directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let resshare_dir = Self::resshare_dir(custom_path)?;

        if resshare_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&resshare_dir)?;

        let blobs_path = resshare_dir.join(BLOBS_DIR_NAME);
        fs::create_dir_all(&blobs_path)?;

        let config = config.unwrap_or_default();
        let config_path = resshare_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        // the kv table is created on first open
        let db_path = resshare_dir.join(DB_FILE_NAME);
        fs::write(&db_path, "")?;

        Ok(Self {
            resshare_dir,
            db_path,
            blobs_path,
            config_path,
            config,
        })
    }

    /// Load existing state from the resshare directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let resshare_dir = Self::resshare_dir(custom_path)?;

        if !resshare_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let db_path = resshare_dir.join(DB_FILE_NAME);
        let blobs_path = resshare_dir.join(BLOBS_DIR_NAME);
        let config_path = resshare_dir.join(CONFIG_FILE_NAME);

        if !db_path.exists() {
            return Err(StateError::MissingFile(DB_FILE_NAME.to_string()));
        }
        if !blobs_path.exists() {
            return Err(StateError::MissingFile(format!("{}/", BLOBS_DIR_NAME)));
        }
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            resshare_dir,
            db_path,
            blobs_path,
            config_path,
            config,
        })
    }

    /// Open the configured stores and hand them to a tree service
    pub async fn service(&self) -> Result<TreeService, StateError> {
        let kv = SqliteKvStore::open(&self.db_path).await?;

        let blobs: Arc<dyn BlobStore> = match &self.config.blob_store {
            BlobStoreConfig::Filesystem { path } => {
                let path = path.clone().unwrap_or_else(|| self.blobs_path.clone());
                Arc::new(FsBlobStore::open(&path).await?)
            }
            BlobStoreConfig::Memory => {
                tracing::warn!("using in-memory blob store; uploaded bytes are not kept");
                Arc::new(MemoryBlobStore::new())
            }
        };

        Ok(TreeService::new(Arc::new(kv), blobs).with_max_file_size(self.config.max_file_size))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("resshare directory not initialized. Run 'resshare init' first")]
    NotInitialized,

    #[error("resshare directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("failed to open database: {0}")]
    Database(#[from] KvStoreError),

    #[error("failed to open blob store: {0}")]
    Blobs(#[from] BlobStoreError),
}
