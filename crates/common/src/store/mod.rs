//! Storage collaborators
//!
//! The core never talks to a database or a blob backend directly; it is
//!  handed trait objects at construction:
//!
//! - **[`KvStore`]**: whole-document values under string keys
//!   ([`MemoryKvStore`], [`SqliteKvStore`])
//! - **[`BlobStore`]**: raw file bytes addressed by [`ContentId`](crate::content_id::ContentId)
//!   ([`MemoryBlobStore`], [`FsBlobStore`])

mod blobs;
pub mod kv;
mod memory;
mod sqlite;

pub use blobs::{content_hash, BlobStore, BlobStoreError, FsBlobStore};
pub use kv::{is_absent, Keys, KvStore, KvStoreError};
pub use memory::{MemoryBlobStore, MemoryKvStore};
pub use sqlite::SqliteKvStore;
