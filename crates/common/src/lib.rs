/**
 * Opaque handles to file bytes held by a blob store.
 */
pub mod content_id;
/**
 * Tree service: loads a user's documents, applies
 *  one operation and writes them back.
 */
pub mod service;
/**
 * Reference-based sharing: grants, share lists, and
 *  resolution of grants against the owners' live trees.
 */
pub mod share;
/**
 * Key-value and blob storage collaborators, with
 *  in-memory, SQLite and filesystem implementations.
 */
pub mod store;
/**
 * Per-user folder/file trees and their persisted
 *  JSON form.
 */
pub mod tree;

pub mod prelude {
    pub use crate::content_id::ContentId;
    pub use crate::service::{Download, Scope, ServiceError, TreeService};
    pub use crate::share::{Grant, ShareList, SharedItem, SharedView};
    pub use crate::store::{BlobStore, FsBlobStore, KvStore, MemoryBlobStore, MemoryKvStore, SqliteKvStore};
    pub use crate::tree::{FileRef, Node};
}
