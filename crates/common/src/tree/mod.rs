//! Per-user file trees
//!
//! - **[`Node`]**: a folder or a file, folders owning their children outright
//! - **[`FileRef`]**: what a file node knows about its bytes in the blob store
//! - **[`codec`]**: the JSON document a whole tree is persisted as
//! - **[`path`]**: helpers for the `/`-joined paths used to address nodes

pub mod codec;
mod node;
pub mod path;

pub use codec::{CodecError, FileBlob, NodeBlob};
pub use node::{FileRef, Node, NodeError, NodeKind};
