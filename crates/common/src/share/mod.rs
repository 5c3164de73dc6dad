//! Reference-based sharing
//!
//! - **[`ShareList`]**: a receiver's grants, bucketed by owner
//! - **[`Grant`]**: one `(path, is_folder)` pointer into an owner's tree
//! - **[`resolver`]**: turns grants plus live owner trees into a listing
//!   and into authorized single-node access
//!
//! # Access rules
//!
//! A folder grant on `docs` covers `docs` and everything that is, or
//!  later ends up, below `docs/`. A file grant covers exactly its path.
//!  Anything not covered reads as not found.

mod list;
pub mod resolver;

pub use list::{Grant, ShareEntry, ShareError, ShareList};
pub use resolver::{list_for_receiver, resolve_access, RootLoader, SharedItem, SharedView};
