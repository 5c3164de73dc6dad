//! Resolution of a receiver's grants against the owners' current trees.
//!
//! Nothing here is cached: every call re-reads the owner trees through a
//!  [`RootLoader`] and re-checks the grants, so a receiver always sees
//!  the owner's current state. A grant whose target has since been
//!  deleted or renamed simply stops showing up.

use std::collections::{BTreeMap, HashMap};
use std::convert::Infallible;

use async_trait::async_trait;
use serde::Serialize;

use super::list::ShareList;
use crate::tree::{path, Node, NodeBlob};

/// Read-only access to a user's current tree
#[async_trait]
pub trait RootLoader: Send + Sync {
    type Error: Send;

    /// Load `username`'s root, `None` if they have no tree
    async fn load_root(&self, username: &str) -> Result<Option<Node>, Self::Error>;
}

#[async_trait]
impl RootLoader for HashMap<String, Node> {
    type Error = Infallible;

    async fn load_root(&self, username: &str) -> Result<Option<Node>, Self::Error> {
        Ok(self.get(username).cloned())
    }
}

/// A shared node as it currently looks in its owner's tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharedItem {
    /// Path of the grant below the owner's root
    pub path: String,
    /// The node's current kind, which may differ from the kind granted
    pub is_folder: bool,
    /// The node's current wire form, subtree included
    pub node: NodeBlob,
}

/// Visible shared items keyed by owner
pub type SharedView = BTreeMap<String, Vec<SharedItem>>;

/// Build the listing a receiver sees for their share list.
///  Owners are loaded once each; grants that do not resolve are left out.
pub async fn list_for_receiver<L>(share_list: &ShareList, loader: &L) -> Result<SharedView, L::Error>
where
    L: RootLoader + ?Sized,
{
    let mut view = SharedView::new();

    for (owner, grants) in share_list.owners() {
        let Some(root) = loader.load_root(owner).await? else {
            tracing::debug!("shares from {} hidden: owner has no tree", owner);
            continue;
        };

        let items: Vec<SharedItem> = grants
            .iter()
            .filter_map(|grant| match root.find_by_path(&grant.path) {
                Some(node) => Some(SharedItem {
                    path: grant.path.clone(),
                    is_folder: node.is_folder(),
                    node: NodeBlob::from(node),
                }),
                None => {
                    tracing::debug!("dangling share {}/{} hidden", owner, grant.path);
                    None
                }
            })
            .collect();

        if !items.is_empty() {
            view.insert(owner.to_string(), items);
        }
    }

    Ok(view)
}

/// Resolve `<owner>/<relative path>` for a receiver.
///  Returns `None` both when no grant covers the path and when the
///  path no longer exists, so callers cannot tell the two apart.
pub async fn resolve_access<L>(
    combined_path: &str,
    share_list: &ShareList,
    loader: &L,
) -> Result<Option<Node>, L::Error>
where
    L: RootLoader + ?Sized,
{
    let Some((owner, relative)) = path::split_owner(combined_path) else {
        return Ok(None);
    };

    // authorization strictly before touching the owner's tree
    if share_list.authorizing(owner, relative).is_none() {
        return Ok(None);
    }

    let Some(root) = loader.load_root(owner).await? else {
        return Ok(None);
    };
    Ok(root.find_by_path(relative).cloned())
}
