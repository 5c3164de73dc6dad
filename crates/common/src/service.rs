//! Tree service: per-request orchestration over the storage collaborators.
//!
//! Every mutation follows the same shape: load the user's whole tree (or
//!  share list) document, apply one operation in memory, write the whole
//!  document back. There is no locking and no versioning of the stored
//!  documents, so two overlapping requests against the same user both
//!  load, both mutate, and the later write wins; the earlier change is
//!  lost. Sharing never writes the owner's tree, only the receiver's
//!  share list.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::share::{self, RootLoader, ShareError, ShareList, SharedView};
use crate::store::{BlobStore, BlobStoreError, Keys, KvStore, KvStoreError};
use crate::tree::{codec, path, CodecError, FileRef, Node, NodeError};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("invalid path: '{0}'")]
    InvalidPath(String),
    #[error("duplicate name: {0}")]
    DuplicateName(String),
    #[error("node not found: {0}")]
    NodeNotFound(String),
    #[error("not a folder: {0}")]
    NotAFolder(String),
    #[error("the root folder cannot be shared")]
    ShareRoot,
    #[error("the root folder cannot be deleted")]
    DeleteRoot,
    #[error("'{path}' from {owner} is already shared")]
    AlreadyShared { owner: String, path: String },
    #[error("malformed tree: {0}")]
    MalformedTree(String),
    #[error("malformed share list: {0}")]
    MalformedShareList(String),
    #[error("blob store failure: {0}")]
    BlobStoreFailure(#[from] BlobStoreError),
    #[error("kv store error: {0}")]
    KvStore(#[from] KvStoreError),
    #[error("unknown user: {0}")]
    UnknownUser(String),
    #[error("invalid username: '{0}'")]
    InvalidUsername(String),
    #[error("account already exists: {0}")]
    AccountExists(String),
    #[error("account not found: {0}")]
    AccountNotFound(String),
    #[error("folder has no files: {0}")]
    EmptyFolder(String),
    #[error("file '{filename}' is {size} bytes, over the {limit} byte limit")]
    FileTooLarge {
        filename: String,
        size: u64,
        limit: u64,
    },
}

impl From<NodeError> for ServiceError {
    fn from(err: NodeError) -> Self {
        match err {
            NodeError::NotAFolder(name) => ServiceError::NotAFolder(name),
            NodeError::DuplicateName(name) => ServiceError::DuplicateName(name),
            NodeError::NodeNotFound(name) => ServiceError::NodeNotFound(name),
        }
    }
}

impl From<CodecError> for ServiceError {
    fn from(err: CodecError) -> Self {
        ServiceError::MalformedTree(err.to_string())
    }
}

impl From<ShareError> for ServiceError {
    fn from(err: ShareError) -> Self {
        match err {
            ShareError::InvalidPath(path) => ServiceError::InvalidPath(path),
            ShareError::AlreadyShared { owner, path } => {
                ServiceError::AlreadyShared { owner, path }
            }
            ShareError::NodeNotFound { owner, path } => {
                ServiceError::NodeNotFound(path::join(&owner, &path))
            }
            ShareError::MalformedShareList(reason) => ServiceError::MalformedShareList(reason),
        }
    }
}

/// A downloaded file
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    /// The name the file was uploaded with
    pub filename: String,
    pub data: Bytes,
}

/// Where a read is resolved: the caller's own tree, or the trees
///  of users who shared with them (paths then start with the owner)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[default]
    Owned,
    Shared,
}

#[derive(Clone, Debug)]
pub struct TreeService {
    kv: Arc<dyn KvStore>,
    blobs: Arc<dyn BlobStore>,
    max_file_size: Option<u64>,
}

impl TreeService {
    pub fn new(kv: Arc<dyn KvStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            kv,
            blobs,
            max_file_size: None,
        }
    }

    /// Reject uploads larger than `limit` bytes
    pub fn with_max_file_size(mut self, limit: Option<u64>) -> Self {
        self.max_file_size = limit;
        self
    }

    pub fn max_file_size(&self) -> Option<u64> {
        self.max_file_size
    }

    pub fn kv(&self) -> &Arc<dyn KvStore> {
        &self.kv
    }

    pub fn blobs(&self) -> &Arc<dyn BlobStore> {
        &self.blobs
    }

    /* Accounts */

    /// Give a new user an empty `root` folder and an empty share list
    pub async fn create_account(&self, username: &str) -> Result<Node, ServiceError> {
        if !is_valid_username(username) {
            return Err(ServiceError::InvalidUsername(username.to_string()));
        }
        if self.load_root(username).await?.is_some() {
            return Err(ServiceError::AccountExists(username.to_string()));
        }

        let root = Node::root();
        self.save_root(username, &root).await?;
        self.save_share_list(username, &ShareList::new()).await?;
        tracing::info!("created account {}", username);
        Ok(root)
    }

    /// Blank out every key of an account. Grants other users hold on
    ///  this account's files go dangling and stop resolving.
    pub async fn delete_account(&self, username: &str) -> Result<(), ServiceError> {
        self.root(username).await?;

        let keys = Keys::for_user(username);
        for key in [&keys.account, &keys.root, &keys.share_list] {
            self.kv.set(key, crate::store::kv::TOMBSTONE).await?;
        }
        tracing::info!("deleted account {}", username);
        Ok(())
    }

    pub async fn account_exists(&self, username: &str) -> Result<bool, ServiceError> {
        Ok(self.load_root(username).await?.is_some())
    }

    /* Loading and saving */

    /// The user's current tree, `None` if nothing is stored
    pub async fn load_root(&self, username: &str) -> Result<Option<Node>, ServiceError> {
        let key = Keys::for_user(username).root;
        match self.kv.get_present(&key).await? {
            Some(blob) => Ok(Some(codec::deserialize(&blob)?)),
            None => Ok(None),
        }
    }

    /// The user's current tree, failing if they have none
    pub async fn root(&self, username: &str) -> Result<Node, ServiceError> {
        self.load_root(username)
            .await?
            .ok_or_else(|| ServiceError::AccountNotFound(username.to_string()))
    }

    /// The user's received grants; nothing stored means no grants
    pub async fn load_share_list(&self, username: &str) -> Result<ShareList, ServiceError> {
        let key = Keys::for_user(username).share_list;
        match self.kv.get_present(&key).await? {
            Some(blob) => Ok(ShareList::from_json(&blob)?),
            None => Ok(ShareList::new()),
        }
    }

    async fn save_root(&self, username: &str, root: &Node) -> Result<(), ServiceError> {
        let key = Keys::for_user(username).root;
        self.kv.set(&key, &codec::serialize(root)?).await?;
        Ok(())
    }

    async fn save_share_list(&self, username: &str, list: &ShareList) -> Result<(), ServiceError> {
        let key = Keys::for_user(username).share_list;
        self.kv.set(&key, &list.to_json()?).await?;
        Ok(())
    }

    /* Tree mutations */

    /// Create an empty folder at `folder_path`; its parent must already
    ///  exist. Returns the updated tree.
    pub async fn create_folder(&self, username: &str, folder_path: &str) -> Result<Node, ServiceError> {
        tracing::debug!("TreeService::create_folder user={} path={}", username, folder_path);
        let (parent_path, name) = path::split_parent(folder_path)
            .filter(|(parent_path, name)| path::is_valid_child(parent_path, name))
            .ok_or_else(|| ServiceError::InvalidPath(folder_path.to_string()))?;

        let mut root = self.root(username).await?;
        let parent = root
            .find_by_path_mut(parent_path)
            .filter(|node| node.is_folder())
            .ok_or_else(|| ServiceError::InvalidPath(folder_path.to_string()))?;
        parent.add_child(Node::folder(name))?;

        self.save_root(username, &root).await?;
        Ok(root)
    }

    /// Store `data` in the blob store and add it as `filename` inside the
    ///  folder at `parent_path`. Returns the updated tree.
    pub async fn upload_file(
        &self,
        username: &str,
        parent_path: &str,
        filename: &str,
        data: Bytes,
    ) -> Result<Node, ServiceError> {
        tracing::debug!(
            "TreeService::upload_file user={} parent={} file={} ({} bytes)",
            username,
            parent_path,
            filename,
            data.len()
        );
        if !path::is_valid_child(parent_path, filename) {
            return Err(ServiceError::InvalidPath(filename.to_string()));
        }
        let size = data.len() as u64;
        if let Some(limit) = self.max_file_size.filter(|limit| size > *limit) {
            return Err(ServiceError::FileTooLarge {
                filename: filename.to_string(),
                size,
                limit,
            });
        }

        let mut root = self.root(username).await?;
        let parent = root
            .find_by_path(parent_path)
            .ok_or_else(|| ServiceError::NodeNotFound(parent_path.to_string()))?;
        if !parent.is_folder() {
            return Err(ServiceError::NotAFolder(parent_path.to_string()));
        }
        if parent.get_child(filename).is_some() {
            return Err(ServiceError::DuplicateName(filename.to_string()));
        }

        let cid = self.blobs.put(data, filename).await?;

        let file = Node::file(filename, FileRef::new(cid, size, filename));
        root.find_by_path_mut(parent_path)
            .ok_or_else(|| ServiceError::NodeNotFound(parent_path.to_string()))?
            .add_child(file)?;

        self.save_root(username, &root).await?;
        Ok(root)
    }

    /// Remove the node at `node_path` and everything below it.
    ///  Returns the updated tree.
    pub async fn delete(&self, username: &str, node_path: &str) -> Result<Node, ServiceError> {
        tracing::debug!("TreeService::delete user={} path={}", username, node_path);
        if path::is_root(node_path) {
            return Err(ServiceError::DeleteRoot);
        }
        let (parent_path, name) = path::split_parent(node_path)
            .ok_or_else(|| ServiceError::InvalidPath(node_path.to_string()))?;

        let mut root = self.root(username).await?;
        let parent = root
            .find_by_path_mut(parent_path)
            .filter(|node| node.is_folder())
            .ok_or_else(|| ServiceError::InvalidPath(node_path.to_string()))?;
        parent
            .remove_child(name)
            .map_err(|_| ServiceError::NodeNotFound(path::normalize(node_path).to_string()))?;

        self.save_root(username, &root).await?;
        Ok(root)
    }

    /* Sharing */

    /// Give `receiver` a live, read-only grant on `owner`'s node at
    ///  `node_path`. Only the receiver's share list is written.
    pub async fn share(
        &self,
        owner: &str,
        receiver: &str,
        node_path: &str,
    ) -> Result<(), ServiceError> {
        tracing::debug!(
            "TreeService::share owner={} receiver={} path={}",
            owner,
            receiver,
            node_path
        );
        if !self.account_exists(receiver).await? {
            return Err(ServiceError::UnknownUser(receiver.to_string()));
        }
        if owner == receiver {
            return Err(ServiceError::InvalidPath(node_path.to_string()));
        }
        if path::is_root(node_path) {
            return Err(ServiceError::ShareRoot);
        }

        let root = self.root(owner).await?;
        let target = root
            .find_by_path(node_path)
            .ok_or_else(|| ServiceError::NodeNotFound(node_path.to_string()))?;

        let mut share_list = self.load_share_list(receiver).await?;
        share_list.grant(owner, node_path, target.is_folder())?;
        self.save_share_list(receiver, &share_list).await?;

        tracing::info!("{} shared '{}' with {}", owner, path::normalize(node_path), receiver);
        Ok(())
    }

    /// Drop the receiver's grant matching `<owner>/<path>` exactly.
    ///  Returns the receiver's refreshed listing.
    pub async fn revoke_share(
        &self,
        receiver: &str,
        combined_path: &str,
    ) -> Result<SharedView, ServiceError> {
        tracing::debug!(
            "TreeService::revoke_share receiver={} path={}",
            receiver,
            combined_path
        );
        let (owner, relative) = path::split_owner(combined_path)
            .filter(|(_, relative)| !path::is_root(relative))
            .ok_or_else(|| ServiceError::InvalidPath(combined_path.to_string()))?;

        let mut share_list = self.load_share_list(receiver).await?;
        share_list.revoke(owner, relative)?;
        self.save_share_list(receiver, &share_list).await?;

        Ok(share::list_for_receiver(&share_list, self).await?)
    }

    /// Everything currently visible to `receiver` through their grants
    pub async fn shared_items(&self, receiver: &str) -> Result<SharedView, ServiceError> {
        let share_list = self.load_share_list(receiver).await?;
        share::list_for_receiver(&share_list, self).await
    }

    /// The node at `<owner>/<path>` if a grant covers it and it exists
    pub async fn resolve_shared(
        &self,
        receiver: &str,
        combined_path: &str,
    ) -> Result<Node, ServiceError> {
        let share_list = self.load_share_list(receiver).await?;
        share::resolve_access(combined_path, &share_list, self)
            .await?
            .ok_or_else(|| ServiceError::NodeNotFound(path::normalize(combined_path).to_string()))
    }

    /// Drop grants whose target no longer resolves. Returns how many
    ///  were dropped.
    pub async fn prune_shares(&self, receiver: &str) -> Result<usize, ServiceError> {
        let mut share_list = self.load_share_list(receiver).await?;

        let mut live = Vec::new();
        for (owner, grants) in share_list.owners() {
            let root = self.load_root(owner).await?;
            for grant in grants {
                let resolves = root
                    .as_ref()
                    .and_then(|root| root.find_by_path(&grant.path))
                    .is_some();
                if resolves {
                    live.push((owner.to_string(), grant.path.clone()));
                }
            }
        }

        let dropped = share_list.retain(|owner, grant| {
            live.iter()
                .any(|(o, p)| o.as_str() == owner && *p == grant.path)
        });
        if dropped > 0 {
            self.save_share_list(receiver, &share_list).await?;
            tracing::info!("pruned {} dangling shares for {}", dropped, receiver);
        }
        Ok(dropped)
    }

    /* Reads */

    /// The node at `node_path` in `scope`
    pub async fn node(
        &self,
        username: &str,
        node_path: &str,
        scope: Scope,
    ) -> Result<Node, ServiceError> {
        match scope {
            Scope::Owned => {
                let root = self.root(username).await?;
                root.find_by_path(node_path)
                    .cloned()
                    .ok_or_else(|| ServiceError::NodeNotFound(node_path.to_string()))
            }
            Scope::Shared => self.resolve_shared(username, node_path).await,
        }
    }

    /// Fetch the bytes of the file at `file_path`
    pub async fn download(
        &self,
        username: &str,
        file_path: &str,
        scope: Scope,
    ) -> Result<Download, ServiceError> {
        let node = self.node(username, file_path, scope).await?;
        let file_ref = node
            .file_ref()
            .ok_or_else(|| ServiceError::NodeNotFound(file_path.to_string()))?;

        let data = self.blobs.get(&file_ref.content_id).await?;
        Ok(Download {
            filename: file_ref.filename.clone(),
            data,
        })
    }

    /// Fetch every file below the folder at `folder_path`, paired with
    ///  its path relative to that folder. Blobs that cannot be fetched
    ///  are skipped.
    pub async fn download_folder(
        &self,
        username: &str,
        folder_path: &str,
        scope: Scope,
    ) -> Result<Vec<(String, Bytes)>, ServiceError> {
        let node = self.node(username, folder_path, scope).await?;
        if !node.is_folder() {
            return Err(ServiceError::NotAFolder(folder_path.to_string()));
        }

        let files = node.files();
        if files.is_empty() {
            return Err(ServiceError::EmptyFolder(folder_path.to_string()));
        }

        let mut out = Vec::with_capacity(files.len());
        for (relative_path, file_ref) in files {
            match self.blobs.get(&file_ref.content_id).await {
                Ok(data) => out.push((relative_path, data)),
                Err(e) => {
                    tracing::warn!("skipping {} in folder download: {}", relative_path, e);
                }
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl RootLoader for TreeService {
    type Error = ServiceError;

    async fn load_root(&self, username: &str) -> Result<Option<Node>, Self::Error> {
        TreeService::load_root(self, username).await
    }
}

/// 3-20 characters of ASCII letters, digits or underscore, not all digits
pub fn is_valid_username(username: &str) -> bool {
    (3..=20).contains(&username.len())
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !username.chars().all(|c| c.is_ascii_digit())
}
