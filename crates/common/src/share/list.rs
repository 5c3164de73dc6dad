use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tree::path;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShareError {
    #[error("invalid share path: '{0}'")]
    InvalidPath(String),
    #[error("'{path}' from {owner} is already shared")]
    AlreadyShared { owner: String, path: String },
    #[error("no share of '{path}' from {owner}")]
    NodeNotFound { owner: String, path: String },
    #[error("malformed share list: {0}")]
    MalformedShareList(String),
}

/// A single grant from one owner, as stored in the owner's bucket
///  of a receiver's [`ShareList`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// Normalized path below the owner's root
    pub path: String,
    /// Whether the grant covers a whole folder subtree
    pub is_folder: bool,
}

impl Grant {
    /// Whether this grant lets the receiver read `requested`.
    ///  Folder grants cover the folder and anything below it,
    ///  file grants cover exactly one path.
    pub fn authorizes(&self, requested: &str) -> bool {
        let granted = path::normalize(&self.path);
        let requested = path::normalize(requested);
        // an empty grant would otherwise match the owner's root
        if granted.is_empty() {
            return false;
        }
        if requested == granted {
            return true;
        }
        self.is_folder
            && requested
                .strip_prefix(granted)
                .is_some_and(|rest| rest.starts_with(path::SEPARATOR))
    }
}

/// A grant together with the owner it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareEntry {
    pub owner: String,
    pub path: String,
    pub is_folder: bool,
}

/**
 * Share lists
 * ===========
 * Everything a receiver has been granted, bucketed by owner.
 *  A grant is a live pointer at `(owner, path)` and never a copy of
 *  the owner's data: the owner's tree is not touched when sharing,
 *  and whatever the owner does to the path afterwards is what the
 *  receiver sees.
 * Stored under `<receiver> SHARE_MANAGER` as
 *  `{"alice": [{"path": "docs", "is_folder": true}]}`
 */
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareList {
    owners: BTreeMap<String, Vec<Grant>>,
}

impl ShareList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a grant of `path` from `owner`
    pub fn grant(&mut self, owner: &str, path: &str, is_folder: bool) -> Result<(), ShareError> {
        let path = path::normalize(path);
        if path::is_root(path) {
            return Err(ShareError::InvalidPath(path.to_string()));
        }

        let grants = self.owners.entry(owner.to_string()).or_default();
        if grants.iter().any(|g| path::normalize(&g.path) == path) {
            return Err(ShareError::AlreadyShared {
                owner: owner.to_string(),
                path: path.to_string(),
            });
        }
        grants.push(Grant {
            path: path.to_string(),
            is_folder,
        });
        Ok(())
    }

    /// Remove the grant of exactly `path` from `owner`. Grants below or
    ///  above `path` are left alone.
    pub fn revoke(&mut self, owner: &str, path: &str) -> Result<Grant, ShareError> {
        let path = path::normalize(path);
        let not_found = || ShareError::NodeNotFound {
            owner: owner.to_string(),
            path: path.to_string(),
        };

        let grants = self.owners.get_mut(owner).ok_or_else(not_found)?;
        let idx = grants
            .iter()
            .position(|g| path::normalize(&g.path) == path)
            .ok_or_else(not_found)?;
        let grant = grants.remove(idx);

        if grants.is_empty() {
            self.owners.remove(owner);
        }
        Ok(grant)
    }

    /// Grants from `owner`, in the order they were made
    pub fn grants(&self, owner: &str) -> &[Grant] {
        self.owners.get(owner).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn owners(&self) -> impl Iterator<Item = (&str, &[Grant])> {
        self.owners
            .iter()
            .map(|(owner, grants)| (owner.as_str(), grants.as_slice()))
    }

    pub fn entries(&self) -> impl Iterator<Item = ShareEntry> + '_ {
        self.owners.iter().flat_map(|(owner, grants)| {
            grants.iter().map(move |grant| ShareEntry {
                owner: owner.clone(),
                path: grant.path.clone(),
                is_folder: grant.is_folder,
            })
        })
    }

    /// The first grant from `owner` that covers `path`
    pub fn authorizing(&self, owner: &str, path: &str) -> Option<&Grant> {
        self.grants(owner).iter().find(|g| g.authorizes(path))
    }

    /// Keep only the grants `keep` accepts, dropping owners left with
    ///  none. Returns how many grants were dropped.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&str, &Grant) -> bool,
    {
        let before = self.len();
        for (owner, grants) in self.owners.iter_mut() {
            grants.retain(|grant| keep(owner, grant));
        }
        self.owners.retain(|_, grants| !grants.is_empty());
        before - self.len()
    }

    pub fn len(&self) -> usize {
        self.owners.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_json(&self) -> Result<String, ShareError> {
        serde_json::to_string(self).map_err(|e| ShareError::MalformedShareList(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, ShareError> {
        serde_json::from_str(json).map_err(|e| ShareError::MalformedShareList(e.to_string()))
    }
}
