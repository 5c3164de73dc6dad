use async_trait::async_trait;

/// Values a key-value store may hand back for a key that holds nothing.
///  Accounts are deleted by overwriting their keys with `"\n"`.
pub const ABSENT_SENTINELS: [&str; 3] = ["", " ", "\n"];

/// The sentinel written over keys of a deleted account
pub const TOMBSTONE: &str = "\n";

const ROOT_SUFFIX: &str = " ROOT";
const SHARE_LIST_SUFFIX: &str = " SHARE_MANAGER";

#[derive(Debug, thiserror::Error)]
pub enum KvStoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("kv store rejected write to '{0}'")]
    Rejected(String),
    #[error("kv store error: {0}")]
    Internal(String),
}

/// The key-value substrate trees and share lists are persisted in.
///  Every value is a whole document; there are no partial updates.
#[async_trait]
pub trait KvStore: Send + Sync + std::fmt::Debug {
    /// Raw value stored under `key`, `None` if the key was never set
    async fn get(&self, key: &str) -> Result<Option<String>, KvStoreError>;

    /// Overwrite `key`. The last write wins.
    async fn set(&self, key: &str, value: &str) -> Result<(), KvStoreError>;

    /// Value under `key`, treating the absence sentinels as missing
    async fn get_present(&self, key: &str) -> Result<Option<String>, KvStoreError> {
        Ok(self.get(key).await?.filter(|value| !is_absent(value)))
    }
}

/// Whether a stored value means "nothing here". Only the exact
///  sentinels count; any other value must parse.
pub fn is_absent(value: &str) -> bool {
    ABSENT_SENTINELS.contains(&value)
}

/// The keys a user's data lives under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keys {
    /// Owned by the authentication layer (credential hash)
    pub account: String,
    /// Serialized tree
    pub root: String,
    /// Serialized share list
    pub share_list: String,
}

impl Keys {
    pub fn for_user(username: &str) -> Self {
        Self {
            account: username.to_string(),
            root: format!("{}{}", username, ROOT_SUFFIX),
            share_list: format!("{}{}", username, SHARE_LIST_SUFFIX),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_keys() {
        let keys = Keys::for_user("alice");
        assert_eq!(keys.account, "alice");
        assert_eq!(keys.root, "alice ROOT");
        assert_eq!(keys.share_list, "alice SHARE_MANAGER");
    }

    #[test]
    fn test_is_absent() {
        assert!(is_absent(""));
        assert!(is_absent(" "));
        assert!(is_absent("\n"));
        assert!(!is_absent(" \n"));
        assert!(!is_absent("\t"));
        assert!(!is_absent("{}"));
    }
}
