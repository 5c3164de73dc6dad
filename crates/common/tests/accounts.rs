//! Integration tests for account lifecycle

mod common;

use ::common::service::{Scope, ServiceError};
use ::common::store::KvStore;

#[tokio::test]
async fn test_create_account() {
    let (service, kv, _) = common::setup_test_env().await;

    let root = service.root("alice").await.unwrap();
    assert_eq!(root.name(), "root");
    assert!(root.children().unwrap().is_empty());
    assert_eq!(
        kv.get("alice SHARE_MANAGER").await.unwrap().as_deref(),
        Some("{}")
    );
}

#[tokio::test]
async fn test_create_account_twice() {
    let (service, _, _) = common::setup_test_env().await;

    let result = service.create_account("alice").await;
    assert!(matches!(result, Err(ServiceError::AccountExists(_))));
}

#[tokio::test]
async fn test_create_account_invalid_username() {
    let (service, _, _) = common::setup_test_env().await;

    for username in ["ab", "12345", "has space", "a/b"] {
        let result = service.create_account(username).await;
        assert!(matches!(result, Err(ServiceError::InvalidUsername(_))));
    }
}

#[tokio::test]
async fn test_delete_account() {
    let (service, kv, _) = common::setup_shared_env().await;
    service.share("alice", "bob", "docs").await.unwrap();

    service.delete_account("alice").await.unwrap();

    for key in ["alice", "alice ROOT", "alice SHARE_MANAGER"] {
        assert_eq!(kv.get(key).await.unwrap().as_deref(), Some("\n"));
    }
    assert!(!service.account_exists("alice").await.unwrap());

    // bob's grant now dangles
    assert!(service.shared_items("bob").await.unwrap().is_empty());
    let result = service
        .download("bob", "alice/docs/report.pdf", Scope::Shared)
        .await;
    assert!(matches!(result, Err(ServiceError::NodeNotFound(_))));
    assert_eq!(service.prune_shares("bob").await.unwrap(), 1);
}

#[tokio::test]
async fn test_recreate_deleted_account() {
    let (service, _, _) = common::setup_shared_env().await;
    service.delete_account("alice").await.unwrap();

    service.create_account("alice").await.unwrap();
    let root = service.root("alice").await.unwrap();
    assert!(root.children().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_unknown_account() {
    let (service, _, _) = common::setup_test_env().await;

    let result = service.delete_account("nobody").await;
    assert!(matches!(result, Err(ServiceError::AccountNotFound(_))));
}

#[tokio::test]
async fn test_share_with_deleted_account() {
    let (service, _, _) = common::setup_shared_env().await;
    service.delete_account("bob").await.unwrap();

    let result = service.share("alice", "bob", "docs").await;
    assert!(matches!(result, Err(ServiceError::UnknownUser(_))));
}
