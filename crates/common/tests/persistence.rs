//! Persistence tests over the SQLite key-value store and the
//!  filesystem blob store

mod common;

use std::sync::Arc;

use bytes::Bytes;

use ::common::service::{Scope, ServiceError, TreeService};
use ::common::store::{FsBlobStore, KvStore, SqliteKvStore};
use ::common::tree::codec;

async fn open_service(dir: &std::path::Path) -> TreeService {
    let kv = SqliteKvStore::open(&dir.join("db.sqlite")).await.unwrap();
    let blobs = FsBlobStore::open(&dir.join("blobs")).await.unwrap();
    TreeService::new(Arc::new(kv), Arc::new(blobs))
}

#[tokio::test]
async fn test_tree_survives_reopen() {
    let temp_dir = tempfile::TempDir::new().unwrap();

    {
        let service = open_service(temp_dir.path()).await;
        service.create_account("alice").await.unwrap();
        service.create_account("bob").await.unwrap();
        service.create_folder("alice", "docs").await.unwrap();
        service
            .upload_file("alice", "docs", "report.pdf", Bytes::from_static(b"0123456789"))
            .await
            .unwrap();
        service.share("alice", "bob", "docs").await.unwrap();
    }

    let service = open_service(temp_dir.path()).await;
    let root = service.root("alice").await.unwrap();
    assert!(root.find_by_path("docs/report.pdf").unwrap().is_file());

    let download = service
        .download("bob", "alice/docs/report.pdf", Scope::Shared)
        .await
        .unwrap();
    assert_eq!(download.data, Bytes::from_static(b"0123456789"));
}

#[tokio::test]
async fn test_reads_existing_documents() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let service = open_service(temp_dir.path()).await;

    // documents written by an earlier deployment, timestamps without offsets
    let tree = r#"{
        "name": "root",
        "is_folder": true,
        "children": {
            "docs": {
                "name": "docs",
                "is_folder": true,
                "children": {
                    "report.pdf": {
                        "name": "report.pdf",
                        "is_folder": false,
                        "file_obj": {
                            "cid": "Qm1",
                            "size": 10,
                            "filename": "report.pdf",
                            "creation_date": "2024-05-01T12:30:00.123456"
                        }
                    }
                }
            }
        }
    }"#;
    service.kv().set("alice ROOT", tree).await.unwrap();
    service.kv().set("bob ROOT", r#"{"name": "root", "is_folder": true, "children": {}}"#).await.unwrap();
    service
        .kv()
        .set("bob SHARE_MANAGER", r#"{"alice": [{"path": "docs", "is_folder": true}]}"#)
        .await
        .unwrap();

    let view = service.shared_items("bob").await.unwrap();
    let item = &view["alice"][0];
    let report = &item.node.children.as_ref().unwrap()["report.pdf"];
    assert_eq!(report.file_obj.as_ref().unwrap().cid, "Qm1");

    let node = service
        .resolve_shared("bob", "alice/docs/report.pdf")
        .await
        .unwrap();
    assert_eq!(node.file_ref().unwrap().size, 10);
}

#[tokio::test]
async fn test_stored_tree_is_codec_output() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let service = open_service(temp_dir.path()).await;
    service.create_account("alice").await.unwrap();
    let root = service.create_folder("alice", "docs").await.unwrap();

    let stored = service.kv().get("alice ROOT").await.unwrap().unwrap();
    assert_eq!(codec::deserialize(&stored).unwrap(), root);
}

#[tokio::test]
async fn test_absent_sentinels() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let service = open_service(temp_dir.path()).await;

    for (i, sentinel) in ["", " ", "\n"].iter().enumerate() {
        let username = format!("user{}", i);
        service
            .kv()
            .set(&format!("{} ROOT", username), sentinel)
            .await
            .unwrap();
        service
            .kv()
            .set(&format!("{} SHARE_MANAGER", username), sentinel)
            .await
            .unwrap();

        assert!(service.load_root(&username).await.unwrap().is_none());
        assert!(service.load_share_list(&username).await.unwrap().is_empty());
        assert!(service.shared_items(&username).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_malformed_documents() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let service = open_service(temp_dir.path()).await;

    service.kv().set("alice ROOT", "{not json").await.unwrap();
    let result = service.root("alice").await;
    assert!(matches!(result, Err(ServiceError::MalformedTree(_))));

    // whitespace other than the exact sentinels is not an absent document
    for value in ["\t", " \n", "  "] {
        service.kv().set("carol ROOT", value).await.unwrap();
        let result = service.root("carol").await;
        assert!(matches!(result, Err(ServiceError::MalformedTree(_))));

        service.kv().set("carol SHARE_MANAGER", value).await.unwrap();
        let result = service.load_share_list("carol").await;
        assert!(matches!(result, Err(ServiceError::MalformedShareList(_))));
    }

    // a folder without children is not silently repaired
    service
        .kv()
        .set("alice ROOT", r#"{"name": "root", "is_folder": true}"#)
        .await
        .unwrap();
    let result = service.create_folder("alice", "docs").await;
    assert!(matches!(result, Err(ServiceError::MalformedTree(_))));

    service.kv().set("bob SHARE_MANAGER", "[1, 2]").await.unwrap();
    let result = service.shared_items("bob").await;
    assert!(matches!(result, Err(ServiceError::MalformedShareList(_))));
}

#[tokio::test]
async fn test_folder_download_skips_missing_blobs() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let service = open_service(temp_dir.path()).await;
    service.create_account("alice").await.unwrap();
    service.create_folder("alice", "docs").await.unwrap();
    service
        .upload_file("alice", "docs", "a.txt", Bytes::from_static(b"aaa"))
        .await
        .unwrap();
    service
        .upload_file("alice", "docs", "b.txt", Bytes::from_static(b"bbb"))
        .await
        .unwrap();

    // lose one blob behind the tree's back
    let root = service.root("alice").await.unwrap();
    let cid = &root.find_by_path("docs/a.txt").unwrap().file_ref().unwrap().content_id;
    std::fs::remove_file(temp_dir.path().join("blobs").join(cid.as_str())).unwrap();

    let files = service
        .download_folder("alice", "docs", Scope::Owned)
        .await
        .unwrap();
    assert_eq!(files, vec![("b.txt".to_string(), Bytes::from_static(b"bbb"))]);

    let result = service.download("alice", "docs/a.txt", Scope::Owned).await;
    assert!(matches!(result, Err(ServiceError::BlobStoreFailure(_))));
}

#[tokio::test]
async fn test_last_write_wins() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let service = open_service(temp_dir.path()).await;
    service.create_account("alice").await.unwrap();

    // two overlapping requests both load the tree before either saves
    let stale = service.root("alice").await.unwrap();
    service.create_folder("alice", "docs").await.unwrap();
    service
        .kv()
        .set("alice ROOT", &codec::serialize(&stale).unwrap())
        .await
        .unwrap();

    // the later save replaces the whole document
    let root = service.root("alice").await.unwrap();
    assert!(root.find_by_path("docs").is_none());
    assert!(root.children().unwrap().is_empty());
}
