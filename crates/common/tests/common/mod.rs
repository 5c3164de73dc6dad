//! Shared test utilities for tree service integration tests
#![allow(dead_code)]

use std::sync::Arc;

use bytes::Bytes;
use common::service::TreeService;
use common::store::{MemoryBlobStore, MemoryKvStore};

/// Set up a service over in-memory stores with a single account
pub async fn setup_test_env() -> (TreeService, MemoryKvStore, MemoryBlobStore) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let kv = MemoryKvStore::new();
    let blobs = MemoryBlobStore::new();
    let service = TreeService::new(Arc::new(kv.clone()), Arc::new(blobs.clone()));
    service.create_account("alice").await.unwrap();

    (service, kv, blobs)
}

/// Add another account to an existing environment
pub async fn add_user(service: &TreeService, username: &str) {
    service.create_account(username).await.unwrap();
}

/// Upload `data` as `filename` under `parent`
pub async fn upload(service: &TreeService, username: &str, parent: &str, filename: &str, data: &[u8]) {
    service
        .upload_file(username, parent, filename, Bytes::copy_from_slice(data))
        .await
        .unwrap();
}

/// alice: docs/report.pdf, docs/sub/notes.txt, secret.txt; bob has an account
pub async fn setup_shared_env() -> (TreeService, MemoryKvStore, MemoryBlobStore) {
    let (service, kv, blobs) = setup_test_env().await;
    add_user(&service, "bob").await;

    service.create_folder("alice", "docs").await.unwrap();
    service.create_folder("alice", "docs/sub").await.unwrap();
    upload(&service, "alice", "docs", "report.pdf", b"0123456789").await;
    upload(&service, "alice", "docs/sub", "notes.txt", b"notes").await;
    upload(&service, "alice", "", "secret.txt", b"secret").await;

    (service, kv, blobs)
}
