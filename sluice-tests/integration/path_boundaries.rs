//! Reference sanitization and containment at the HTTP boundary.
//!
//! Everything a reference should not be able to do resolves to a plain 404;
//! clients learn nothing about why a reference was rejected.

use axum::http::StatusCode;
use sluice_core::delivery::OffloadMode;
use tempfile::TempDir;

use crate::support::{get, router_for};

#[tokio::test]
async fn test_traversal_reference_is_rejected() {
    let parent = TempDir::new().unwrap();
    let root = parent.path().join("served");
    std::fs::create_dir(&root).unwrap();
    std::fs::write(parent.path().join("secret.txt"), b"keep out").unwrap();

    let router = router_for(&root, OffloadMode::Disabled);
    let response = get(router, "/files/../secret.txt", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_encoded_traversal_is_rejected() {
    let parent = TempDir::new().unwrap();
    let root = parent.path().join("served");
    std::fs::create_dir(&root).unwrap();
    std::fs::write(parent.path().join("secret.txt"), b"keep out").unwrap();

    let router = router_for(&root, OffloadMode::Disabled);
    // Percent-encoded dots decode in the path extractor before sanitization
    let response = get(router, "/files/%2e%2e/secret.txt", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_denied_scheme_reference_is_rejected() {
    let root = TempDir::new().unwrap();
    std::fs::write(root.path().join("data.bin"), b"x").unwrap();

    let router = router_for(root.path(), OffloadMode::Disabled);
    let response = get(router, "/files/file:%2Fetc%2Fpasswd", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlink_escaping_root_is_rejected() {
    let parent = TempDir::new().unwrap();
    let root = parent.path().join("served");
    std::fs::create_dir(&root).unwrap();
    let secret = parent.path().join("secret.txt");
    std::fs::write(&secret, b"keep out").unwrap();
    std::os::unix::fs::symlink(&secret, root.join("alias.txt")).unwrap();

    let router = router_for(&root, OffloadMode::Disabled);
    let response = get(router, "/files/alias.txt", None).await;

    // Containment is checked on the canonicalized path
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_plain_reference_within_root_is_served() {
    let root = TempDir::new().unwrap();
    std::fs::write(root.path().join("data.bin"), b"payload").unwrap();

    let router = router_for(root.path(), OffloadMode::Disabled);
    let response = get(router, "/files/data.bin", None).await;

    assert_eq!(response.status(), StatusCode::OK);
}
