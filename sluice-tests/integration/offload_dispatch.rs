//! Offload negotiation through the HTTP router.

use axum::http::StatusCode;
use sluice_core::delivery::OffloadMode;
use tempfile::TempDir;

use crate::support::{body_bytes, get, header_str, patterned, router_for};

async fn root_with_file(name: &str, content: &[u8]) -> TempDir {
    let root = TempDir::new().unwrap();
    tokio::fs::write(root.path().join(name), content).await.unwrap();
    root
}

#[tokio::test]
async fn test_sendfile_mode_emits_path_header_and_no_body() {
    let root = root_with_file("data.bin", &patterned(1000)).await;
    let expected_path = root.path().join("data.bin");
    let router = router_for(root.path(), OffloadMode::SendfileHeader);

    let response = get(router, "/files/data.bin", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_str(&response, "x-sendfile"),
        expected_path.to_str().unwrap()
    );
    // The hosting server performs the transfer; the app sends no bytes
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_internal_redirect_mode_emits_location_header() {
    let root = root_with_file("data.bin", &patterned(1000)).await;
    let router = router_for(
        root.path(),
        OffloadMode::InternalRedirect {
            location: "/protected".to_string(),
        },
    );

    let response = get(router, "/files/data.bin", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, "x-accel-redirect"), "/protected/data.bin");
    assert!(response.headers().get("x-sendfile").is_none());
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_offload_keeps_standard_headers() {
    let root = root_with_file("report.pdf", &patterned(100)).await;
    let router = router_for(root.path(), OffloadMode::SendfileHeader);

    let response = get(router, "/files/report.pdf", None).await;

    assert_eq!(header_str(&response, "content-type"), "application/pdf");
    assert_eq!(header_str(&response, "cache-control"), "no-store, no-cache");
    assert!(header_str(&response, "content-disposition").contains("report.pdf"));
}

#[tokio::test]
async fn test_offload_bypasses_range_handling() {
    let root = root_with_file("data.bin", &patterned(1000)).await;
    let router = router_for(root.path(), OffloadMode::SendfileHeader);

    // The hosting server owns range semantics once the transfer is offloaded
    let response = get(router, "/files/data.bin", Some("bytes=500-")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("content-range").is_none());
    assert!(response.headers().get("x-sendfile").is_some());
}

#[tokio::test]
async fn test_offload_missing_file_still_404s() {
    let root = TempDir::new().unwrap();
    let router = router_for(root.path(), OffloadMode::SendfileHeader);

    let response = get(router, "/files/absent.bin", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().get("x-sendfile").is_none());
}
