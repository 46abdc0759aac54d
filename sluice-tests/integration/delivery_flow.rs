//! End-to-end delivery scenarios through the HTTP router.

use axum::http::StatusCode;
use sluice_core::delivery::OffloadMode;
use tempfile::TempDir;

use crate::support::{body_bytes, get, header_str, patterned, router_for};

async fn root_with_file(name: &str, content: &[u8]) -> TempDir {
    let root = TempDir::new().unwrap();
    let path = root.path().join(name);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.unwrap();
    }
    tokio::fs::write(&path, content).await.unwrap();
    root
}

#[tokio::test]
async fn test_full_download() {
    let content = patterned(1000);
    let root = root_with_file("data.bin", &content).await;
    let router = router_for(root.path(), OffloadMode::Disabled);

    let response = get(router, "/files/data.bin", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, "content-length"), "1000");
    assert_eq!(header_str(&response, "accept-ranges"), "bytes");
    assert_eq!(header_str(&response, "cache-control"), "no-store, no-cache");
    assert_eq!(header_str(&response, "x-content-type-options"), "nosniff");
    // No offload configured, so the transfer streams through the app
    assert!(response.headers().get("x-sendfile").is_none());
    assert_eq!(body_bytes(response).await, content);
}

#[tokio::test]
async fn test_range_request_returns_partial_content() {
    let content = patterned(1000);
    let root = root_with_file("data.bin", &content).await;
    let router = router_for(root.path(), OffloadMode::Disabled);

    let response = get(router, "/files/data.bin", Some("bytes=500-")).await;

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header_str(&response, "content-range"), "bytes 500-999/1000");
    assert_eq!(header_str(&response, "content-length"), "500");
    assert_eq!(body_bytes(response).await, &content[500..]);
}

#[tokio::test]
async fn test_bounded_range_is_byte_exact() {
    let content = patterned(1000);
    let root = root_with_file("data.bin", &content).await;
    let router = router_for(root.path(), OffloadMode::Disabled);

    let response = get(router, "/files/data.bin", Some("bytes=100-299")).await;

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header_str(&response, "content-range"), "bytes 100-299/1000");
    assert_eq!(body_bytes(response).await, &content[100..300]);
}

#[tokio::test]
async fn test_unsatisfiable_range_returns_416() {
    let content = patterned(1000);
    let root = root_with_file("data.bin", &content).await;
    let router = router_for(root.path(), OffloadMode::Disabled);

    let response = get(router, "/files/data.bin", Some("bytes=1200-1300")).await;

    assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(header_str(&response, "content-range"), "bytes */1000");
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_multi_range_degrades_to_full_content() {
    let content = patterned(1000);
    let root = root_with_file("data.bin", &content).await;
    let router = router_for(root.path(), OffloadMode::Disabled);

    let response = get(router, "/files/data.bin", Some("bytes=0-99,200-299")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, content);
}

#[tokio::test]
async fn test_html_is_served_as_opaque_attachment() {
    let root = root_with_file("page.html", b"<script>alert(1)</script>").await;
    let router = router_for(root.path(), OffloadMode::Disabled);

    // Asking for inline must not matter for active content
    let response = get(router, "/files/page.html?inline=true", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, "content-type"), "application/octet-stream");
    assert!(header_str(&response, "content-disposition").starts_with("attachment"));
}

#[tokio::test]
async fn test_inline_query_honored_for_passive_content() {
    let root = root_with_file("report.pdf", &patterned(100)).await;
    let router = router_for(root.path(), OffloadMode::Disabled);

    let response = get(router, "/files/report.pdf?inline=true", None).await;

    assert_eq!(header_str(&response, "content-type"), "application/pdf");
    assert!(header_str(&response, "content-disposition").starts_with("inline"));
}

#[tokio::test]
async fn test_nested_reference() {
    let content = patterned(64);
    let root = root_with_file("reports/2024/q3.pdf", &content).await;
    let router = router_for(root.path(), OffloadMode::Disabled);

    let response = get(router, "/files/reports/2024/q3.pdf", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let disposition = header_str(&response, "content-disposition");
    assert!(disposition.contains("filename=\"q3.pdf\""));
    assert_eq!(body_bytes(response).await, content);
}

#[tokio::test]
async fn test_missing_file_returns_404() {
    let root = TempDir::new().unwrap();
    let router = router_for(root.path(), OffloadMode::Disabled);

    let response = get(router, "/files/absent.bin", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_file_download() {
    let root = root_with_file("empty.bin", b"").await;
    let router = router_for(root.path(), OffloadMode::Disabled);

    let response = get(router, "/files/empty.bin", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, "content-length"), "0");
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_health_endpoint() {
    let root = TempDir::new().unwrap();
    let router = router_for(root.path(), OffloadMode::Disabled);

    let response = get(router, "/healthz", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["range_enabled"], true);
}
