//! Shared helpers for driving the Sluice router in tests.

use std::path::Path;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use sluice_core::config::SluiceConfig;
use sluice_core::delivery::OffloadMode;
use sluice_web::{AppState, build_router};
use tower::ServiceExt;

/// Deterministic non-trivial payload so slice comparisons catch offsets.
pub fn patterned(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Router serving `root` with a small chunk size and the given offload mode.
pub fn router_for(root: &Path, offload: OffloadMode) -> Router {
    let mut config = SluiceConfig::default();
    config.server.root_dir = root.to_path_buf();
    config.delivery.chunk_size = 64;
    config.offload.mode = offload;

    build_router(AppState::new(config))
}

/// Sends one GET request through the router.
pub async fn get(router: Router, uri: &str, range: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(range) = range {
        builder = builder.header(header::RANGE, range);
    }
    let request = builder.body(Body::empty()).unwrap();

    router.oneshot(request).await.unwrap()
}

/// Collects a response body into memory.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

/// Reads a header as UTF-8, panicking when absent.
pub fn header_str<'a>(response: &'a Response<Body>, name: &str) -> &'a str {
    response
        .headers()
        .get(name)
        .unwrap_or_else(|| panic!("missing header {name}"))
        .to_str()
        .unwrap()
}
