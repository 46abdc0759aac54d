//! File download handler.
//!
//! Sanitizes the client-supplied reference, confirms it stays under the
//! serving root, and hands the delivery to the orchestrator. Streamed
//! transfers run in a spawned task feeding the response body through a
//! bounded channel; offloaded transfers return the bodiless head.

use std::path::Path;

use axum::body::Body;
use axum::extract::{Path as UrlPath, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use sluice_core::delivery::{
    ChunkedStreamer, DeliveryError, DeliveryRequest, OffloadMode, ResponseHead, Transfer,
};
use sluice_core::fs::{is_within_root, resolve_under_root, sanitize_reference};
use tracing::{debug, warn};

use crate::body::channel_body;
use crate::server::AppState;

/// Query parameters for download requests
#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    /// Ask for inline disposition; honored only for types that cannot
    /// execute in a browser context
    pub inline: Option<bool>,
}

/// Serves one file identified by the wildcard reference.
pub async fn download_file(
    State(state): State<AppState>,
    UrlPath(reference): UrlPath<String>,
    Query(query): Query<DownloadQuery>,
    headers: HeaderMap,
) -> Response {
    let reference = match sanitize_reference(&reference, &state.sanitize) {
        Ok(reference) => reference,
        Err(e) => {
            // The reason stays in the log; the client just sees a 404
            debug!("Rejected file reference: {}", e);
            return not_found();
        }
    };

    let file_path = resolve_under_root(&reference, &state.root_dir);
    if !is_within_root(&file_path, &state.root_dir) {
        debug!("Reference escapes serving root: {}", reference);
        return not_found();
    }

    let display_name = Path::new(&reference)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| reference.clone());

    let mut request = DeliveryRequest::new(file_path, display_name, &state.config.delivery);
    request.force_download = !query.inline.unwrap_or(false);
    request.offload_enabled = state.config.offload.mode != OffloadMode::Disabled;

    let range_header = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok());

    let prepared = match state.delivery.prepare(&request, range_header).await {
        Ok(prepared) => prepared,
        Err(e) => return error_response(&e),
    };

    match prepared.transfer {
        Transfer::Offloaded => with_head(prepared.head, Body::empty()),
        Transfer::Stream(plan) => {
            let (mut sink, body) = channel_body(state.config.server.stream_channel_capacity);
            let flush_interval = state.config.delivery.flush_interval_bytes;

            tokio::spawn(async move {
                let streamer = ChunkedStreamer::new(plan.chunk_size, flush_interval);
                match streamer
                    .stream(&plan.path, plan.offset, plan.length, &mut sink)
                    .await
                {
                    Ok(bytes_sent) => {
                        debug!(
                            "Transfer of {} complete: {} bytes",
                            plan.path.display(),
                            bytes_sent
                        );
                    }
                    Err(e) => {
                        warn!("Transfer of {} failed: {}", plan.path.display(), e);
                    }
                }
            });

            with_head(prepared.head, body)
        }
    }
}

/// Applies a composed head to a response body.
fn with_head(head: ResponseHead, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = head.status;
    *response.headers_mut() = head.headers;
    response
}

/// Maps a delivery error onto the wire.
fn error_response(error: &DeliveryError) -> Response {
    match error {
        DeliveryError::UnsatisfiableRange { total_size } => Response::builder()
            .status(StatusCode::RANGE_NOT_SATISFIABLE)
            .header(header::CONTENT_RANGE, format!("bytes */{total_size}"))
            .body(Body::empty())
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        DeliveryError::NotFound { .. } => not_found(),
        DeliveryError::Unreadable { .. } | DeliveryError::Io(_) => {
            warn!("File delivery failed: {}", error);
            (StatusCode::INTERNAL_SERVER_ERROR, "File delivery failed").into_response()
        }
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "File not found").into_response()
}
