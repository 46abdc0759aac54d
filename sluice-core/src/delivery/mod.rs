//! Single-file delivery pipeline.
//!
//! A delivery call validates its target, composes response headers, and
//! either streams the bytes itself in bounded chunks or emits a header that
//! hands the transfer off to the hosting server. Each component is usable on
//! its own; `FileDelivery` wires them together.

pub mod headers;
pub mod offload;
pub mod orchestrator;
pub mod range;
pub mod sink;
pub mod streamer;

use std::path::PathBuf;

use axum::http::StatusCode;

pub use headers::{ResponseHead, compose, compose_common};
pub use offload::{OffloadDispatcher, OffloadMode};
pub use orchestrator::{FileDelivery, PreparedDelivery, StreamPlan, Transfer};
pub use range::{ByteRange, RangeOutcome, parse_range};
pub use sink::{DeliverySink, SinkClosed};
pub use streamer::ChunkedStreamer;

use crate::config::DeliveryConfig;

/// Errors that can occur while delivering a file.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// Target is missing or not a regular file
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    /// Target exists but cannot be opened or inspected
    #[error("File not readable: {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    /// Requested range lies outside the file
    #[error("Range not satisfiable, content size is {total_size}")]
    UnsatisfiableRange { total_size: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DeliveryError {
    /// HTTP status this error maps to at the response boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            DeliveryError::NotFound { .. } => StatusCode::NOT_FOUND,
            DeliveryError::Unreadable { .. } | DeliveryError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            DeliveryError::UnsatisfiableRange { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
        }
    }
}

/// One file to deliver, fully described.
///
/// Constructed per request and consumed within a single request-response
/// cycle. The path must already be sanitized and containment-checked by the
/// caller; this subsystem never sees raw external strings.
#[derive(Debug, Clone)]
pub struct DeliveryRequest {
    /// Filesystem location of the file to serve
    pub file_path: PathBuf,
    /// Name exposed to the client in Content-Disposition
    pub display_name: String,
    /// Content type override; resolved from the path when absent
    pub mime_override: Option<String>,
    /// Force attachment disposition even for inline-safe types
    pub force_download: bool,
    /// Read size per streaming iteration
    pub chunk_size: usize,
    /// Whether a Range header on this request is honored
    pub range_enabled: bool,
    /// Whether transfer offload may be used for this request
    pub offload_enabled: bool,
}

impl DeliveryRequest {
    /// Creates a request with defaults taken from the delivery configuration.
    pub fn new(
        file_path: impl Into<PathBuf>,
        display_name: impl Into<String>,
        config: &DeliveryConfig,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            display_name: display_name.into(),
            mime_override: None,
            force_download: true,
            chunk_size: config.chunk_size,
            range_enabled: config.range_enabled,
            offload_enabled: false,
        }
    }
}

/// Result of one delivery call, for observability and tests.
#[derive(Debug)]
pub enum DeliveryOutcome {
    /// Transfer was handed to the hosting server; no body was produced
    Offloaded,
    /// Bytes were streamed through the chunked streamer
    Streamed { bytes_sent: u64 },
    /// Delivery was rejected before any bytes were produced
    Failed(DeliveryError),
}
