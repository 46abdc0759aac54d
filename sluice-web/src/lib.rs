//! Sluice Web - HTTP file delivery server

#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]
//!
//! Serves files over HTTP through the sluice-core delivery pipeline:
//! byte-range requests, forced-download security headers, chunked streaming
//! bodies, and reverse-proxy transfer offload.

pub mod body;
pub mod handlers;
pub mod server;

// Re-export main types
pub use server::{AppState, build_router, run_server};
