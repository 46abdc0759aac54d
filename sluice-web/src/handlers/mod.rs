//! HTTP request handlers
//!
//! Organized by endpoint concern: file downloads and service health.

pub mod download;
pub mod health;

// Re-export handlers for route configuration
pub use download::download_file;
pub use health::service_health;
