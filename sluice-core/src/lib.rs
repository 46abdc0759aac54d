//! Sluice Core - Single-file HTTP delivery
//!
//! This crate provides the building blocks for serving one file per request
//! over an HTTP response channel: byte-range parsing, response header
//! composition, chunked streaming with cooperative cancellation, and
//! reverse-proxy transfer offload.

pub mod config;
pub mod delivery;
pub mod fs;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::SluiceConfig;
pub use delivery::{DeliveryError, DeliveryOutcome, DeliveryRequest, FileDelivery};
pub use fs::PathError;

/// Core errors that can bubble up from any Sluice subsystem.
#[derive(Debug, thiserror::Error)]
pub enum SluiceError {
    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Path error: {0}")]
    Path(#[from] PathError),

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SluiceError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            SluiceError::Delivery(e) => match e {
                DeliveryError::NotFound { .. } => "Requested file not found".to_string(),
                DeliveryError::UnsatisfiableRange { total_size } => {
                    format!("Requested range cannot be satisfied ({total_size} bytes available)")
                }
                _ => "File delivery failed".to_string(),
            },
            SluiceError::Path(_) => "Invalid file reference".to_string(),
            SluiceError::Configuration { reason } => format!("Configuration error: {reason}"),
            SluiceError::Io(_) => "File system error occurred".to_string(),
        }
    }

    /// Checks if this error is due to user input validation.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            SluiceError::Path(_)
                | SluiceError::Delivery(DeliveryError::UnsatisfiableRange { .. })
        )
    }
}

pub type Result<T> = std::result::Result<T, SluiceError>;
