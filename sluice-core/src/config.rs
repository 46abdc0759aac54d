//! Centralized configuration for Sluice.
//!
//! All tunable parameters and settings are defined here to avoid
//! hard-coded values scattered throughout the codebase.

use std::path::PathBuf;

use crate::delivery::OffloadMode;

/// Central configuration for all Sluice components.
///
/// Groups related configuration settings into logical sections.
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct SluiceConfig {
    pub delivery: DeliveryConfig,
    pub offload: OffloadConfig,
    pub server: ServerConfig,
}

/// File delivery and streaming configuration.
///
/// Controls chunk sizing, flush cadence, and range-request support for
/// the chunked streamer.
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    /// Read size per iteration of the streaming loop
    pub chunk_size: usize,
    /// Cumulative output between sink flushes
    pub flush_interval_bytes: u64,
    /// Whether byte-range requests are honored
    pub range_enabled: bool,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            chunk_size: 65536,                        // 64 KiB
            flush_interval_bytes: 10 * 1024 * 1024,   // 10 MiB
            range_enabled: true,
        }
    }
}

/// Transfer offload configuration.
///
/// Describes the offload capability of the hosting environment. The host
/// declares what it supports at startup; nothing is detected at runtime.
#[derive(Debug, Clone, Default)]
pub struct OffloadConfig {
    /// Offload mechanism the hosting server provides
    pub mode: OffloadMode,
}

/// HTTP server configuration.
///
/// Controls the listen address, the directory files are served from, and
/// the buffering between the streamer and the response body.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to bind
    pub bind_address: String,
    /// Directory all served files must live under
    pub root_dir: PathBuf,
    /// Chunks buffered between the read loop and the response body
    pub stream_channel_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            root_dir: PathBuf::from("./files"),
            stream_channel_capacity: 8,
        }
    }
}

impl SluiceConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Allows runtime configuration via environment variables while
    /// maintaining sensible defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(chunk_size) = std::env::var("SLUICE_CHUNK_SIZE") {
            if let Ok(bytes) = chunk_size.parse::<usize>() {
                if bytes > 0 {
                    config.delivery.chunk_size = bytes;
                }
            }
        }

        if let Ok(ranges) = std::env::var("SLUICE_RANGE_ENABLED") {
            config.delivery.range_enabled = ranges.parse().unwrap_or(true);
        }

        if let Ok(bind) = std::env::var("SLUICE_BIND_ADDRESS") {
            config.server.bind_address = bind;
        }

        if let Ok(root) = std::env::var("SLUICE_ROOT_DIR") {
            config.server.root_dir = PathBuf::from(root);
        }

        if let Ok(mode) = std::env::var("SLUICE_OFFLOAD_MODE") {
            config.offload.mode = match mode.to_lowercase().as_str() {
                "sendfile" => OffloadMode::SendfileHeader,
                "internal-redirect" => OffloadMode::InternalRedirect {
                    location: std::env::var("SLUICE_OFFLOAD_LOCATION")
                        .unwrap_or_else(|_| "/protected".to_string()),
                },
                _ => OffloadMode::Disabled,
            };
        }

        config
    }

    /// Creates a configuration optimized for testing.
    ///
    /// Small chunk and flush sizes so loop and flush behavior is exercised
    /// by byte counts that fit in a unit test.
    pub fn for_testing() -> Self {
        Self {
            delivery: DeliveryConfig {
                chunk_size: 16,
                flush_interval_bytes: 64,
                range_enabled: true,
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = SluiceConfig::default();

        assert_eq!(config.delivery.chunk_size, 65536);
        assert_eq!(config.delivery.flush_interval_bytes, 10 * 1024 * 1024);
        assert!(config.delivery.range_enabled);
        assert_eq!(config.server.bind_address, "127.0.0.1:3000");
        assert_eq!(config.server.stream_channel_capacity, 8);
        assert!(matches!(config.offload.mode, OffloadMode::Disabled));
    }

    #[test]
    fn test_testing_preset() {
        let config = SluiceConfig::for_testing();

        assert_eq!(config.delivery.chunk_size, 16);
        assert_eq!(config.delivery.flush_interval_bytes, 64);
        assert!(config.delivery.range_enabled);
    }

    // Single test for all env overrides; parallel tests sharing the
    // process environment would race each other.
    #[test]
    fn test_env_override() {
        unsafe {
            std::env::set_var("SLUICE_CHUNK_SIZE", "4096");
            std::env::set_var("SLUICE_RANGE_ENABLED", "false");
            std::env::set_var("SLUICE_BIND_ADDRESS", "0.0.0.0:8080");
            std::env::set_var("SLUICE_OFFLOAD_MODE", "sendfile");
        }

        let config = SluiceConfig::from_env();

        assert_eq!(config.delivery.chunk_size, 4096);
        assert!(!config.delivery.range_enabled);
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert!(matches!(config.offload.mode, OffloadMode::SendfileHeader));

        unsafe {
            std::env::set_var("SLUICE_CHUNK_SIZE", "0");
            std::env::set_var("SLUICE_OFFLOAD_MODE", "internal-redirect");
            std::env::set_var("SLUICE_OFFLOAD_LOCATION", "/internal-files");
        }

        let config = SluiceConfig::from_env();

        // A zero chunk size would stall the read loop, so it is ignored
        assert_eq!(config.delivery.chunk_size, 65536);
        match config.offload.mode {
            OffloadMode::InternalRedirect { ref location } => {
                assert_eq!(location, "/internal-files");
            }
            ref other => panic!("expected internal redirect mode, got {other:?}"),
        }

        // Cleanup
        unsafe {
            std::env::remove_var("SLUICE_CHUNK_SIZE");
            std::env::remove_var("SLUICE_RANGE_ENABLED");
            std::env::remove_var("SLUICE_BIND_ADDRESS");
            std::env::remove_var("SLUICE_OFFLOAD_MODE");
            std::env::remove_var("SLUICE_OFFLOAD_LOCATION");
        }
    }
}
