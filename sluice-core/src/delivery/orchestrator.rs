//! Delivery orchestration: validate, route, stream.
//!
//! `FileDelivery` is the entry point of the subsystem. A call moves through
//! `Validating` into one of `Offloading`, `StreamingFull`,
//! `StreamingPartial`, or `Rejected`; the first three are terminal
//! successes, rejection surfaces as a [`DeliveryError`].

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use super::headers::{ResponseHead, compose};
use super::offload::{OffloadDispatcher, OffloadMode};
use super::range::{RangeOutcome, parse_range};
use super::sink::DeliverySink;
use super::streamer::ChunkedStreamer;
use super::{DeliveryError, DeliveryOutcome, DeliveryRequest};
use crate::config::DeliveryConfig;
use crate::fs::MimeResolver;

/// Instructions for streaming one byte window of a file.
#[derive(Debug, Clone)]
pub struct StreamPlan {
    pub path: PathBuf,
    pub offset: u64,
    pub length: u64,
    pub chunk_size: usize,
}

/// How the response body gets to the client.
#[derive(Debug, Clone)]
pub enum Transfer {
    /// The hosting server performs the transfer; the response has no body
    Offloaded,
    /// The chunked streamer produces the body
    Stream(StreamPlan),
}

/// A validated delivery decision: response head plus transfer instructions.
#[derive(Debug, Clone)]
pub struct PreparedDelivery {
    pub head: ResponseHead,
    pub transfer: Transfer,
}

/// Orchestrates single-file delivery.
///
/// Holds the delivery configuration, the host's offload capability, and the
/// MIME resolution collaborator. One instance serves many requests; each
/// call is independent.
pub struct FileDelivery {
    config: DeliveryConfig,
    offload: OffloadDispatcher,
    mime_resolver: Arc<dyn MimeResolver>,
}

impl FileDelivery {
    /// Creates an orchestrator with the given configuration and collaborators.
    pub fn new(
        config: DeliveryConfig,
        offload_mode: OffloadMode,
        mime_resolver: Arc<dyn MimeResolver>,
    ) -> Self {
        Self {
            config,
            offload: OffloadDispatcher::new(offload_mode),
            mime_resolver,
        }
    }

    /// Validates the target and decides how it will be delivered.
    ///
    /// Confirms the target is an existing regular file, resolves the
    /// effective content type, negotiates offload, and parses any range
    /// header against the file size. The existence check is inherently
    /// racy against concurrent file removal; the streamer surfaces a short
    /// transfer in that case.
    ///
    /// # Errors
    ///
    /// - `DeliveryError::NotFound` - Target missing or not a regular file
    /// - `DeliveryError::Unreadable` - Target metadata could not be read
    /// - `DeliveryError::UnsatisfiableRange` - Range lies outside the file
    pub async fn prepare(
        &self,
        request: &DeliveryRequest,
        range_header: Option<&str>,
    ) -> Result<PreparedDelivery, DeliveryError> {
        let metadata = match tokio::fs::metadata(&request.file_path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DeliveryError::NotFound {
                    path: request.file_path.clone(),
                });
            }
            Err(e) => {
                return Err(DeliveryError::Unreadable {
                    path: request.file_path.clone(),
                    reason: e.to_string(),
                });
            }
        };

        if !metadata.is_file() {
            return Err(DeliveryError::NotFound {
                path: request.file_path.clone(),
            });
        }
        let total_size = metadata.len();

        let resolved_mime = request
            .mime_override
            .clone()
            .unwrap_or_else(|| self.mime_resolver.resolve(&request.file_path));

        if request.offload_enabled && self.offload.supports() {
            if let Some(head) = self.offload.dispatch(request, &resolved_mime) {
                info!(
                    "Offloading transfer of {} ({} bytes)",
                    request.file_path.display(),
                    total_size
                );
                return Ok(PreparedDelivery {
                    head,
                    transfer: Transfer::Offloaded,
                });
            }
        }

        // A request with range support disabled never parses the header
        let range = if request.range_enabled {
            match parse_range(range_header, total_size) {
                RangeOutcome::Unsatisfiable { total_size } => {
                    return Err(DeliveryError::UnsatisfiableRange { total_size });
                }
                RangeOutcome::Partial(range) => Some(range),
                RangeOutcome::Full => None,
            }
        } else {
            None
        };

        let head = compose(request, &resolved_mime, range.as_ref(), total_size);
        let (offset, length) = match &range {
            Some(range) => (range.start(), range.len()),
            None => (0, total_size),
        };

        debug!(
            "Streaming {} bytes of {} from offset {}",
            length,
            request.file_path.display(),
            offset
        );

        Ok(PreparedDelivery {
            head,
            transfer: Transfer::Stream(StreamPlan {
                path: request.file_path.clone(),
                offset,
                length,
                chunk_size: request.chunk_size,
            }),
        })
    }

    /// Delivers a file end to end into the given sink.
    ///
    /// The single entry point of the subsystem: prepares the delivery and,
    /// for streamed transfers, runs the chunked streamer. Offloaded
    /// deliveries emit no body; the response head from [`Self::prepare`]
    /// carries the offload header.
    pub async fn deliver(
        &self,
        request: &DeliveryRequest,
        range_header: Option<&str>,
        sink: &mut dyn DeliverySink,
    ) -> DeliveryOutcome {
        let prepared = match self.prepare(request, range_header).await {
            Ok(prepared) => prepared,
            Err(e) => return DeliveryOutcome::Failed(e),
        };

        match prepared.transfer {
            Transfer::Offloaded => DeliveryOutcome::Offloaded,
            Transfer::Stream(plan) => {
                let streamer =
                    ChunkedStreamer::new(plan.chunk_size, self.config.flush_interval_bytes);
                match streamer.stream(&plan.path, plan.offset, plan.length, sink).await {
                    Ok(bytes_sent) => DeliveryOutcome::Streamed { bytes_sent },
                    Err(e) => DeliveryOutcome::Failed(e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use tempfile::TempDir;
    use tokio::fs;

    use super::super::sink::test_support::CollectSink;
    use super::*;
    use crate::fs::FixedMimeResolver;

    fn delivery(mode: OffloadMode, mime: &str) -> FileDelivery {
        FileDelivery::new(
            DeliveryConfig {
                chunk_size: 64,
                ..Default::default()
            },
            mode,
            Arc::new(FixedMimeResolver::new(mime)),
        )
    }

    async fn test_file(dir: &TempDir, name: &str, len: usize) -> (PathBuf, Vec<u8>) {
        let content: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        let path = dir.path().join(name);
        fs::write(&path, &content).await.unwrap();
        (path, content)
    }

    fn request_for(path: &PathBuf) -> DeliveryRequest {
        DeliveryRequest::new(
            path.clone(),
            path.file_name().unwrap().to_string_lossy(),
            &DeliveryConfig {
                chunk_size: 64,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_full_delivery_streams_whole_file() {
        let dir = TempDir::new().unwrap();
        let (path, content) = test_file(&dir, "data.bin", 1000).await;
        let delivery = delivery(OffloadMode::Disabled, "application/pdf");

        let mut sink = CollectSink::new();
        let outcome = delivery.deliver(&request_for(&path), None, &mut sink).await;

        assert!(matches!(outcome, DeliveryOutcome::Streamed { bytes_sent: 1000 }));
        assert_eq!(sink.received, content);
    }

    #[tokio::test]
    async fn test_partial_delivery_streams_window() {
        let dir = TempDir::new().unwrap();
        let (path, content) = test_file(&dir, "data.bin", 1000).await;
        let delivery = delivery(OffloadMode::Disabled, "application/pdf");

        let mut sink = CollectSink::new();
        let outcome = delivery
            .deliver(&request_for(&path), Some("bytes=500-"), &mut sink)
            .await;

        assert!(matches!(outcome, DeliveryOutcome::Streamed { bytes_sent: 500 }));
        assert_eq!(sink.received, &content[500..]);
    }

    #[tokio::test]
    async fn test_partial_prepare_sets_206_head() {
        let dir = TempDir::new().unwrap();
        let (path, _) = test_file(&dir, "data.bin", 1000).await;
        let delivery = delivery(OffloadMode::Disabled, "application/pdf");

        let prepared = delivery
            .prepare(&request_for(&path), Some("bytes=500-"))
            .await
            .unwrap();

        assert_eq!(prepared.head.status, StatusCode::PARTIAL_CONTENT);
        assert_eq!(
            prepared.head.headers.get("content-range").unwrap(),
            "bytes 500-999/1000"
        );
        let Transfer::Stream(plan) = prepared.transfer else {
            panic!("expected streamed transfer");
        };
        assert_eq!((plan.offset, plan.length), (500, 500));
    }

    #[tokio::test]
    async fn test_unsatisfiable_range_is_rejected() {
        let dir = TempDir::new().unwrap();
        let (path, _) = test_file(&dir, "data.bin", 1000).await;
        let delivery = delivery(OffloadMode::Disabled, "application/pdf");

        let result = delivery
            .prepare(&request_for(&path), Some("bytes=1200-1300"))
            .await;

        assert!(matches!(
            result,
            Err(DeliveryError::UnsatisfiableRange { total_size: 1000 })
        ));
    }

    #[tokio::test]
    async fn test_missing_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.bin");
        let delivery = delivery(OffloadMode::Disabled, "application/pdf");

        let mut sink = CollectSink::new();
        let outcome = delivery.deliver(&request_for(&path), None, &mut sink).await;

        assert!(matches!(
            outcome,
            DeliveryOutcome::Failed(DeliveryError::NotFound { .. })
        ));
        assert!(sink.received.is_empty());
    }

    #[tokio::test]
    async fn test_directory_is_rejected_as_not_found() {
        let dir = TempDir::new().unwrap();
        let subdir = dir.path().join("nested");
        fs::create_dir(&subdir).await.unwrap();
        let delivery = delivery(OffloadMode::Disabled, "application/pdf");

        let result = delivery.prepare(&request_for(&subdir), None).await;

        assert!(matches!(result, Err(DeliveryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_offload_takes_priority_over_streaming() {
        let dir = TempDir::new().unwrap();
        let (path, _) = test_file(&dir, "data.bin", 1000).await;
        let delivery = delivery(OffloadMode::SendfileHeader, "application/pdf");

        let mut request = request_for(&path);
        request.offload_enabled = true;

        let mut sink = CollectSink::new();
        let outcome = delivery.deliver(&request, None, &mut sink).await;

        assert!(matches!(outcome, DeliveryOutcome::Offloaded));
        assert!(sink.received.is_empty());
    }

    #[tokio::test]
    async fn test_offload_unrequested_falls_through_to_streaming() {
        let dir = TempDir::new().unwrap();
        let (path, _) = test_file(&dir, "data.bin", 1000).await;
        // Capability present but the request does not opt in
        let delivery = delivery(OffloadMode::SendfileHeader, "application/pdf");

        let mut sink = CollectSink::new();
        let outcome = delivery.deliver(&request_for(&path), None, &mut sink).await;

        assert!(matches!(outcome, DeliveryOutcome::Streamed { bytes_sent: 1000 }));
    }

    #[tokio::test]
    async fn test_range_ignored_when_disabled() {
        let dir = TempDir::new().unwrap();
        let (path, content) = test_file(&dir, "data.bin", 1000).await;
        let delivery = delivery(OffloadMode::Disabled, "application/pdf");

        let mut request = request_for(&path);
        request.range_enabled = false;

        let prepared = delivery
            .prepare(&request, Some("bytes=500-"))
            .await
            .unwrap();
        assert_eq!(prepared.head.status, StatusCode::OK);
        assert_eq!(prepared.head.headers.get("accept-ranges").unwrap(), "none");

        let mut sink = CollectSink::new();
        let outcome = delivery.deliver(&request, Some("bytes=500-"), &mut sink).await;
        assert!(matches!(outcome, DeliveryOutcome::Streamed { bytes_sent: 1000 }));
        assert_eq!(sink.received, content);
    }

    #[tokio::test]
    async fn test_mime_override_wins_over_resolver() {
        let dir = TempDir::new().unwrap();
        let (path, _) = test_file(&dir, "data.bin", 100).await;
        let delivery = delivery(OffloadMode::Disabled, "application/pdf");

        let mut request = request_for(&path);
        request.mime_override = Some("audio/flac".to_string());

        let prepared = delivery.prepare(&request, None).await.unwrap();
        assert_eq!(prepared.head.headers.get("content-type").unwrap(), "audio/flac");
    }
}
