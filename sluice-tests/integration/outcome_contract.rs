//! Delivery outcome reporting via the orchestrator's sink entry point.

use std::sync::Arc;

use sluice_core::config::DeliveryConfig;
use sluice_core::delivery::sink::test_support::{ClosingSink, CollectSink};
use sluice_core::delivery::{DeliveryOutcome, DeliveryRequest, FileDelivery, OffloadMode};
use sluice_core::fs::GuessMimeResolver;
use tempfile::TempDir;

use crate::support::patterned;

fn delivery(mode: OffloadMode) -> FileDelivery {
    FileDelivery::new(
        DeliveryConfig {
            chunk_size: 64,
            ..Default::default()
        },
        mode,
        Arc::new(GuessMimeResolver),
    )
}

fn request_for(path: &std::path::Path) -> DeliveryRequest {
    DeliveryRequest::new(
        path,
        path.file_name().unwrap().to_string_lossy(),
        &DeliveryConfig {
            chunk_size: 64,
            ..Default::default()
        },
    )
}

#[tokio::test]
async fn test_streamed_outcome_reports_bytes_sent() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("data.bin");
    tokio::fs::write(&path, patterned(1000)).await.unwrap();

    let mut sink = CollectSink::new();
    let outcome = delivery(OffloadMode::Disabled)
        .deliver(&request_for(&path), Some("bytes=250-749"), &mut sink)
        .await;

    assert!(matches!(outcome, DeliveryOutcome::Streamed { bytes_sent: 500 }));
    assert_eq!(sink.received.len(), 500);
}

#[tokio::test]
async fn test_offloaded_outcome_sends_no_bytes() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("data.bin");
    tokio::fs::write(&path, patterned(1000)).await.unwrap();

    let mut request = request_for(&path);
    request.offload_enabled = true;

    let mut sink = CollectSink::new();
    let outcome = delivery(OffloadMode::SendfileHeader)
        .deliver(&request, None, &mut sink)
        .await;

    assert!(matches!(outcome, DeliveryOutcome::Offloaded));
    assert!(sink.received.is_empty());
}

#[tokio::test]
async fn test_disconnect_mid_stream_is_not_a_failure() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("data.bin");
    tokio::fs::write(&path, patterned(1000)).await.unwrap();

    let mut sink = ClosingSink::after_sends(2);
    let outcome = delivery(OffloadMode::Disabled)
        .deliver(&request_for(&path), None, &mut sink)
        .await;

    // Two 64-byte chunks made it out before the peer vanished
    let DeliveryOutcome::Streamed { bytes_sent } = outcome else {
        panic!("disconnect must not surface as a failure, got {outcome:?}");
    };
    assert_eq!(bytes_sent, 128);
}
