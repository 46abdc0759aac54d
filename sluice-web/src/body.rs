//! Bridges the delivery sink onto an axum response body.
//!
//! The streamer pushes chunks into a bounded channel; the receiving end is
//! wrapped as the response body. When the client disconnects, the body is
//! dropped, the channel closes, and the streamer observes `SinkClosed` on
//! its next send. That closure is the subsystem's only cancellation signal.

use axum::body::Body;
use bytes::Bytes;
use futures::stream;
use sluice_core::delivery::{DeliverySink, SinkClosed};
use tokio::sync::mpsc;

/// Sink half of a streaming response body.
pub struct ChannelSink {
    tx: mpsc::Sender<Bytes>,
}

#[async_trait::async_trait]
impl DeliverySink for ChannelSink {
    async fn send(&mut self, chunk: Bytes) -> Result<(), SinkClosed> {
        self.tx.send(chunk).await.map_err(|_| SinkClosed)
    }

    async fn flush(&mut self) -> Result<(), SinkClosed> {
        // Chunks go straight to the body; there is no buffer to drain.
        // Closure still surfaces here so a flush observes a gone peer.
        if self.tx.is_closed() {
            return Err(SinkClosed);
        }
        Ok(())
    }
}

/// Creates a connected sink/body pair with the given chunk capacity.
///
/// The capacity bounds how far the read loop can run ahead of the client;
/// a slow consumer backpressures the streamer through the channel.
pub fn channel_body(capacity: usize) -> (ChannelSink, Body) {
    let (tx, rx) = mpsc::channel::<Bytes>(capacity.max(1));

    let stream = stream::unfold(rx, |mut rx| async move {
        rx.recv()
            .await
            .map(|chunk| (Ok::<_, std::io::Error>(chunk), rx))
    });

    (ChannelSink { tx }, Body::from_stream(stream))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_chunks_flow_into_body() {
        let (mut sink, body) = channel_body(4);

        let producer = tokio::spawn(async move {
            sink.send(Bytes::from_static(b"hello ")).await.unwrap();
            sink.send(Bytes::from_static(b"world")).await.unwrap();
            sink.flush().await.unwrap();
        });

        let collected = axum::body::to_bytes(body, 1024).await.unwrap();
        producer.await.unwrap();

        assert_eq!(collected.as_ref(), b"hello world");
    }

    #[tokio::test]
    async fn test_dropped_body_closes_sink() {
        let (mut sink, body) = channel_body(1);
        drop(body);

        assert_eq!(sink.send(Bytes::from_static(b"x")).await, Err(SinkClosed));
        assert_eq!(sink.flush().await, Err(SinkClosed));
    }
}
