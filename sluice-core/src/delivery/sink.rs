//! Output channel abstraction for the chunked streamer.
//!
//! The streamer never talks to a socket directly; it emits chunks into a
//! [`DeliverySink`]. The HTTP layer bridges a sink onto a response body, and
//! tests substitute in-memory sinks. A sink reporting [`SinkClosed`] is the
//! cooperative cancellation signal: the peer is gone and the transfer should
//! stop, without treating it as a failure.

use bytes::Bytes;

/// The peer side of the sink is gone; stop sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkClosed;

/// Receives the bytes of one delivery.
#[async_trait::async_trait]
pub trait DeliverySink: Send {
    /// Emits one chunk toward the client.
    ///
    /// # Errors
    ///
    /// - `SinkClosed` - The peer disconnected; the transfer should end
    async fn send(&mut self, chunk: Bytes) -> Result<(), SinkClosed>;

    /// Drains any buffering between the sink and the client.
    ///
    /// # Errors
    ///
    /// - `SinkClosed` - The peer disconnected; the transfer should end
    async fn flush(&mut self) -> Result<(), SinkClosed>;
}

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support {
    //! In-memory sinks for exercising the streamer without a socket.

    use super::*;

    /// Collects everything sent into a buffer and counts flushes.
    #[derive(Debug, Default)]
    pub struct CollectSink {
        pub received: Vec<u8>,
        pub flushes: usize,
    }

    impl CollectSink {
        pub fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait::async_trait]
    impl DeliverySink for CollectSink {
        async fn send(&mut self, chunk: Bytes) -> Result<(), SinkClosed> {
            self.received.extend_from_slice(&chunk);
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), SinkClosed> {
            self.flushes += 1;
            Ok(())
        }
    }

    /// Accepts a fixed number of sends, then reports the peer as gone.
    #[derive(Debug)]
    pub struct ClosingSink {
        pub received: Vec<u8>,
        sends_before_close: usize,
        sends_seen: usize,
    }

    impl ClosingSink {
        pub fn after_sends(sends_before_close: usize) -> Self {
            Self {
                received: Vec::new(),
                sends_before_close,
                sends_seen: 0,
            }
        }
    }

    #[async_trait::async_trait]
    impl DeliverySink for ClosingSink {
        async fn send(&mut self, chunk: Bytes) -> Result<(), SinkClosed> {
            if self.sends_seen >= self.sends_before_close {
                return Err(SinkClosed);
            }
            self.sends_seen += 1;
            self.received.extend_from_slice(&chunk);
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), SinkClosed> {
            if self.sends_seen >= self.sends_before_close {
                return Err(SinkClosed);
            }
            Ok(())
        }
    }
}
