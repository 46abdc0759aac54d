//! Bounded read-and-emit loop over a file handle.
//!
//! Reads a byte window in chunks, pushes each chunk into a
//! [`DeliverySink`](super::sink::DeliverySink), and stops promptly when the
//! peer disconnects. The file handle is scoped to one call and is released
//! on every exit path.

use std::io::SeekFrom;
use std::path::Path;

use bytes::Bytes;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::debug;

use super::sink::DeliverySink;
use super::DeliveryError;

/// Streams file bytes into a sink in bounded chunks.
#[derive(Debug, Clone)]
pub struct ChunkedStreamer {
    chunk_size: usize,
    flush_interval_bytes: u64,
}

impl ChunkedStreamer {
    /// Creates a streamer with the given chunk size and flush cadence.
    pub fn new(chunk_size: usize, flush_interval_bytes: u64) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            flush_interval_bytes: flush_interval_bytes.max(1),
        }
    }

    /// Streams `length` bytes starting at `offset` into the sink.
    ///
    /// Returns the number of bytes actually sent. The loop ends when the
    /// requested count has been sent, at end-of-file, or when the sink
    /// reports the peer gone; the last two yield a short count, not an
    /// error. A read error after the file is open also ends the loop with
    /// the bytes sent so far: a partially sent response is accepted as a
    /// best-effort outcome. The sink is flushed whenever cumulative output
    /// crosses a flush-interval boundary.
    ///
    /// # Errors
    ///
    /// - `DeliveryError::Unreadable` - The file could not be opened
    pub async fn stream(
        &self,
        path: &Path,
        offset: u64,
        length: u64,
        sink: &mut dyn DeliverySink,
    ) -> Result<u64, DeliveryError> {
        let mut file = File::open(path)
            .await
            .map_err(|e| DeliveryError::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if offset > 0 {
            file.seek(SeekFrom::Start(offset))
                .await
                .map_err(|e| DeliveryError::Unreadable {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
        }

        let mut buffer = vec![0u8; self.chunk_size];
        let mut sent: u64 = 0;

        while sent < length {
            let want = self.chunk_size.min((length - sent) as usize);
            let read = match file.read(&mut buffer[..want]).await {
                Ok(0) => break, // end of file
                Ok(n) => n,
                Err(e) => {
                    debug!("Read failed after {} bytes of {}: {}", sent, length, e);
                    break;
                }
            };

            if sink
                .send(Bytes::copy_from_slice(&buffer[..read]))
                .await
                .is_err()
            {
                debug!("Peer disconnected after {} bytes of {}", sent, length);
                break;
            }

            let flushed_intervals = sent / self.flush_interval_bytes;
            sent += read as u64;

            // Flush on crossing an interval boundary, not on exact multiples;
            // chunk sizes rarely divide the interval evenly
            if sent / self.flush_interval_bytes > flushed_intervals
                && sink.flush().await.is_err()
            {
                debug!("Peer disconnected at flush after {} bytes", sent);
                break;
            }
        }

        Ok(sent)
    }
}
