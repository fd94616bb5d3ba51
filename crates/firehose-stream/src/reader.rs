//! Read loop with liveness detection
//!
//! The feed is pull-based on the server side: a healthy connection can
//! legitimately deliver sparse or empty chunks. Repeated reads that yield
//! no decoded output are the only signal that the connection is dead or
//! hung, so the reader counts consecutive empty reads and abandons the
//! stream once a ceiling is reached.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{trace, warn};

use crate::decoder::GzipFrameDecoder;
use crate::error::{Result, StreamError};

/// Consecutive empty reads tolerated before the stream is declared stalled
pub const DEFAULT_MAX_EMPTY_READS: u32 = 100;
/// How long one read may sit idle before it counts as an empty read
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of raw body chunks: the seam between the reader and the
/// transport. [`Connection`](crate::Connection) implements this over a live
/// response; tests script it directly.
#[async_trait]
pub trait ChunkSource: Send {
    /// Pull the next raw chunk. `Ok(None)` means the peer closed the
    /// response, which for a continuous feed is just another kind of empty
    /// read.
    async fn next_chunk(&mut self) -> Result<Option<Bytes>>;
}

/// Destination for decoded bytes.
///
/// Each pump iteration forwards its decoded output as one complete `write`
/// call; the reader never buffers output across iterations. A write
/// failure aborts the current stream attempt, the same as a transport
/// error: a feed whose output can no longer be delivered must not keep
/// consuming.
pub trait ByteSink {
    fn write(&mut self, chunk: &[u8]) -> std::io::Result<()>;
}

impl ByteSink for Vec<u8> {
    fn write(&mut self, chunk: &[u8]) -> std::io::Result<()> {
        self.extend_from_slice(chunk);
        Ok(())
    }
}

/// Tuning for the read loop
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Stall ceiling: consecutive empty reads before giving up
    pub max_empty_reads: u32,
    /// Per-read idle timeout; expiry counts as one empty read
    pub read_timeout: Duration,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_empty_reads: DEFAULT_MAX_EMPTY_READS,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Drives reads from a connection until it errors out or stalls.
pub struct LivenessGuardedReader {
    config: ReaderConfig,
}

impl LivenessGuardedReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Pump chunks from `source` through `decoder` into `sink`.
    ///
    /// Runs indefinitely on a healthy feed. The only exits are a transport,
    /// decompression, or sink write error, or [`StreamError::Stalled`] once
    /// `max_empty_reads` consecutive reads produce no decoded bytes. Any
    /// non-empty decoded chunk resets the stall counter.
    pub async fn pump<S, K>(
        &self,
        source: &mut S,
        decoder: &mut GzipFrameDecoder,
        sink: &mut K,
    ) -> Result<()>
    where
        S: ChunkSource + ?Sized,
        K: ByteSink + ?Sized,
    {
        let mut empty_reads = 0u32;

        while empty_reads < self.config.max_empty_reads {
            let chunk = match tokio::time::timeout(self.config.read_timeout, source.next_chunk())
                .await
            {
                Ok(result) => result?,
                Err(_) => {
                    trace!("Read timed out, counting as empty");
                    empty_reads += 1;
                    continue;
                }
            };

            let decoded = decoder.feed(chunk.unwrap_or_default())?;
            sink.write(&decoded)?;

            if decoded.is_empty() {
                empty_reads += 1;
            } else {
                empty_reads = 0;
            }
        }

        warn!(
            "No forward progress after {} reads, abandoning stream",
            self.config.max_empty_reads
        );
        Err(StreamError::Stalled(self.config.max_empty_reads))
    }
}
