//! Reconnect-with-backoff supervision of the read loop

use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info};

use crate::connection::AuthenticatedStream;
use crate::decoder::GzipFrameDecoder;
use crate::endpoint::StreamEndpoint;
use crate::error::{Result, StreamError};
use crate::reader::{ByteSink, LivenessGuardedReader, ReaderConfig};

/// Exponential-backoff retry policy for the connect+read cycle
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Connection attempts before giving up
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Backoff multiplier applied after each failure
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay: Duration::from_secs(3),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Sleep before the k-th retry (1-based): `initial * multiplier^(k-1)`
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.initial_delay * self.multiplier.saturating_pow(retry.saturating_sub(1))
    }
}

/// Wraps the whole connect+pump cycle in a retry envelope.
///
/// Each attempt gets a fresh connection, a fresh decoder, and a fresh stall
/// counter; retry state is reset on every [`start`](Self::start) call and
/// never shared across invocations. At most one connection is open at a
/// time per endpoint.
pub struct Supervisor {
    policy: RetryPolicy,
    reader: LivenessGuardedReader,
}

impl Supervisor {
    pub fn new(policy: RetryPolicy, reader_config: ReaderConfig) -> Self {
        Self {
            policy,
            reader: LivenessGuardedReader::new(reader_config),
        }
    }

    /// Run the connect+pump cycle under the retry policy.
    ///
    /// Does not return while the feed is healthy. A shutdown signal on
    /// `shutdown` is a graceful stop and returns `Ok(())` after closing any
    /// open connection. Every connect, read, and decompress failure is
    /// logged and retried after a backoff sleep; once the attempt budget is
    /// spent, fails with [`StreamError::RetriesExhausted`].
    pub async fn start<K>(
        &self,
        endpoint: &StreamEndpoint,
        sink: &mut K,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()>
    where
        K: ByteSink,
    {
        let stream = AuthenticatedStream::new(endpoint.clone())?;

        for attempt in 1..=self.policy.max_attempts {
            let result = tokio::select! {
                result = self.cycle(&stream, sink) => result,
                _ = shutdown.changed() => {
                    info!("Shutdown requested, closing stream");
                    return Ok(());
                }
            };

            let err = match result {
                Ok(()) => return Ok(()),
                Err(err) => err,
            };

            let delay = self.policy.delay_for(attempt);
            error!(
                "Stream attempt {} failed: {}, retrying in {} seconds",
                attempt,
                err,
                delay.as_secs_f64()
            );

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => {
                    info!("Shutdown requested during backoff");
                    return Ok(());
                }
            }
        }

        Err(StreamError::RetriesExhausted {
            attempts: self.policy.max_attempts,
        })
    }

    /// One full attempt: connect, then pump until the stream dies.
    ///
    /// Always closes the connection before returning, so a retry never
    /// leaks a socket. Only ever returns an error in practice; the pump
    /// loop has no success exit.
    async fn cycle<K>(&self, stream: &AuthenticatedStream, sink: &mut K) -> Result<()>
    where
        K: ByteSink,
    {
        let mut connection = stream.connect(true).await?;
        let mut decoder = GzipFrameDecoder::new(connection.is_gzip());

        let result = self.reader.pump(&mut connection, &mut decoder, sink).await;
        connection.close();
        result
    }
}
