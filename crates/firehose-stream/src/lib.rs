//! Firehose Stream Library
//!
//! Continuous ingestion engine for a JSON sample feed delivered over a
//! long-lived chunked HTTP(S) response.
//!
//! The engine holds one authenticated response open indefinitely, inflates
//! gzip-encoded bodies incrementally as chunks arrive, re-frames the byte
//! stream into `\r\n`-terminated JSON records, and reconnects with
//! exponential backoff when the connection fails or stops making forward
//! progress.
//!
//! # Example
//!
//! ```rust,no_run
//! use firehose_stream::{
//!     ReaderConfig, RecordWriter, RetryPolicy, StreamEndpoint, Supervisor,
//! };
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() -> firehose_stream::Result<()> {
//!     let endpoint = StreamEndpoint::sample_feed("user", "secret");
//!     let supervisor = Supervisor::new(RetryPolicy::default(), ReaderConfig::default());
//!
//!     let stdout = std::io::stdout();
//!     let mut sink = RecordWriter::new(stdout.lock());
//!
//!     let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!     supervisor.start(&endpoint, &mut sink, shutdown_rx).await
//! }
//! ```
//!
//! # Output purity
//!
//! Records are the only thing written to the sink. All diagnostics go
//! through `tracing`, so a process that routes logs to stderr presents
//! downstream consumers with an uninterrupted line stream on stdout.
//!
//! # Testing
//!
//! The [`testing`] module provides an in-process feed server for
//! integration tests:
//!
//! ```rust,ignore
//! use firehose_stream::testing::{FeedFixture, TestFeedServer};
//!
//! let server = TestFeedServer::start(FeedFixture::new("user", "secret")).await?;
//! let endpoint = server.endpoint("user", "secret");
//! ```

mod connection;
mod decoder;
mod endpoint;
mod error;
mod framing;
mod objects;
mod reader;
mod record;
mod supervisor;
pub mod testing;
mod verify;

pub use connection::{AuthenticatedStream, Connection};
pub use decoder::GzipFrameDecoder;
pub use endpoint::{StreamEndpoint, DEFAULT_CHUNK_SIZE, DEFAULT_HOST, DEFAULT_PATH};
pub use error::{Result, StreamError};
pub use framing::{LineFramer, LINE_TERMINATOR};
pub use objects::run_object_stream;
pub use reader::{
    ByteSink, ChunkSource, LivenessGuardedReader, ReaderConfig, DEFAULT_MAX_EMPTY_READS,
};
pub use record::{augment_timestamp, emit_record, RecordWriter, CREATED_AT_FIELD, TIME_FIELD};
pub use supervisor::{RetryPolicy, Supervisor};
pub use verify::{verify_credentials, VerifyOutcome, VERIFY_QUERY};
