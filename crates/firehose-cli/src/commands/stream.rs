//! Stream command - continuous feed ingestion to stdout

use anyhow::{Context, Result};
use firehose_stream::{ReaderConfig, RecordWriter, RetryPolicy, StreamEndpoint, Supervisor};
use tokio::sync::watch;
use tracing::info;

/// Run the supervised feed until Ctrl+C or the retry budget is spent.
pub async fn stream(endpoint: StreamEndpoint, chunk: usize, retries: u32) -> Result<()> {
    let policy = RetryPolicy {
        max_attempts: retries,
        ..RetryPolicy::default()
    };
    let supervisor = Supervisor::new(policy, ReaderConfig::default());

    // Ctrl+C is a graceful stop: the supervisor closes any open connection
    // and returns cleanly.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    info!(
        "Streaming {} to stdout, one record per line",
        endpoint.url().map(|u| u.to_string()).unwrap_or_default()
    );

    let stdout = std::io::stdout();
    let mut sink = RecordWriter::with_capacity(stdout.lock(), chunk);

    supervisor
        .start(&endpoint, &mut sink, shutdown_rx)
        .await
        .context("Feed stream ended")
}
