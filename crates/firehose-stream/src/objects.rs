//! Decoded-object feed variant
//!
//! The OAuth streaming client is an external collaborator that hands over
//! already-decoded JSON objects instead of raw bytes. This path gives those
//! objects the same `__time` augmentation and compact `\r\n`-terminated
//! emission as the line-framed path, so both variants produce identical
//! downstream records.

use std::io::Write;

use futures::{Stream, StreamExt};
use serde_json::Value;
use tracing::warn;

use crate::error::Result;
use crate::record::{augment_timestamp, write_record};

/// Drain a stream of decoded JSON objects into `out`, one record per line.
///
/// Feed-reported errors are logged and skipped; the stream keeps being
/// consumed. Returns when the upstream closes.
pub async fn run_object_stream<S, E>(mut objects: S, out: &mut impl Write) -> Result<()>
where
    S: Stream<Item = std::result::Result<Value, E>> + Unpin,
    E: std::fmt::Display,
{
    while let Some(item) = objects.next().await {
        match item {
            Ok(mut value) => {
                augment_timestamp(&mut value);
                write_record(&value, out)?;
            }
            Err(err) => {
                warn!("Feed reported an error: {}", err);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_objects_get_the_same_augmentation_as_lines() {
        let objects = stream::iter(vec![
            Ok::<_, String>(json!({"created_at": "X", "id": 1})),
            Ok(json!({"id": 2})),
        ]);

        let mut out = Vec::new();
        run_object_stream(Box::pin(objects), &mut out).await.unwrap();

        assert_eq!(
            out,
            b"{\"created_at\":\"X\",\"id\":1,\"__time\":\"X\"}\r\n{\"id\":2}\r\n"
        );
    }

    #[tokio::test]
    async fn test_feed_errors_are_skipped_not_fatal() {
        let objects = stream::iter(vec![
            Ok::<_, String>(json!({"id": 1})),
            Err("rate limited".to_string()),
            Ok(json!({"id": 2})),
        ]);

        let mut out = Vec::new();
        run_object_stream(Box::pin(objects), &mut out).await.unwrap();

        assert_eq!(out, b"{\"id\":1}\r\n{\"id\":2}\r\n");
    }
}
