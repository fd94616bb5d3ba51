//! Verify command - one-shot credential check

use anyhow::Result;
use firehose_stream::{verify_credentials, StreamEndpoint, VerifyOutcome};

/// Check credentials and print a one-line status token on stdout.
///
/// Returns the process exit code: 0 for valid credentials, 1 for invalid.
pub async fn verify(endpoint: StreamEndpoint) -> Result<i32> {
    match verify_credentials(&endpoint).await? {
        VerifyOutcome::Valid => {
            println!("--status=success");
            Ok(0)
        }
        VerifyOutcome::Invalid { status, reason } => {
            println!("--status=fail - {} {}", status, reason);
            Ok(1)
        }
    }
}
