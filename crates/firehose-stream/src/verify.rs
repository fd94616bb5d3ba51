//! Credential verification against the feed endpoint

use tracing::debug;

use crate::connection::AuthenticatedStream;
use crate::endpoint::StreamEndpoint;
use crate::error::Result;

/// Query string the verifier appends: the length-delimited feed variant
/// answers immediately, so the check does not have to read any body.
pub const VERIFY_QUERY: &str = "?delimited=length";

/// Outcome of a credential check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    Valid,
    /// Server refused the credentials
    Invalid { status: u16, reason: String },
}

/// Check a credential set with a single authenticated request.
///
/// A non-200 status is an expected outcome here, not an error, so the
/// connection is made with status checking disabled; only transport-level
/// failures surface as errors.
pub async fn verify_credentials(endpoint: &StreamEndpoint) -> Result<VerifyOutcome> {
    let mut endpoint = endpoint.clone();
    if !endpoint.path.contains('?') {
        endpoint.path.push_str(VERIFY_QUERY);
    }

    let stream = AuthenticatedStream::new(endpoint)?;
    let mut connection = stream.connect(false).await?;
    let status = connection.status();
    connection.close();

    debug!("Verification request answered {}", status.as_u16());

    if status == reqwest::StatusCode::OK {
        Ok(VerifyOutcome::Valid)
    } else {
        Ok(VerifyOutcome::Invalid {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("unknown").to_string(),
        })
    }
}
