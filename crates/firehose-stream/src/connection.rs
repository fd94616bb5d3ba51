//! Authenticated HTTP(S) connection to the feed

use std::fmt;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use reqwest::header::{ACCEPT, ACCEPT_ENCODING, CONTENT_ENCODING, CONTENT_LENGTH, HOST, USER_AGENT};
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::endpoint::StreamEndpoint;
use crate::error::{Result, StreamError};
use crate::reader::ChunkSource;

/// User-Agent presented on every request
const USER_AGENT_STRING: &str = "firehose-stream/0.1";
/// Default connection timeout
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

type BodyStream = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>;

/// Opens one authenticated connection to a [`StreamEndpoint`] at a time.
///
/// No retry logic lives here: one `connect` call is one attempt on one
/// transport connection. Reconnection is the supervisor's job.
pub struct AuthenticatedStream {
    endpoint: StreamEndpoint,
    client: Client,
}

impl AuthenticatedStream {
    pub fn new(endpoint: StreamEndpoint) -> Result<Self> {
        // The engine inflates gzip itself, one stateful decoder per
        // connection, so reqwest's transparent decompression must stay off.
        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .no_gzip()
            .no_deflate()
            .no_brotli()
            .build()?;

        Ok(Self { endpoint, client })
    }

    /// Issue one GET and hold the response open for reading.
    ///
    /// With `check_status` set, any non-200 status fails with
    /// [`StreamError::HttpStatus`]. Credential verification passes `false`
    /// and inspects the status itself, since a rejection is an expected
    /// outcome there rather than an error.
    pub async fn connect(&self, check_status: bool) -> Result<Connection> {
        let url = self.endpoint.url()?;
        debug!("Connecting to {}", url);

        let response = self
            .client
            .get(url)
            .basic_auth(&self.endpoint.username, Some(&self.endpoint.password))
            .header(HOST, self.endpoint.host.as_str())
            .header(USER_AGENT, USER_AGENT_STRING)
            .header(ACCEPT, "*/*")
            .header(ACCEPT_ENCODING, "*,gzip")
            .header(CONTENT_LENGTH, "0")
            .send()
            .await?;

        let status = response.status();
        if check_status && status != StatusCode::OK {
            return Err(StreamError::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        let is_gzip = response
            .headers()
            .get(CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok())
            == Some("gzip");

        debug!("Connected, status {}, gzip: {}", status.as_u16(), is_gzip);

        Ok(Connection {
            status,
            is_gzip,
            body: Some(Box::pin(response.bytes_stream())),
        })
    }
}

/// One live response held open for incremental reading.
///
/// At most one of these exists per endpoint at any time; it is owned
/// exclusively by whoever called `connect` and must be closed (or dropped)
/// before a reconnect attempt.
pub struct Connection {
    status: StatusCode,
    is_gzip: bool,
    body: Option<BodyStream>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("status", &self.status)
            .field("is_gzip", &self.is_gzip)
            .field("open", &self.body.is_some())
            .finish()
    }
}

impl Connection {
    /// HTTP status the server answered with
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Whether the response body is gzip-encoded
    pub fn is_gzip(&self) -> bool {
        self.is_gzip
    }

    /// Release the underlying transport connection.
    ///
    /// Safe to call more than once; a closed connection reads as
    /// end-of-stream.
    pub fn close(&mut self) {
        self.body = None;
    }
}

#[async_trait]
impl ChunkSource for Connection {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        let Some(body) = self.body.as_mut() else {
            return Ok(None);
        };
        match body.next().await {
            Some(Ok(chunk)) => Ok(Some(chunk)),
            Some(Err(err)) => Err(err.into()),
            None => Ok(None),
        }
    }
}
