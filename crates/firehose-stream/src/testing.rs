//! Test utilities for firehose-stream
//!
//! Provides an in-process feed server for integration tests: it checks
//! basic auth, then answers with a scripted body, optionally
//! gzip-compressed, on any path.

use std::io::Write;
use std::net::SocketAddr;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tokio::net::TcpListener;

use crate::endpoint::StreamEndpoint;

/// Scripted behavior for the feed server
#[derive(Debug, Clone)]
pub struct FeedFixture {
    pub username: String,
    pub password: String,
    /// Decoded body the server streams after a successful auth check
    pub body: Vec<u8>,
    /// Compress the body and declare `content-encoding: gzip`
    pub gzip: bool,
    /// Status for authenticated requests (non-200 scripts a server failure)
    pub status: StatusCode,
}

impl FeedFixture {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            body: Vec::new(),
            gzip: false,
            status: StatusCode::OK,
        }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_gzip(mut self) -> Self {
        self.gzip = true;
        self
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

/// A feed server that shuts down when dropped
pub struct TestFeedServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestFeedServer {
    /// Bind to an ephemeral port and start serving the fixture
    pub async fn start(fixture: FeedFixture) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let router: Router = Router::new()
            .fallback(serve_feed)
            .with_state(fixture);

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Endpoint pointing at this server over plain HTTP
    pub fn endpoint(&self, username: &str, password: &str) -> StreamEndpoint {
        StreamEndpoint::new(
            username,
            password,
            self.addr.to_string(),
            "/1/statuses/sample.json",
            false,
        )
    }

    /// Stop the server and wait for it to finish
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestFeedServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn serve_feed(State(fixture): State<FeedFixture>, headers: HeaderMap) -> Response {
    if !authorized(&headers, &fixture) {
        return (StatusCode::UNAUTHORIZED, "bad credentials").into_response();
    }

    if fixture.status != StatusCode::OK {
        return (fixture.status, "scripted failure").into_response();
    }

    if fixture.gzip {
        (
            [(header::CONTENT_ENCODING, "gzip")],
            gzip_bytes(&fixture.body),
        )
            .into_response()
    } else {
        fixture.body.clone().into_response()
    }
}

fn authorized(headers: &HeaderMap, fixture: &FeedFixture) -> bool {
    let expected = format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", fixture.username, fixture.password))
    );
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(expected.as_str())
}

/// Compress a fixture body the way the real feed would
pub fn gzip_bytes(payload: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(payload).expect("gzip fixture");
    encoder.finish().expect("gzip fixture")
}
