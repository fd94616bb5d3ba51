//! Stream endpoint description

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Result;

/// Default feed host
pub const DEFAULT_HOST: &str = "stream.twitter.com";
/// Default feed path (the 1% sample)
pub const DEFAULT_PATH: &str = "/1/statuses/sample.json";
/// Default read buffer size in bytes
pub const DEFAULT_CHUNK_SIZE: usize = 102_400;

/// Where to (re)connect, and the credentials to present when doing so.
///
/// Immutable once constructed. The engine never persists any of these
/// fields; the caller supplies them fresh for every [`Supervisor::start`]
/// invocation.
///
/// [`Supervisor::start`]: crate::Supervisor::start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamEndpoint {
    pub username: String,
    pub password: String,
    pub host: String,
    pub path: String,
    pub use_https: bool,
}

impl StreamEndpoint {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        host: impl Into<String>,
        path: impl Into<String>,
        use_https: bool,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            host: host.into(),
            path: path.into(),
            use_https,
        }
    }

    /// Endpoint for the public sample feed with the given credentials
    pub fn sample_feed(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::new(username, password, DEFAULT_HOST, DEFAULT_PATH, true)
    }

    /// Full request URL for this endpoint
    pub fn url(&self) -> Result<Url> {
        let scheme = if self.use_https { "https" } else { "http" };
        Ok(Url::parse(&format!(
            "{}://{}{}",
            scheme, self.host, self.path
        ))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_feed_defaults() {
        let endpoint = StreamEndpoint::sample_feed("alice", "secret");
        assert_eq!(endpoint.host, DEFAULT_HOST);
        assert_eq!(endpoint.path, DEFAULT_PATH);
        assert!(endpoint.use_https);
        assert_eq!(
            endpoint.url().unwrap().as_str(),
            "https://stream.twitter.com/1/statuses/sample.json"
        );
    }

    #[test]
    fn test_plain_http_url() {
        let endpoint = StreamEndpoint::new("u", "p", "127.0.0.1:8080", "/feed", false);
        assert_eq!(endpoint.url().unwrap().as_str(), "http://127.0.0.1:8080/feed");
    }
}
