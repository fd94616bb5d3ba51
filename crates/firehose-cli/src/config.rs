//! Configuration file handling for the firehose CLI

use anyhow::{bail, Context, Result};
use firehose_stream::{StreamEndpoint, DEFAULT_HOST, DEFAULT_PATH};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file contents (`config.toml`)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Feed username
    pub username: Option<String>,
    /// Feed password
    pub password: Option<String>,
    /// Feed host
    pub host: Option<String>,
    /// Request path on the feed host
    pub path: Option<String>,
    /// Connect over HTTPS (default true)
    pub use_https: Option<bool>,
    /// Read buffer size in bytes
    pub chunk: Option<usize>,
}

/// Values supplied on the command line or via environment, which win over
/// the config file
#[derive(Debug, Clone, Default)]
pub struct CredentialOverrides {
    pub username: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub path: Option<String>,
    pub no_https: bool,
}

impl Config {
    /// Load configuration from the default config file, if it exists
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("firehose");

        Ok(config_dir.join("config.toml"))
    }

    /// Merge command-line overrides over config file values and produce a
    /// connectable endpoint.
    ///
    /// Credentials have no default: missing ones are an error telling the
    /// operator to finish setup.
    pub fn resolve_endpoint(&self, overrides: CredentialOverrides) -> Result<StreamEndpoint> {
        let Some(username) = overrides.username.or_else(|| self.username.clone()) else {
            bail!("No feed username supplied; pass --username or complete the app setup");
        };
        let Some(password) = overrides.password.or_else(|| self.password.clone()) else {
            bail!("No feed password supplied; pass --password or complete the app setup");
        };

        let host = overrides
            .host
            .or_else(|| self.host.clone())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let path = overrides
            .path
            .or_else(|| self.path.clone())
            .unwrap_or_else(|| DEFAULT_PATH.to_string());
        let use_https = if overrides.no_https {
            false
        } else {
            self.use_https.unwrap_or(true)
        };

        Ok(StreamEndpoint::new(username, password, host, path, use_https))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_config() -> Config {
        toml::from_str(
            r#"
            username = "file-user"
            password = "file-pass"
            host = "feed.example.com"
            chunk = 4096
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_overrides_win_over_config_file() {
        let config = file_config();
        let endpoint = config
            .resolve_endpoint(CredentialOverrides {
                username: Some("flag-user".into()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(endpoint.username, "flag-user");
        assert_eq!(endpoint.password, "file-pass");
        assert_eq!(endpoint.host, "feed.example.com");
        assert_eq!(endpoint.path, DEFAULT_PATH);
        assert!(endpoint.use_https);
    }

    #[test]
    fn test_no_https_flag_forces_plain_http() {
        let config = file_config();
        let endpoint = config
            .resolve_endpoint(CredentialOverrides {
                no_https: true,
                ..Default::default()
            })
            .unwrap();
        assert!(!endpoint.use_https);
    }

    #[test]
    fn test_missing_credentials_are_an_error() {
        let config = Config::default();
        let err = config
            .resolve_endpoint(CredentialOverrides::default())
            .unwrap_err();
        assert!(err.to_string().contains("username"));
    }
}
