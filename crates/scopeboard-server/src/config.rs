//! Server configuration.
//!
//! Everything comes from the environment (a `.env` file is honored):
//!
//! - `SCOPEBOARD_SECRET_KEY` - key for signing session cookies (required)
//! - `SCOPEBOARD_LISTEN` - listen address, default `127.0.0.1:5000`
//! - `SCOPEBOARD_EXTERNAL_URL` - public base URL, default `http://<listen>`
//! - `SCOPEBOARD_CLIENT_SECRET_FILE` - Google client secret JSON path,
//!   default `client_secret.json`
//! - `SCOPEBOARD_DEBUG` - `1`/`true` for verbose logging

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Errors that can occur while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing required environment variable {name}")]
    MissingVar { name: &'static str },

    /// An environment variable could not be parsed.
    #[error("invalid value for {name}: {message}")]
    InvalidVar { name: &'static str, message: String },
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    pub listen: SocketAddr,

    /// Public base URL used to build the OAuth redirect URI.
    pub external_url: Url,

    /// Key for signing session cookies.
    pub secret_key: String,

    /// Whether debug mode is enabled.
    pub debug: bool,

    /// Path to the Google client secret JSON file.
    pub client_secret_path: PathBuf,

    /// Timeout applied to every outbound provider call.
    pub request_timeout: Duration,
}

impl ServerConfig {
    /// Default listen address.
    pub const DEFAULT_LISTEN: &'static str = "127.0.0.1:5000";

    /// Default per-call timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration with the given secret key and defaults
    /// for everything else.
    pub fn new(secret_key: impl Into<String>) -> Self {
        let listen: SocketAddr = Self::DEFAULT_LISTEN
            .parse()
            .expect("default listen address is valid");
        Self {
            listen,
            external_url: Url::parse(&format!("http://{}", listen))
                .expect("default external URL is valid"),
            secret_key: secret_key.into(),
            debug: false,
            client_secret_path: PathBuf::from("client_secret.json"),
            request_timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Loads the configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret_key = std::env::var("SCOPEBOARD_SECRET_KEY").map_err(|_| {
            ConfigError::MissingVar {
                name: "SCOPEBOARD_SECRET_KEY",
            }
        })?;

        let mut config = Self::new(secret_key);

        if let Ok(listen) = std::env::var("SCOPEBOARD_LISTEN") {
            config.listen = listen.parse().map_err(|e| ConfigError::InvalidVar {
                name: "SCOPEBOARD_LISTEN",
                message: format!("{}", e),
            })?;
            config.external_url = Url::parse(&format!("http://{}", config.listen))
                .expect("socket address forms a valid URL");
        }

        if let Ok(external) = std::env::var("SCOPEBOARD_EXTERNAL_URL") {
            config.external_url = Url::parse(&external).map_err(|e| ConfigError::InvalidVar {
                name: "SCOPEBOARD_EXTERNAL_URL",
                message: format!("{}", e),
            })?;
        }

        if let Ok(path) = std::env::var("SCOPEBOARD_CLIENT_SECRET_FILE") {
            config.client_secret_path = PathBuf::from(path);
        }

        config.debug = matches!(
            std::env::var("SCOPEBOARD_DEBUG").as_deref(),
            Ok("1") | Ok("true")
        );

        Ok(config)
    }

    /// Builder: set the listen address.
    pub fn with_listen(mut self, listen: SocketAddr) -> Self {
        self.listen = listen;
        self
    }

    /// Builder: set the public base URL.
    pub fn with_external_url(mut self, external_url: Url) -> Self {
        self.external_url = external_url;
        self
    }

    /// Builder: set the client secret file path.
    pub fn with_client_secret_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.client_secret_path = path.into();
        self
    }

    /// Builder: set debug mode.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Builder: set the provider request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// The absolute redirect URI for the OAuth callback route.
    ///
    /// Must exactly match one of the redirect URIs registered for the
    /// OAuth client in the Google Cloud Console.
    pub fn redirect_uri(&self) -> String {
        let mut url = self.external_url.clone();
        url.set_path("/oauth2callback");
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::new("test-key");
        assert_eq!(config.listen.to_string(), "127.0.0.1:5000");
        assert!(!config.debug);
        assert_eq!(
            config.client_secret_path,
            PathBuf::from("client_secret.json")
        );
        assert_eq!(
            config.request_timeout,
            Duration::from_secs(ServerConfig::DEFAULT_TIMEOUT_SECS)
        );
    }

    #[test]
    fn redirect_uri_follows_external_url() {
        let config = ServerConfig::new("test-key");
        assert_eq!(config.redirect_uri(), "http://127.0.0.1:5000/oauth2callback");

        let config = config.with_external_url(Url::parse("https://app.example.com").unwrap());
        assert_eq!(
            config.redirect_uri(),
            "https://app.example.com/oauth2callback"
        );
    }

    #[test]
    fn builder_methods() {
        let listen: SocketAddr = "0.0.0.0:8080".parse().unwrap();
        let config = ServerConfig::new("test-key")
            .with_listen(listen)
            .with_debug(true)
            .with_client_secret_path("/etc/scopeboard/client_secret.json")
            .with_request_timeout(Duration::from_secs(5));

        assert_eq!(config.listen, listen);
        assert!(config.debug);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }
}
