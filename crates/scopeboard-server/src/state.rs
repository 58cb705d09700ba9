//! Shared application state.

use std::sync::Arc;

use scopeboard_providers::{GoogleConfig, OAuthClient, OAuthCredentials, ProviderResult};

use crate::config::ServerConfig;
use crate::session::{MemorySessionStore, SessionStore};

/// State shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Session backend.
    pub sessions: Arc<dyn SessionStore>,
    /// OAuth client for the authorization, token and revocation endpoints.
    pub oauth: Arc<OAuthClient>,
    /// Google API configuration (scopes, timeouts, endpoint URLs).
    pub google: Arc<GoogleConfig>,
}

impl AppState {
    /// Creates the application state, loading the Google client
    /// credentials from the configured client secret file.
    pub fn new(config: ServerConfig) -> ProviderResult<Self> {
        let credentials = OAuthCredentials::from_file(&config.client_secret_path)?;
        let google = GoogleConfig::new(credentials).with_timeout(config.request_timeout);
        Self::with_google(config, google)
    }

    /// Creates the application state from an explicit Google
    /// configuration. Used by tests to point at stub endpoints.
    pub fn with_google(config: ServerConfig, google: GoogleConfig) -> ProviderResult<Self> {
        let oauth = OAuthClient::new(google.clone())?;
        Ok(Self {
            config: Arc::new(config),
            sessions: Arc::new(MemorySessionStore::default()),
            oauth: Arc::new(oauth),
            google: Arc::new(google),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn loads_client_secret_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"web": {{"client_id": "test.apps.googleusercontent.com",
                 "client_secret": "secret"}}}}"#
        )
        .unwrap();

        let config = ServerConfig::new("test-key").with_client_secret_path(file.path());
        assert!(AppState::new(config).is_ok());
    }

    #[test]
    fn missing_client_secret_file_is_an_error() {
        let config =
            ServerConfig::new("test-key").with_client_secret_path("/nonexistent/client_secret.json");
        assert!(AppState::new(config).is_err());
    }
}
