//! Google API configuration.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use scopeboard_core::{CALENDAR_READONLY_SCOPE, DRIVE_READONLY_SCOPE};

use crate::error::{ProviderError, ProviderResult};

/// OAuth 2.0 client credentials for Google API access.
///
/// Applications must be registered in the Google Cloud Console; the
/// client id and secret come from the credentials file downloaded there.
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    /// The OAuth 2.0 client ID.
    pub client_id: String,
    /// The OAuth 2.0 client secret.
    pub client_secret: String,
}

/// Structure of Google's OAuth credentials JSON file.
///
/// Supports the Google Cloud Console format with a "web" or "installed"
/// section, and the flat format with client_id/client_secret at the root.
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    web: Option<NestedCredentials>,
    installed: Option<NestedCredentials>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NestedCredentials {
    client_id: String,
    client_secret: String,
}

impl OAuthCredentials {
    /// Creates new OAuth client credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Loads client credentials from a Google Cloud Console JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> ProviderResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ProviderError::configuration(format!(
                "failed to read client secret file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    /// Parses client credentials from a Google credentials JSON string.
    pub fn from_json(json: &str) -> ProviderResult<Self> {
        let file: CredentialsFile = serde_json::from_str(json).map_err(|e| {
            ProviderError::configuration(format!("failed to parse client secret JSON: {}", e))
        })?;

        if let Some(creds) = file.web.or(file.installed) {
            return Ok(Self::new(creds.client_id, creds.client_secret));
        }

        if let (Some(client_id), Some(client_secret)) = (file.client_id, file.client_secret) {
            return Ok(Self::new(client_id, client_secret));
        }

        Err(ProviderError::configuration(
            "client secret file must contain a 'web'/'installed' section \
             or 'client_id'/'client_secret' at the root",
        ))
    }

    /// Validates that the credentials appear correctly formatted.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.client_id.is_empty() {
            return Err("client_id is required");
        }
        if !self.client_id.ends_with(".apps.googleusercontent.com") {
            return Err("client_id should end with .apps.googleusercontent.com");
        }
        if self.client_secret.is_empty() {
            return Err("client_secret is required");
        }
        Ok(())
    }
}

/// The Google endpoints used by the OAuth flow and API clients.
///
/// Defaults to the real Google URLs; tests point these at a stub server.
#[derive(Debug, Clone)]
pub struct GoogleEndpoints {
    /// Authorization endpoint (consent screen).
    pub auth_url: String,
    /// Token endpoint (code exchange and refresh).
    pub token_url: String,
    /// Token revocation endpoint.
    pub revoke_url: String,
    /// Base URL for Calendar API v3.
    pub calendar_base_url: String,
    /// Base URL for Drive API v3.
    pub drive_base_url: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            revoke_url: "https://oauth2.googleapis.com/revoke".to_string(),
            calendar_base_url: "https://www.googleapis.com/calendar/v3".to_string(),
            drive_base_url: "https://www.googleapis.com/drive/v3".to_string(),
        }
    }
}

impl GoogleEndpoints {
    /// Points every endpoint at the given base URL.
    ///
    /// Intended for tests running against a local stub server.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            auth_url: format!("{}/o/oauth2/v2/auth", base),
            token_url: format!("{}/token", base),
            revoke_url: format!("{}/revoke", base),
            calendar_base_url: format!("{}/calendar/v3", base),
            drive_base_url: format!("{}/drive/v3", base),
        }
    }
}

/// Configuration shared by the OAuth flow and the API clients.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// OAuth client credentials.
    pub credentials: OAuthCredentials,
    /// The scopes to request on the consent screen.
    pub scopes: Vec<String>,
    /// Request timeout applied to every HTTP call.
    pub timeout: Duration,
    /// Endpoint URLs.
    pub endpoints: GoogleEndpoints,
}

impl GoogleConfig {
    /// Default per-call timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration requesting the Drive and Calendar
    /// read-only scopes.
    pub fn new(credentials: OAuthCredentials) -> Self {
        Self {
            credentials,
            scopes: vec![
                DRIVE_READONLY_SCOPE.to_string(),
                CALENDAR_READONLY_SCOPE.to_string(),
            ],
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            endpoints: GoogleEndpoints::default(),
        }
    }

    /// Sets the scopes to request.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the endpoint URLs.
    pub fn with_endpoints(mut self, endpoints: GoogleEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ProviderResult<()> {
        self.credentials
            .validate()
            .map_err(|e| ProviderError::configuration(format!("invalid credentials: {}", e)))?;

        if self.scopes.is_empty() {
            return Err(ProviderError::configuration(
                "at least one OAuth scope is required",
            ));
        }

        Ok(())
    }
}
