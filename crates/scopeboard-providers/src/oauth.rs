//! OAuth 2.0 authorization-code flow for Google APIs.
//!
//! This module implements the web-server variant of the flow: the
//! application builds an authorization URL carrying a CSRF state token,
//! the user consents on Google's page, and Google redirects back to the
//! application's callback route with an authorization code. The code is
//! then exchanged for tokens.
//!
//! The flow requests offline access (so a refresh token is issued) and
//! incremental authorization (granted scopes accumulate across consents).

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng as _;
use serde::Deserialize;
use tracing::{debug, info};

use scopeboard_core::Credential;

use crate::config::GoogleConfig;
use crate::error::{ProviderError, ProviderResult};

/// Length of the CSRF state token in bytes, before base64 encoding.
const STATE_LENGTH: usize = 16;

/// An authorization URL together with the CSRF state embedded in it.
///
/// The state must be stored server-side and compared against the state
/// presented on the callback.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// The provider authorization URL to redirect the user to.
    pub url: String,
    /// The freshly generated CSRF state token.
    pub state: String,
}

/// Query parameters Google sends to the callback route.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    /// The authorization code, present on success.
    pub code: Option<String>,
    /// The CSRF state echoed back by the provider.
    pub state: Option<String>,
    /// The error code, present when the user denied the request.
    pub error: Option<String>,
}

/// OAuth client for Google's authorization, token and revocation
/// endpoints.
#[derive(Debug)]
pub struct OAuthClient {
    config: GoogleConfig,
    http_client: reqwest::Client,
}

impl OAuthClient {
    /// Creates a new OAuth client from the given configuration.
    pub fn new(config: GoogleConfig) -> ProviderResult<Self> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::configuration(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Builds the authorization URL for the configured scopes.
    ///
    /// Returns the URL and the fresh CSRF state embedded in it. Offline
    /// access and incremental authorization are always requested.
    pub fn start_authorization(&self, redirect_uri: &str) -> AuthorizationRequest {
        let state = generate_state();
        let scope = self.config.scopes.join(" ");

        let url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}&\
            access_type=offline&include_granted_scopes=true",
            self.config.endpoints.auth_url,
            urlencoding::encode(&self.config.credentials.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scope),
            urlencoding::encode(&state),
        );

        debug!("built authorization URL");
        AuthorizationRequest { url, state }
    }

    /// Completes the flow from the callback parameters.
    ///
    /// Verifies the CSRF state before anything else; a mismatch (or a
    /// missing state on either side) fails the request and no token call
    /// is made. On success, exchanges the code for tokens and returns the
    /// resulting credential.
    pub async fn complete_authorization(
        &self,
        callback: &CallbackParams,
        expected_state: &str,
        redirect_uri: &str,
    ) -> ProviderResult<Credential> {
        match callback.state.as_deref() {
            Some(state) if state == expected_state && !expected_state.is_empty() => {}
            _ => {
                return Err(ProviderError::state_mismatch(
                    "callback state does not match the issued state",
                ));
            }
        }

        if let Some(ref error) = callback.error {
            return Err(ProviderError::token_exchange(format!(
                "authorization denied: {}",
                error
            )));
        }

        let code = callback.code.as_deref().ok_or_else(|| {
            ProviderError::token_exchange("missing authorization code in callback")
        })?;

        self.exchange_code(code, redirect_uri).await
    }

    /// Exchanges an authorization code for tokens.
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> ProviderResult<Credential> {
        let params = [
            ("client_id", self.config.credentials.client_id.as_str()),
            ("client_secret", self.config.credentials.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .http_client
            .post(&self.config.endpoints.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("token exchange request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(ProviderError::token_exchange(format!(
                "token exchange failed ({}): {}",
                status, body
            )));
        }

        let token_response: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::invalid_response(format!("invalid token response: {}", e)))?;

        // Google reports the granted scopes space-delimited; a partial
        // grant yields fewer scopes than were requested.
        let granted_scopes = match token_response.scope {
            Some(ref scope) => scope.split_whitespace().map(String::from).collect(),
            None => self.config.scopes.clone(),
        };

        info!("obtained tokens for {} scope(s)", granted_scopes.len());

        Ok(Credential {
            access_token: token_response.access_token,
            refresh_token: token_response.refresh_token,
            token_uri: self.config.endpoints.token_url.clone(),
            client_id: self.config.credentials.client_id.clone(),
            client_secret: self.config.credentials.client_secret.clone(),
            granted_scopes,
        })
    }

    /// Obtains a new access token using the credential's refresh token.
    ///
    /// The refresh runs against the credential's own token endpoint and
    /// client material. Returns the new access token; the granted scopes
    /// are unchanged by a refresh.
    pub async fn refresh(&self, credential: &Credential) -> ProviderResult<String> {
        let refresh_token = credential.refresh_token.as_deref().ok_or_else(|| {
            ProviderError::authentication("no refresh token - re-authorization required")
        })?;

        let params = [
            ("client_id", credential.client_id.as_str()),
            ("client_secret", credential.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http_client
            .post(&credential.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("token refresh request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(ProviderError::authentication(format!(
                "token refresh failed ({}): {}",
                status, body
            )));
        }

        let token_response: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::invalid_response(format!("invalid token response: {}", e)))?;

        info!("refreshed access token");
        Ok(token_response.access_token)
    }

    /// Revokes the credential's access token at the revocation endpoint.
    ///
    /// Success is solely an HTTP 200 from the provider; any other status
    /// is a revocation failure. No retry is attempted.
    pub async fn revoke(&self, credential: &Credential) -> ProviderResult<()> {
        let response = self
            .http_client
            .post(&self.config.endpoints.revoke_url)
            .query(&[("token", credential.access_token.as_str())])
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .send()
            .await
            .map_err(|e| ProviderError::network(format!("revocation request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::OK {
            info!("access token revoked");
            Ok(())
        } else {
            Err(ProviderError::revoke_failed(format!(
                "revocation endpoint returned {}",
                status
            )))
        }
    }
}

/// Generates a random CSRF state string.
fn generate_state() -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..STATE_LENGTH).map(|_| rng.random()).collect();
    URL_SAFE_NO_PAD.encode(&bytes)
}

/// Response from Google's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    expires_in: Option<i64>,
    #[serde(default)]
    #[allow(dead_code)]
    token_type: Option<String>,
}
