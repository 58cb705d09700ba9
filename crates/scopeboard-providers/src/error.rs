//! Error types for Google API operations.

use std::fmt;
use thiserror::Error;

/// The category of a provider error.
///
/// High-level classification used by the HTTP layer to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// The OAuth callback state did not match the one we issued.
    StateMismatch,
    /// The authorization server rejected the code exchange.
    TokenExchange,
    /// The revocation endpoint returned a non-200 status.
    RevokeFailed,
    /// The access token was rejected (expired, invalid, or revoked).
    AuthenticationFailed,
    /// The API returned a non-success status.
    Api,
    /// A calendar selection index was outside the listed range.
    OutOfRange,
    /// Network error - connection failed, timeout, DNS resolution.
    Network,
    /// The server response could not be parsed.
    InvalidResponse,
    /// Missing or invalid configuration.
    Configuration,
}

impl ProviderErrorCode {
    /// Returns a stable snake_case name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StateMismatch => "state_mismatch",
            Self::TokenExchange => "token_exchange",
            Self::RevokeFailed => "revoke_failed",
            Self::AuthenticationFailed => "authentication_failed",
            Self::Api => "api_error",
            Self::OutOfRange => "out_of_range",
            Self::Network => "network_error",
            Self::InvalidResponse => "invalid_response",
            Self::Configuration => "configuration_error",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while talking to Google.
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    /// Creates a new provider error with the given code and message.
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a state mismatch error.
    pub fn state_mismatch(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::StateMismatch, message)
    }

    /// Creates a token exchange error.
    pub fn token_exchange(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::TokenExchange, message)
    }

    /// Creates a revocation failure error.
    pub fn revoke_failed(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::RevokeFailed, message)
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::AuthenticationFailed, message)
    }

    /// Creates an API error.
    pub fn api(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Api, message)
    }

    /// Creates an out of range error.
    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::OutOfRange, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Network, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidResponse, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::Configuration, message)
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
