//! HTTP-facing error handling.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use serde_json::json;
use thiserror::Error;

use scopeboard_providers::{ProviderError, ProviderErrorCode};

/// Errors a request handler can produce.
#[derive(Debug, Error)]
pub enum AppError {
    /// No credential in the session; the client is sent through the
    /// authorization flow.
    #[error("not authenticated")]
    NotAuthenticated,

    /// A provider operation failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotAuthenticated => Redirect::to("/authorize").into_response(),
            AppError::Provider(err) => {
                let status = match err.code() {
                    ProviderErrorCode::StateMismatch | ProviderErrorCode::OutOfRange => {
                        StatusCode::BAD_REQUEST
                    }
                    ProviderErrorCode::AuthenticationFailed => StatusCode::UNAUTHORIZED,
                    ProviderErrorCode::TokenExchange
                    | ProviderErrorCode::RevokeFailed
                    | ProviderErrorCode::Api
                    | ProviderErrorCode::Network
                    | ProviderErrorCode::InvalidResponse => StatusCode::BAD_GATEWAY,
                    ProviderErrorCode::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
                };

                if status.is_server_error() {
                    tracing::error!(code = err.code().as_str(), "provider error: {}", err);
                } else {
                    tracing::warn!(code = err.code().as_str(), "request failed: {}", err);
                }

                let body = Json(json!({
                    "error": err.message(),
                    "code": err.code().as_str(),
                }));
                (status, body).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_authenticated_redirects_to_authorize() {
        let response = AppError::NotAuthenticated.into_response();
        assert!(response.status().is_redirection());
        assert_eq!(response.headers()["location"], "/authorize");
    }

    #[test]
    fn state_mismatch_is_a_bad_request() {
        let err = AppError::from(ProviderError::state_mismatch("nope"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn out_of_range_is_a_bad_request() {
        let err = AppError::from(ProviderError::out_of_range("selection 9"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn upstream_failures_are_bad_gateway() {
        let exchange = AppError::from(ProviderError::token_exchange("invalid_grant"));
        assert_eq!(exchange.into_response().status(), StatusCode::BAD_GATEWAY);

        let api = AppError::from(ProviderError::api("API error (500)"));
        assert_eq!(api.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
