//! Web application: OAuth routes and Drive/Calendar API views.
//!
//! The server exposes a handful of GET routes around Google's OAuth 2.0
//! web-server flow:
//!
//! - `/` - static action index
//! - `/authorize` / `/oauth2callback` - the authorization flow
//! - `/drive` / `/calendar` - read-only API views, gated by the scopes
//!   the user actually granted
//! - `/revoke` / `/clear` - provider-side revocation and session cleanup
//!
//! State lives in a per-browser session behind a signed cookie; nothing
//! is persisted across restarts.

pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use config::{ConfigError, ServerConfig};
pub use error::AppError;
pub use session::{MemorySessionStore, SESSION_COOKIE, SessionContext, SessionData, SessionStore};
pub use state::AppState;

/// Builds the application with its middleware stack.
pub fn app(state: AppState) -> Router {
    routes::router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
