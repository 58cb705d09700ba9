//! Google API glue for scopeboard.
//!
//! This crate wraps the three Google surfaces the application talks to:
//!
//! - [`OAuthClient`] - the OAuth 2.0 web-server flow: authorization URL
//!   with CSRF state, code exchange, token refresh, token revocation
//! - [`CalendarClient`] - paginated calendar-list and event listings
//! - [`DriveClient`] - file listing
//!
//! All calls are sequential and blocking from the caller's perspective;
//! failures propagate as [`ProviderError`] and are never retried.

pub mod calendar;
pub mod config;
pub mod drive;
pub mod error;
pub mod oauth;

pub use calendar::{CalendarClient, CalendarEntry, select_calendar};
pub use config::{GoogleConfig, GoogleEndpoints, OAuthCredentials};
pub use drive::DriveClient;
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use oauth::{AuthorizationRequest, CallbackParams, OAuthClient};
