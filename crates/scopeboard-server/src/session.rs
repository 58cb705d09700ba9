//! Server-side session handling.
//!
//! Sessions are keyed by a random id carried in an HMAC-signed cookie;
//! the data itself never leaves the server. The store is deliberately a
//! trait object so the in-memory backend used here (and in tests) can be
//! swapped for an external one without touching the handlers.
//!
//! Session data is ephemeral by design: it holds OAuth credential
//! material, and nothing in this module ever writes to durable storage.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, RwLock};

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use rand::Rng as _;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use scopeboard_core::{Credential, FeatureFlags};

use crate::error::AppError;
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "scopeboard_session";

/// Length of a session id in bytes, before base64 encoding.
const SESSION_ID_LENGTH: usize = 32;

/// The per-session values the application keeps between requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    /// CSRF state issued by the last `/authorize` call.
    pub state: Option<String>,
    /// The OAuth credential, present once the callback completed.
    pub credentials: Option<Credential>,
    /// Feature flags computed from the granted scopes at callback time.
    pub features: Option<FeatureFlags>,
}

/// A pluggable key-value backend for session data.
pub trait SessionStore: Send + Sync {
    /// Returns the data for a session id, if any.
    fn get(&self, id: &str) -> Option<SessionData>;
    /// Stores the data for a session id.
    fn put(&self, id: &str, data: SessionData);
    /// Removes a session. Removing an absent session is not an error.
    fn remove(&self, id: &str);
}

/// In-memory session store. Sessions vanish on restart.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, SessionData>>,
}

impl SessionStore for MemorySessionStore {
    fn get(&self, id: &str) -> Option<SessionData> {
        self.sessions.read().unwrap().get(id).cloned()
    }

    fn put(&self, id: &str, data: SessionData) {
        self.sessions.write().unwrap().insert(id.to_string(), data);
    }

    fn remove(&self, id: &str) {
        self.sessions.write().unwrap().remove(id);
    }
}

/// Generates a fresh random session id.
fn new_session_id() -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..SESSION_ID_LENGTH).map(|_| rng.random()).collect();
    URL_SAFE_NO_PAD.encode(&bytes)
}

/// Signs a session id with the application secret key.
fn sign(secret_key: &str, id: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret_key.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(id.as_bytes());
    URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
}

/// Encodes a session id into a signed cookie value.
fn encode_cookie(secret_key: &str, id: &str) -> String {
    format!("{}.{}", id, sign(secret_key, id))
}

/// Decodes a signed cookie value back into a session id.
///
/// Returns `None` when the value is malformed or the signature does not
/// verify against the secret key.
fn decode_cookie(secret_key: &str, value: &str) -> Option<String> {
    let (id, signature) = value.split_once('.')?;
    let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;

    let mut mac = Hmac::<Sha256>::new_from_slice(secret_key.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(id.as_bytes());
    mac.verify_slice(&signature).ok()?;

    Some(id.to_string())
}

/// Extracts the session cookie value from a Cookie header.
fn cookie_value(parts: &Parts) -> Option<&str> {
    let header = parts.headers.get(header::COOKIE)?.to_str().ok()?;
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then_some(value)
    })
}

/// The session context handed to each request handler.
///
/// Mutate [`SessionContext::data`] and call [`SessionContext::save`] to
/// persist; wrap the handler's response in [`SessionContext::respond`] so
/// a freshly created session gets its cookie.
pub struct SessionContext {
    id: String,
    is_new: bool,
    secret_key: String,
    store: Arc<dyn SessionStore>,
    pub data: SessionData,
}

impl SessionContext {
    /// Returns the session credential.
    ///
    /// # Errors
    ///
    /// Fails with [`AppError::NotAuthenticated`] when no credential is
    /// stored; API routes recover by redirecting to `/authorize`.
    pub fn credentials(&self) -> Result<Credential, AppError> {
        self.data
            .credentials
            .clone()
            .ok_or(AppError::NotAuthenticated)
    }

    /// Persists the current session data to the store.
    pub fn save(&self) {
        self.store.put(&self.id, self.data.clone());
    }

    /// Wraps a handler response, attaching the session cookie when this
    /// request created the session.
    pub fn respond(&self, inner: impl IntoResponse) -> Response {
        let mut response = inner.into_response();
        if self.is_new {
            let cookie = format!(
                "{}={}; Path=/; HttpOnly; SameSite=Lax",
                SESSION_COOKIE,
                encode_cookie(&self.secret_key, &self.id)
            );
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }
        response
    }
}

impl FromRequestParts<AppState> for SessionContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let secret_key = state.config.secret_key.clone();
        let store = state.sessions.clone();

        if let Some(id) = cookie_value(parts).and_then(|v| decode_cookie(&secret_key, v)) {
            let data = store.get(&id).unwrap_or_default();
            return Ok(Self {
                id,
                is_new: false,
                secret_key,
                store,
                data,
            });
        }

        Ok(Self {
            id: new_session_id(),
            is_new: true,
            secret_key,
            store,
            data: SessionData::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_roundtrip() {
        let store = MemorySessionStore::default();
        assert!(store.get("missing").is_none());

        let data = SessionData {
            state: Some("csrf".to_string()),
            ..Default::default()
        };
        store.put("sid", data.clone());
        assert_eq!(store.get("sid"), Some(data));

        store.remove("sid");
        assert!(store.get("sid").is_none());
        // removing twice is fine
        store.remove("sid");
    }

    #[test]
    fn session_ids_are_random() {
        assert_ne!(new_session_id(), new_session_id());
        // 32 bytes base64url without padding is 43 characters
        assert_eq!(new_session_id().len(), 43);
    }

    #[test]
    fn cookie_roundtrip() {
        let id = new_session_id();
        let cookie = encode_cookie("secret", &id);
        assert_eq!(decode_cookie("secret", &cookie), Some(id));
    }

    #[test]
    fn tampered_cookie_is_rejected() {
        let cookie = encode_cookie("secret", "session-id");
        let tampered = cookie.replace("session-id", "other-id");
        assert!(decode_cookie("secret", &tampered).is_none());
    }

    #[test]
    fn wrong_key_is_rejected() {
        let cookie = encode_cookie("secret", "session-id");
        assert!(decode_cookie("different-secret", &cookie).is_none());
    }

    #[test]
    fn malformed_cookie_is_rejected() {
        assert!(decode_cookie("secret", "no-separator").is_none());
        assert!(decode_cookie("secret", "id.not!base64").is_none());
        assert!(decode_cookie("secret", "").is_none());
    }
}
