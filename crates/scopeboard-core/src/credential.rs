//! OAuth credential material held in a user session.

use serde::{Deserialize, Serialize};

/// A set of OAuth tokens together with the client material needed to
/// refresh them.
///
/// This is the exact shape that round-trips through the session store:
/// six named fields, nothing else. Credentials live only for the duration
/// of a browser session and are never written to durable storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// The access token for API requests.
    pub access_token: String,

    /// The refresh token, when offline access was granted.
    pub refresh_token: Option<String>,

    /// The token endpoint this credential was issued by (and refreshes
    /// against).
    pub token_uri: String,

    /// The OAuth 2.0 client ID.
    pub client_id: String,

    /// The OAuth 2.0 client secret.
    pub client_secret: String,

    /// The scopes the user actually granted.
    pub granted_scopes: Vec<String>,
}

impl Credential {
    /// Returns true if the given scope was granted.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.granted_scopes.iter().any(|s| s == scope)
    }

    /// Returns true if this credential can be refreshed without user
    /// interaction.
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Credential {
        Credential {
            access_token: "ya29.access".to_string(),
            refresh_token: Some("1//refresh".to_string()),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
            client_id: "client.apps.googleusercontent.com".to_string(),
            client_secret: "secret".to_string(),
            granted_scopes: vec!["https://www.googleapis.com/auth/calendar.readonly".to_string()],
        }
    }

    #[test]
    fn round_trips_losslessly() {
        let credential = sample();
        let json = serde_json::to_string(&credential).unwrap();
        let back: Credential = serde_json::from_str(&json).unwrap();
        assert_eq!(back, credential);
    }

    #[test]
    fn serializes_exactly_six_fields() {
        let value = serde_json::to_value(sample()).unwrap();
        let object = value.as_object().unwrap();
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "access_token",
                "client_id",
                "client_secret",
                "granted_scopes",
                "refresh_token",
                "token_uri",
            ]
        );
    }

    #[test]
    fn missing_refresh_token_round_trips() {
        let mut credential = sample();
        credential.refresh_token = None;
        let json = serde_json::to_string(&credential).unwrap();
        let back: Credential = serde_json::from_str(&json).unwrap();
        assert_eq!(back, credential);
        assert!(!back.can_refresh());
    }

    #[test]
    fn scope_membership() {
        let credential = sample();
        assert!(credential.has_scope("https://www.googleapis.com/auth/calendar.readonly"));
        assert!(!credential.has_scope("https://www.googleapis.com/auth/drive.metadata.readonly"));
    }
}
