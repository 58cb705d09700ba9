//! HTTP route layer.

pub mod api;
pub mod auth;

use axum::Router;
use axum::response::Html;
use axum::routing::get;

use crate::state::AppState;

/// Static index of available actions, appended to most text responses.
pub(crate) const INDEX_TABLE: &str = concat!(
    "<table>",
    "<tr><td><a href=\"/calendar\">Test an API request</a></td>",
    "<td>Submit an API request and see a formatted JSON response. ",
    "Go through the authorization flow if there are no stored ",
    "credentials for the user.</td></tr>",
    "<tr><td><a href=\"/authorize\">Test the auth flow directly</a></td>",
    "<td>Go directly to the authorization flow. If there are stored ",
    "credentials, you still might not be prompted to reauthorize ",
    "the application.</td></tr>",
    "<tr><td><a href=\"/revoke\">Revoke current credentials</a></td>",
    "<td>Revoke the access token associated with the current user ",
    "session. After revoking credentials, if you go to the test ",
    "page, you should see an <code>invalid_grant</code> error.</td></tr>",
    "<tr><td><a href=\"/clear\">Clear session credentials</a></td>",
    "<td>Clear the access token currently stored in the user session. ",
    "After clearing the token, if you test the API request again, ",
    "you should go back to the auth flow.</td></tr>",
    "</table>",
);

/// Builds the application router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .merge(auth::router())
        .merge(api::router())
}

/// GET / - static action index.
async fn index() -> Html<&'static str> {
    Html(INDEX_TABLE)
}
