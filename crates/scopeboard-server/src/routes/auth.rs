//! Authorization flow routes: authorize, callback, revoke, clear.

use axum::Router;
use axum::extract::{Query, State};
use axum::response::{Html, Redirect, Response};
use axum::routing::get;
use tracing::{info, warn};

use scopeboard_core::compute_features;
use scopeboard_providers::{CallbackParams, ProviderErrorCode};

use crate::error::AppError;
use crate::routes::INDEX_TABLE;
use crate::session::SessionContext;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/authorize", get(authorize))
        .route("/oauth2callback", get(oauth2callback))
        .route("/revoke", get(revoke))
        .route("/clear", get(clear))
}

/// GET /authorize - start the OAuth flow.
///
/// Issues a fresh CSRF state, remembers it in the session and redirects
/// the browser to the provider's consent screen.
async fn authorize(
    State(state): State<AppState>,
    mut session: SessionContext,
) -> Result<Response, AppError> {
    let request = state.oauth.start_authorization(&state.config.redirect_uri());

    session.data.state = Some(request.state);
    session.save();

    Ok(session.respond(Redirect::to(&request.url)))
}

/// GET /oauth2callback - complete the OAuth flow.
///
/// The callback state must match the one stored at `/authorize` time;
/// a mismatch fails the request and nothing is stored. On success the
/// credential and the features derived from the granted scopes land in
/// the session.
async fn oauth2callback(
    State(state): State<AppState>,
    mut session: SessionContext,
    Query(params): Query<CallbackParams>,
) -> Result<Response, AppError> {
    let expected_state = session.data.state.clone().unwrap_or_default();

    let credential = state
        .oauth
        .complete_authorization(&params, &expected_state, &state.config.redirect_uri())
        .await?;

    let features = compute_features(&credential.granted_scopes);
    info!(
        drive = features.drive,
        calendar = features.calendar,
        "authorization complete"
    );

    session.data.credentials = Some(credential);
    session.data.features = Some(features);
    session.save();

    Ok(session.respond(Redirect::to("/")))
}

/// GET /revoke - invalidate the access token at the provider.
///
/// Only the provider-side token is revoked; the session credential is
/// left in place until `/clear` removes it.
async fn revoke(
    State(state): State<AppState>,
    session: SessionContext,
) -> Result<Response, AppError> {
    let Some(credential) = session.data.credentials.clone() else {
        return Ok(session.respond(Html(format!(
            "You need to <a href=\"/authorize\">authorize</a> before \
             testing the code to revoke credentials.{}",
            INDEX_TABLE
        ))));
    };

    match state.oauth.revoke(&credential).await {
        Ok(()) => Ok(session.respond(Html(format!(
            "Credentials successfully revoked.{}",
            INDEX_TABLE
        )))),
        Err(err) if err.code() == ProviderErrorCode::RevokeFailed => {
            warn!("revocation rejected: {}", err);
            Ok(session.respond(Html(format!("An error occurred.{}", INDEX_TABLE))))
        }
        Err(err) => Err(err.into()),
    }
}

/// GET /clear - drop the session credential.
///
/// Clearing an absent credential is not an error.
async fn clear(mut session: SessionContext) -> Result<Response, AppError> {
    session.data.credentials = None;
    session.save();

    Ok(session.respond(Html(format!(
        "Credentials have been cleared.<br><br>{}",
        INDEX_TABLE
    ))))
}
