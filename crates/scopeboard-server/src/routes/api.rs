//! API request routes: Drive and Calendar views.

use std::future::Future;

use axum::Json;
use axum::Router;
use axum::extract::{Query, State};
use axum::response::{Html, Response};
use axum::routing::get;
use serde::{Deserialize, Serialize};
use tracing::debug;

use scopeboard_core::compute_features;
use scopeboard_providers::{
    CalendarClient, DriveClient, ProviderErrorCode, ProviderResult, select_calendar,
};

use crate::error::AppError;
use crate::session::SessionContext;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/drive", get(drive))
        .route("/calendar", get(calendar))
}

const DRIVE_DISABLED: &str = "<p>Drive feature is not enabled.</p>";
const CALENDAR_DISABLED: &str = "<p>Calendar feature is not enabled.</p>";

/// Query parameters for the calendar route.
#[derive(Debug, Deserialize)]
struct CalendarQuery {
    /// 1-based index into the calendar listing. Without it the listing
    /// itself is returned so a client can pick.
    selection: Option<usize>,
}

/// Presentation projection of a raw event item.
#[derive(Debug, PartialEq, Serialize)]
struct EventView {
    summary: Option<String>,
    start: Option<String>,
    end: Option<String>,
}

impl EventView {
    /// Projects a raw event into its summary and boundary times.
    ///
    /// Timed events carry `start.dateTime`/`end.dateTime`; all-day
    /// events carry a `date` field instead, which is used as a
    /// fallback. Values are passed through as the provider sent them.
    fn from_raw(event: &serde_json::Value) -> Self {
        let edge = |which: &str| {
            let time = &event[which];
            time["dateTime"]
                .as_str()
                .or_else(|| time["date"].as_str())
                .map(String::from)
        };

        Self {
            summary: event["summary"].as_str().map(String::from),
            start: edge("start"),
            end: edge("end"),
        }
    }
}

/// Runs a provider call, refreshing the access token once if it was
/// rejected, and re-saves the (possibly refreshed) credential to the
/// session afterwards.
async fn fetch_with_refresh<T, F, Fut>(
    state: &AppState,
    session: &mut SessionContext,
    operation: F,
) -> Result<T, AppError>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = ProviderResult<T>>,
{
    let mut credential = session.credentials()?;

    let value = match operation(credential.access_token.clone()).await {
        Err(err)
            if err.code() == ProviderErrorCode::AuthenticationFailed
                && credential.can_refresh() =>
        {
            debug!("access token rejected, refreshing");
            credential.access_token = state.oauth.refresh(&credential).await?;
            operation(credential.access_token.clone()).await?
        }
        other => other?,
    };

    session.data.credentials = Some(credential);
    session.save();
    Ok(value)
}

/// GET /drive - list Drive files.
///
/// Requires a session credential (otherwise redirects into the auth
/// flow). When the Drive scope was not granted, responds with a
/// disabled-feature notice without calling Drive at all.
async fn drive(
    State(state): State<AppState>,
    mut session: SessionContext,
) -> Result<Response, AppError> {
    let credential = session.credentials()?;
    let features = session
        .data
        .features
        .unwrap_or_else(|| compute_features(&credential.granted_scopes));

    if !features.drive {
        return Ok(session.respond(Html(DRIVE_DISABLED)));
    }

    let base = state.google.endpoints.drive_base_url.clone();
    let timeout = state.google.timeout;
    let files = fetch_with_refresh(&state, &mut session, |token| {
        let base = base.clone();
        async move { DriveClient::new(token, base, timeout)?.list_files().await }
    })
    .await?;

    Ok(session.respond(Json(files)))
}

/// GET /calendar - list calendars, or the events of one of them.
///
/// Requires a session credential and the Calendar scope, like
/// [`drive`]. Without a `selection` parameter the normalized calendar
/// listing is returned; with `selection=N` (1-based) the events of that
/// calendar are returned as `{summary, start, end}` projections.
async fn calendar(
    State(state): State<AppState>,
    mut session: SessionContext,
    Query(query): Query<CalendarQuery>,
) -> Result<Response, AppError> {
    let credential = session.credentials()?;
    let features = session
        .data
        .features
        .unwrap_or_else(|| compute_features(&credential.granted_scopes));

    if !features.calendar {
        return Ok(session.respond(Html(CALENDAR_DISABLED)));
    }

    let base = state.google.endpoints.calendar_base_url.clone();
    let timeout = state.google.timeout;

    let calendars = fetch_with_refresh(&state, &mut session, |token| {
        let base = base.clone();
        async move { CalendarClient::new(token, base, timeout)?.list_calendars().await }
    })
    .await?;

    let Some(selection) = query.selection else {
        return Ok(session.respond(Json(calendars)));
    };

    let calendar_id = select_calendar(&calendars, selection)?.to_string();

    let events = fetch_with_refresh(&state, &mut session, |token| {
        let base = base.clone();
        let calendar_id = calendar_id.clone();
        async move {
            CalendarClient::new(token, base, timeout)?
                .list_events(&calendar_id)
                .await
        }
    })
    .await?;

    let views: Vec<EventView> = events.iter().map(EventView::from_raw).collect();
    Ok(session.respond(Json(views)))
}
