//! Google Calendar API client.
//!
//! Calendar-list and event listings are paginated: the client follows the
//! opaque `nextPageToken` cursor until the provider stops returning one,
//! accumulating items in page order. Failures propagate immediately; no
//! page is ever retried.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};

/// A normalized calendar-list entry.
///
/// Projection of a provider calendar-list item: the user's renamed
/// `summaryOverride` wins over the calendar's own `summary`, and absent
/// optional fields take empty/false defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub id: String,
    pub summary: String,
    pub description: String,
    pub deleted: bool,
    pub hidden: bool,
    pub selected: bool,
    pub timezone: String,
}

/// Raw calendar-list item as returned by the API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCalendarEntry {
    id: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    summary_override: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    hidden: bool,
    #[serde(default)]
    selected: bool,
    #[serde(default)]
    time_zone: String,
}

impl From<RawCalendarEntry> for CalendarEntry {
    fn from(raw: RawCalendarEntry) -> Self {
        Self {
            id: raw.id,
            summary: raw.summary_override.unwrap_or(raw.summary),
            description: raw.description,
            deleted: raw.deleted,
            hidden: raw.hidden,
            selected: raw.selected,
            timezone: raw.time_zone,
        }
    }
}

/// One page of the calendar list.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarListPage {
    #[serde(default)]
    items: Vec<RawCalendarEntry>,
    next_page_token: Option<String>,
}

/// One page of an event listing. Items are passed through verbatim.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListPage {
    #[serde(default)]
    items: Vec<serde_json::Value>,
    next_page_token: Option<String>,
}

/// Picks a calendar from a listing by 1-based index.
///
/// The index arrives as an explicit request parameter; anything outside
/// `[1, len]` is rejected.
pub fn select_calendar(calendars: &[CalendarEntry], selection: usize) -> ProviderResult<&str> {
    if selection == 0 || selection > calendars.len() {
        return Err(ProviderError::out_of_range(format!(
            "selection {} is not within 1..={}",
            selection,
            calendars.len()
        )));
    }
    Ok(calendars[selection - 1].id.as_str())
}

/// Google Calendar API client bound to one access token.
#[derive(Debug)]
pub struct CalendarClient {
    http_client: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl CalendarClient {
    /// Creates a new Calendar client.
    pub fn new(
        access_token: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::configuration(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            access_token: access_token.into(),
            base_url: base_url.into(),
        })
    }

    /// Lists the user's calendars, following pagination to the end.
    pub async fn list_calendars(&self) -> ProviderResult<Vec<CalendarEntry>> {
        let url = format!("{}/users/me/calendarList", self.base_url);
        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page: CalendarListPage = self.get_page(&url, page_token.as_deref()).await?;
            calendars.extend(page.items.into_iter().map(CalendarEntry::from));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!("fetched {} calendars", calendars.len());
        Ok(calendars)
    }

    /// Lists the events of a calendar, following pagination to the end.
    ///
    /// Items are returned in provider order, verbatim: no filtering,
    /// ordering, or date parsing is applied here.
    pub async fn list_events(&self, calendar_id: &str) -> ProviderResult<Vec<serde_json::Value>> {
        let url = format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id)
        );
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page: EventListPage = self.get_page(&url, page_token.as_deref()).await?;
            events.extend(page.items);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!("fetched {} events from calendar {}", events.len(), calendar_id);
        Ok(events)
    }

    /// Fetches a single page from a listing endpoint.
    async fn get_page<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        page_token: Option<&str>,
    ) -> ProviderResult<T> {
        let mut request = self.http_client.get(url).bearer_auth(&self.access_token);

        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::network("request timeout")
            } else {
                ProviderError::network(format!("request failed: {}", e))
            }
        })?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProviderError::authentication(
                "access token expired or invalid",
            ));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::api(format!(
                "API error ({}): {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

        serde_json::from_str(&body)
            .map_err(|e| ProviderError::invalid_response(format!("failed to parse response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderErrorCode;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> CalendarClient {
        CalendarClient::new("test-token", server.uri(), Duration::from_secs(5)).unwrap()
    }

    fn entry(id: &str, summary: &str) -> CalendarEntry {
        CalendarEntry {
            id: id.to_string(),
            summary: summary.to_string(),
            description: String::new(),
            deleted: false,
            hidden: false,
            selected: false,
            timezone: String::new(),
        }
    }

    #[test]
    fn normalization_prefers_summary_override() {
        let raw: RawCalendarEntry = serde_json::from_value(json!({
            "id": "work@example.com",
            "summary": "Primary",
            "summaryOverride": "Work",
            "timeZone": "Europe/Paris",
            "selected": true
        }))
        .unwrap();

        let normalized = CalendarEntry::from(raw);
        assert_eq!(normalized.summary, "Work");
        assert_eq!(normalized.timezone, "Europe/Paris");
        assert!(normalized.selected);
    }

    #[test]
    fn normalization_defaults_missing_fields() {
        let raw: RawCalendarEntry = serde_json::from_value(json!({
            "id": "primary",
            "summary": "Primary"
        }))
        .unwrap();

        let normalized = CalendarEntry::from(raw);
        assert_eq!(normalized.summary, "Primary");
        assert_eq!(normalized.description, "");
        assert_eq!(normalized.timezone, "");
        assert!(!normalized.deleted);
        assert!(!normalized.hidden);
        assert!(!normalized.selected);
    }

    #[test]
    fn select_calendar_bounds() {
        let calendars = vec![entry("a", "A"), entry("b", "B"), entry("c", "C")];

        assert_eq!(select_calendar(&calendars, 1).unwrap(), "a");
        assert_eq!(select_calendar(&calendars, 3).unwrap(), "c");

        let low = select_calendar(&calendars, 0).unwrap_err();
        assert_eq!(low.code(), ProviderErrorCode::OutOfRange);

        let high = select_calendar(&calendars, 4).unwrap_err();
        assert_eq!(high.code(), ProviderErrorCode::OutOfRange);

        let empty: Vec<CalendarEntry> = Vec::new();
        assert_eq!(
            select_calendar(&empty, 1).unwrap_err().code(),
            ProviderErrorCode::OutOfRange
        );
    }

    #[tokio::test]
    async fn list_calendars_follows_pagination() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/me/calendarList"))
            .and(query_param_is_missing("pageToken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": "c1", "summary": "One"}, {"id": "c2", "summary": "Two"}],
                "nextPageToken": "page2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/users/me/calendarList"))
            .and(query_param("pageToken", "page2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": "c3", "summary": "Three"}, {"id": "c4", "summary": "Four"}],
                "nextPageToken": "page3"
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/users/me/calendarList"))
            .and(query_param("pageToken", "page3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": "c5", "summary": "Five"}, {"id": "c6", "summary": "Six"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let calendars = client(&server).list_calendars().await.unwrap();

        let ids: Vec<&str> = calendars.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2", "c3", "c4", "c5", "c6"]);
    }

    #[tokio::test]
    async fn list_events_follows_pagination() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(query_param_is_missing("pageToken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"summary": "e1"}, {"summary": "e2"}],
                "nextPageToken": "t1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(query_param("pageToken", "t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"summary": "e3"}, {"summary": "e4"}],
                "nextPageToken": "t2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(query_param("pageToken", "t2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"summary": "e5"}, {"summary": "e6"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let events = client(&server).list_events("primary").await.unwrap();

        let summaries: Vec<&str> = events
            .iter()
            .map(|e| e["summary"].as_str().unwrap())
            .collect();
        assert_eq!(summaries, vec!["e1", "e2", "e3", "e4", "e5", "e6"]);
    }

    #[tokio::test]
    async fn events_are_passed_through_verbatim() {
        let server = MockServer::start().await;

        let item = json!({
            "summary": "All hands",
            "start": {"dateTime": "2024-03-15T10:00:00Z"},
            "end": {"dateTime": "2024-03-15T11:00:00Z"},
            "attendees": [{"email": "a@example.com"}],
            "unknownField": {"nested": true}
        });

        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"items": [item.clone()]})),
            )
            .mount(&server)
            .await;

        let events = client(&server).list_events("primary").await.unwrap();
        assert_eq!(events, vec![item]);
    }

    #[tokio::test]
    async fn non_success_status_is_an_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/me/calendarList"))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
            .mount(&server)
            .await;

        let err = client(&server).list_calendars().await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::Api);
        assert!(err.message().contains("backend exploded"));
    }

    #[tokio::test]
    async fn unauthorized_maps_to_authentication() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/me/calendarList"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client(&server).list_calendars().await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);
    }
}
