use super::models::{CalendarEvent, CalendarListEntry, CalendarListPage, EventsPage};
use super::time::FetchWindow;
use crate::components::EventSource;
use crate::error::{google_calendar_error, ExportResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3/";

/// Results requested per page
const PAGE_SIZE: &str = "250";

/// Read-only Google Calendar v3 client for one authorized account
#[derive(Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    base_url: Url,
    access_token: String,
}

impl GoogleCalendarClient {
    pub fn new(access_token: String) -> ExportResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, access_token)
    }

    /// Client against another API root, e.g. a local stand-in
    pub fn with_base_url(base_url: &str, access_token: String) -> ExportResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;
        Ok(Self {
            client: Client::new(),
            base_url,
            access_token,
        })
    }

    /// Build an endpoint URL from escaped path segments
    fn endpoint(&self, segments: &[&str]) -> ExportResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| google_calendar_error("Base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_page<T: DeserializeOwned>(&self, url: Url) -> ExportResult<T> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "HTTP {} - {}",
                status, error_body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl EventSource for GoogleCalendarClient {
    async fn list_calendars(&self) -> ExportResult<Vec<CalendarListEntry>> {
        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.endpoint(&["users", "me", "calendarList"])?;
            url.query_pairs_mut()
                .append_pair("maxResults", PAGE_SIZE)
                .append_pair("showHidden", "false")
                .append_pair("showDeleted", "false");
            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }

            let page: CalendarListPage = self.get_page(url).await?;
            debug!("Received {} calendars", page.items.len());
            calendars.extend(page.items);

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(calendars)
    }

    async fn list_events(&self, calendar_id: &str, window: &FetchWindow) -> ExportResult<Vec<CalendarEvent>> {
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.endpoint(&["calendars", calendar_id, "events"])?;
            url.query_pairs_mut()
                .append_pair("showDeleted", "false")
                .append_pair("singleEvents", "true")
                .append_pair("timeMin", &window.time_min)
                .append_pair("timeMax", &window.time_max)
                .append_pair("maxResults", PAGE_SIZE);
            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }

            let page: EventsPage = self.get_page(url).await?;
            debug!("Received {} events for {}", page.items.len(), calendar_id);
            events.extend(page.items);

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(events)
    }
}
