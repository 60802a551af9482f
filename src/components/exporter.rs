use super::google_calendar::{
    group_by_series, is_declined_by_self, CalendarEvent, CalendarListEntry, FetchWindow, TitleFilters,
};
use super::org::{calendar_heading, OrgRenderer};
use super::EventSource;
use crate::config::{AccountConfig, Config};
use crate::error::ExportResult;
use chrono::TimeZone;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::HashMap;
use std::fmt::Display;
use tracing::{debug, info, warn};

/// Turns fetched calendars into org-mode text
pub struct Exporter<Tz: TimeZone> {
    renderer: OrgRenderer<Tz>,
    title_filters: TitleFilters,
    skip_declined: bool,
    max_concurrent_fetches: usize,
}

impl<Tz> Exporter<Tz>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    pub fn new(renderer: OrgRenderer<Tz>, title_filters: TitleFilters) -> Self {
        Self {
            renderer,
            title_filters,
            skip_declined: true,
            max_concurrent_fetches: 1,
        }
    }

    /// Exporter with filtering and concurrency taken from the config
    pub fn from_config(config: &Config, renderer: OrgRenderer<Tz>) -> Self {
        Self::new(renderer, config.title_filters())
            .with_skip_declined(config.skip_declined)
            .with_max_concurrent_fetches(config.max_concurrent_fetches)
    }

    pub fn with_skip_declined(mut self, skip_declined: bool) -> Self {
        self.skip_declined = skip_declined;
        self
    }

    pub fn with_max_concurrent_fetches(mut self, limit: usize) -> Self {
        self.max_concurrent_fetches = limit.max(1);
        self
    }

    /// Entries of one calendar, one per surviving event series.
    ///
    /// Groups whose timestamps cannot be parsed are logged and left out.
    pub fn render_calendar(&self, calendar_id: &str, events: Vec<CalendarEvent>) -> String {
        let total = events.len();
        let events: Vec<CalendarEvent> = if self.skip_declined {
            events.into_iter().filter(|e| !is_declined_by_self(e)).collect()
        } else {
            events
        };
        if events.len() < total {
            debug!("Dropped {} declined events from {}", total - events.len(), calendar_id);
        }

        let mut buf = String::new();
        for group in group_by_series(events) {
            if self.title_filters.suppresses_group(calendar_id, &group) {
                debug!("Filtered series {} in {}", group.series_id, calendar_id);
                continue;
            }
            match self.renderer.render_group(&group) {
                Ok(entry) => {
                    buf.push_str(&entry);
                    buf.push('\n');
                }
                Err(e) => warn!("Skipping series {} in {}: {}", group.series_id, calendar_id, e),
            }
        }
        buf
    }

    /// Fetch and render every approved calendar of one account.
    ///
    /// Calendars are emitted in the order the account lists them; ones the
    /// source does not know about are skipped.
    pub async fn export_account<S>(
        &self,
        source: &S,
        account: &AccountConfig,
        window: &FetchWindow,
    ) -> ExportResult<String>
    where
        S: EventSource + ?Sized,
    {
        let available: HashMap<String, CalendarListEntry> = source
            .list_calendars()
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        let mut approved = Vec::new();
        for calendar_id in &account.calendars {
            match available.get(calendar_id) {
                Some(calendar) => approved.push(calendar.clone()),
                None => warn!("Calendar {} not found for account {}", calendar_id, account.tag),
            }
        }

        let fetched: Vec<(CalendarListEntry, Vec<CalendarEvent>)> = stream::iter(approved)
            .map(|calendar| async move {
                info!("Fetching events for {}", calendar.id);
                let events = source.list_events(&calendar.id, window).await?;
                Ok::<_, crate::error::Error>((calendar, events))
            })
            .buffered(self.max_concurrent_fetches)
            .try_collect()
            .await?;

        let mut buf = String::new();
        for (calendar, events) in fetched {
            info!("Rendering {} events from {}", events.len(), calendar.id);
            buf.push_str(&calendar_heading(&calendar, &account.tag));
            buf.push_str(&self.render_calendar(&calendar.id, events));
        }
        Ok(buf)
    }
}
