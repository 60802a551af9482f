use crate::error::ExportResult;
use async_trait::async_trait;

// Export components
pub mod exporter;
pub mod google_calendar;
pub mod org;

pub use exporter::Exporter;
use google_calendar::{CalendarEvent, CalendarListEntry, FetchWindow};

/// Where calendars and their events come from
#[async_trait]
pub trait EventSource: Send + Sync {
    /// All calendars visible to the account
    async fn list_calendars(&self) -> ExportResult<Vec<CalendarListEntry>>;

    /// Expanded event instances of one calendar within the window
    async fn list_events(&self, calendar_id: &str, window: &FetchWindow) -> ExportResult<Vec<CalendarEvent>>;
}
