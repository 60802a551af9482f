use super::models::{CalendarEvent, ResponseStatus};
use std::collections::{BTreeMap, HashMap};

/// Instances of one recurring series, in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventGroup {
    pub series_id: String,
    pub events: Vec<CalendarEvent>,
}

impl EventGroup {
    /// Instance carrying the most recent header data
    pub fn latest(&self) -> Option<&CalendarEvent> {
        self.events.last()
    }

    /// Instance whose title decides filtering
    pub fn representative(&self) -> Option<&CalendarEvent> {
        self.events.first()
    }
}

/// Partition events by series id.
///
/// Groups come back sorted by series id; each keeps the input order of its
/// members.
pub fn group_by_series(events: Vec<CalendarEvent>) -> Vec<EventGroup> {
    let mut by_series: BTreeMap<String, Vec<CalendarEvent>> = BTreeMap::new();
    for event in events {
        by_series
            .entry(event.series_id().to_string())
            .or_default()
            .push(event);
    }

    by_series
        .into_iter()
        .map(|(series_id, events)| EventGroup { series_id, events })
        .collect()
}

/// Whether the authorized user declined this event
pub fn is_declined_by_self(event: &CalendarEvent) -> bool {
    event
        .attendees
        .iter()
        .any(|a| a.is_self && a.response_status == Some(ResponseStatus::Declined))
}

/// Per-calendar title substrings that hide an event series
#[derive(Debug, Clone, Default)]
pub struct TitleFilters {
    by_calendar: HashMap<String, Vec<String>>,
}

impl TitleFilters {
    pub fn new(by_calendar: HashMap<String, Vec<String>>) -> Self {
        Self { by_calendar }
    }

    /// Case-sensitive substring match against the calendar's list
    pub fn is_suppressed(&self, calendar_id: &str, title: &str) -> bool {
        self.by_calendar
            .get(calendar_id)
            .is_some_and(|subs| subs.iter().any(|s| title.contains(s.as_str())))
    }

    /// Whether a whole group is hidden, judged by its first instance
    pub fn suppresses_group(&self, calendar_id: &str, group: &EventGroup) -> bool {
        group
            .representative()
            .is_some_and(|event| self.is_suppressed(calendar_id, event.summary()))
    }
}
