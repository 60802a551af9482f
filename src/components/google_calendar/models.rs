use serde::Deserialize;

/// Marker separating a recurring series UID from its instance suffix
pub const RECURRENCE_MARKER: &str = "_R";

/// Lifecycle status of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Confirmed,
    // Some feeds spell it "tenative"; both parse to the same variant.
    #[serde(alias = "tenative")]
    Tentative,
    Cancelled,
    #[serde(other)]
    Unknown,
}

/// An attendee's answer to the invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseStatus {
    #[serde(alias = "NeedsAction")]
    NeedsAction,
    Declined,
    #[serde(alias = "tenative")]
    Tentative,
    Accepted,
    #[serde(other)]
    Unknown,
}

/// Start or end of an event
///
/// All-day events carry `date`, timed events carry `date_time` (RFC 3339).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
}

impl EventDateTime {
    /// All-day boundary
    pub fn date(date: &str) -> Self {
        Self {
            date: Some(date.to_string()),
            ..Default::default()
        }
    }

    /// Timed boundary
    pub fn date_time(date_time: &str) -> Self {
        Self {
            date_time: Some(date_time.to_string()),
            ..Default::default()
        }
    }

    pub fn is_all_day(&self) -> bool {
        self.date.as_deref().is_some_and(|d| !d.is_empty())
    }
}

/// Creator or organizer of an event
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    /// Set on the entry describing the authorized user
    #[serde(default, rename = "self")]
    pub is_self: bool,
    #[serde(default)]
    pub response_status: Option<ResponseStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub file_url: String,
}

/// One calendar event instance as returned by the events list
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    #[serde(default, rename = "iCalUID")]
    pub ical_uid: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default)]
    pub html_link: String,
    #[serde(default)]
    pub start: Option<EventDateTime>,
    #[serde(default)]
    pub end: Option<EventDateTime>,
    #[serde(default)]
    pub creator: Option<Person>,
    #[serde(default)]
    pub organizer: Option<Person>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl CalendarEvent {
    /// iCalendar UID, or the instance id when the UID is missing
    pub fn uid(&self) -> &str {
        if self.ical_uid.is_empty() {
            &self.id
        } else {
            &self.ical_uid
        }
    }

    /// Identifier shared by every instance of a recurring series
    pub fn series_id(&self) -> &str {
        let uid = self.uid();
        match uid.find(RECURRENCE_MARKER) {
            Some(pos) => &uid[..pos],
            None => uid,
        }
    }

    pub fn summary(&self) -> &str {
        self.summary.as_deref().unwrap_or("")
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// Entry of the user's calendar list
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListEntry {
    pub id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
}

/// One page of `calendarList.list`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListPage {
    #[serde(default)]
    pub items: Vec<CalendarListEntry>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// One page of `events.list`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsPage {
    #[serde(default)]
    pub items: Vec<CalendarEvent>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_id_truncates_recurrence_suffix() {
        let event = CalendarEvent {
            id: "abc_20240110T090000Z".to_string(),
            ical_uid: "040000008200E_R20240110T090000".to_string(),
            ..Default::default()
        };
        assert_eq!(event.series_id(), "040000008200E");
    }

    #[test]
    fn test_series_id_without_marker_is_uid() {
        let event = CalendarEvent {
            id: "plain".to_string(),
            ical_uid: "plain@google.com".to_string(),
            ..Default::default()
        };
        assert_eq!(event.series_id(), "plain@google.com");
    }

    #[test]
    fn test_series_id_falls_back_to_id() {
        let event = CalendarEvent {
            id: "only-id_R1".to_string(),
            ..Default::default()
        };
        assert_eq!(event.uid(), "only-id_R1");
        assert_eq!(event.series_id(), "only-id");
    }

    #[test]
    fn test_parse_events_page() {
        let json = r#"{
            "kind": "calendar#events",
            "nextPageToken": "page-2",
            "items": [
                {
                    "id": "evt1",
                    "iCalUID": "evt1@google.com",
                    "status": "tenative",
                    "htmlLink": "https://www.google.com/calendar/event?eid=evt1",
                    "summary": "Planning",
                    "start": {"dateTime": "2024-01-10T09:00:00+02:00", "timeZone": "Europe/Helsinki"},
                    "end": {"dateTime": "2024-01-10T10:30:00+02:00"},
                    "organizer": {"email": "boss@example.com", "displayName": "Boss"},
                    "attendees": [
                        {"email": "me@example.com", "self": true, "responseStatus": "declined"},
                        {"email": "you@example.com", "responseStatus": "needsAction"},
                        {"email": "odd@example.com", "responseStatus": "somethingNew"}
                    ],
                    "attachments": [{"title": "Agenda", "fileUrl": "https://drive.google.com/x"}]
                },
                {"id": "evt2", "status": "cancelled", "start": {"date": "2024-01-11"}}
            ]
        }"#;

        let page: EventsPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.next_page_token.as_deref(), Some("page-2"));
        assert_eq!(page.items.len(), 2);

        let first = &page.items[0];
        assert_eq!(first.status, EventStatus::Tentative);
        assert_eq!(first.attendees.len(), 3);
        assert!(first.attendees[0].is_self);
        assert_eq!(first.attendees[0].response_status, Some(ResponseStatus::Declined));
        assert_eq!(first.attendees[1].response_status, Some(ResponseStatus::NeedsAction));
        assert_eq!(first.attendees[2].response_status, Some(ResponseStatus::Unknown));
        assert_eq!(first.attachments[0].file_url, "https://drive.google.com/x");
        assert!(!first.start.as_ref().unwrap().is_all_day());

        let second = &page.items[1];
        assert_eq!(second.status, EventStatus::Cancelled);
        assert_eq!(second.uid(), "evt2");
        assert!(second.start.as_ref().unwrap().is_all_day());
        assert!(second.end.is_none());
    }

    #[test]
    fn test_status_spellings() {
        let correct: EventStatus = serde_json::from_str("\"tentative\"").unwrap();
        let typo: EventStatus = serde_json::from_str("\"tenative\"").unwrap();
        let other: EventStatus = serde_json::from_str("\"postponed\"").unwrap();
        assert_eq!(correct, EventStatus::Tentative);
        assert_eq!(typo, EventStatus::Tentative);
        assert_eq!(other, EventStatus::Unknown);
    }
}
