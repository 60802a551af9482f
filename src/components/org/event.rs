use super::dates::format_range;
use super::escape::{clean_string, escape_title};
use crate::components::google_calendar::models::{
    Attendee, CalendarEvent, EventStatus, Person, ResponseStatus,
};
use crate::components::google_calendar::EventGroup;
use crate::error::ExportResult;
use chrono::TimeZone;
use std::collections::HashSet;
use std::fmt::Display;

/// Above this many attendees only a placeholder line is printed
pub const MAX_LISTED_ATTENDEES: usize = 20;

/// Title used for events without a summary
pub const DEFAULT_TITLE: &str = "busy";

/// Sort and de-duplication key: first non-empty of id, email, display name
pub fn canonical_key(attendee: &Attendee) -> String {
    if !attendee.id.is_empty() {
        attendee.id.clone()
    } else if !attendee.email.is_empty() {
        attendee.email.clone()
    } else {
        clean_string(&attendee.display_name)
    }
}

/// Attendees ordered by canonical key; the input slice is left untouched
pub fn sorted_attendees(attendees: &[Attendee]) -> Vec<&Attendee> {
    let mut sorted: Vec<&Attendee> = attendees.iter().collect();
    sorted.sort_by_cached_key(|a| canonical_key(a));
    sorted
}

fn status_glyph(status: Option<ResponseStatus>) -> &'static str {
    match status {
        Some(ResponseStatus::Declined) => "✗",
        Some(ResponseStatus::Tentative) => "☐",
        Some(ResponseStatus::Accepted) => "✓",
        _ => " ",
    }
}

fn mailto(person_email: &str, name: &str) -> String {
    format!("[[mailto:{}][{}]]", person_email, name)
}

fn person_link(person: &Person) -> String {
    mailto(&person.email, &clean_string(&person.display_name))
}

/// Renders calendar events as org-mode entries in one display timezone
#[derive(Debug, Clone)]
pub struct OrgRenderer<Tz: TimeZone> {
    tz: Tz,
}

impl<Tz> OrgRenderer<Tz>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Heading line and properties drawer
    pub fn header(&self, event: &CalendarEvent) -> String {
        let mut buf = String::from("** ");
        match event.status {
            EventStatus::Tentative => buf.push_str("(tentative) "),
            EventStatus::Cancelled => buf.push_str("(cancelled) "),
            EventStatus::Confirmed | EventStatus::Unknown => {}
        }

        let summary = match event.summary() {
            "" => DEFAULT_TITLE,
            s => s,
        };
        buf.push_str(&escape_title(summary));
        buf.push('\n');

        buf.push_str(":PROPERTIES:\n");
        buf.push_str(&format!(":ID:       {}\n", event.uid()));
        buf.push_str(&format!(":GCALLINK: {}\n", event.html_link));
        if let Some(creator) = &event.creator {
            buf.push_str(&format!(":CREATOR: {}\n", person_link(creator)));
        }
        if let Some(organizer) = &event.organizer {
            buf.push_str(&format!(":ORGANIZER: {}\n", person_link(organizer)));
        }
        buf.push_str(":END:\n\n");
        buf
    }

    /// Timestamp line of one instance; blank for undated events
    pub fn date_line(&self, event: &CalendarEvent) -> ExportResult<String> {
        let range = format_range(event.start.as_ref(), event.end.as_ref(), &self.tz)?;
        Ok(format!("{}\n", range))
    }

    /// Attendee block, empty when there are no attendees
    pub fn attendees(&self, event: &CalendarEvent) -> String {
        if event.attendees.is_empty() {
            return String::new();
        }
        if event.attendees.len() > MAX_LISTED_ATTENDEES {
            return "Attendees: ... Many\n".to_string();
        }

        let mut buf = String::from("Attendees:\n");
        for attendee in sorted_attendees(&event.attendees) {
            let mut name = clean_string(&attendee.display_name);
            if name.is_empty() {
                name = attendee.email.clone();
            }
            buf.push_str(&format!(
                " {} {}\n",
                status_glyph(attendee.response_status),
                mailto(&attendee.email, &name)
            ));
        }
        buf
    }

    /// Summary, description and attachment list
    pub fn body(&self, event: &CalendarEvent) -> String {
        let mut buf = clean_string(&format!(
            "\nSummary: {}\n{}\n",
            event.summary(),
            event.description()
        ));
        buf.push('\n');

        let entries: String = event
            .attachments
            .iter()
            .map(|a| format!("- [[{}][{}]]\n", a.file_url, clean_string(&a.title)))
            .collect();
        if !entries.is_empty() {
            buf.push_str("\nAttachments:\n");
            buf.push_str(&entries);
        }
        buf
    }

    /// Render every instance of a series as one org entry.
    ///
    /// The heading comes from the last instance. Each instance adds its date
    /// line; attendee and body blocks identical to earlier ones are skipped.
    pub fn render_group(&self, group: &EventGroup) -> ExportResult<String> {
        let Some(latest) = group.latest() else {
            return Ok(String::new());
        };
        let mut buf = self.header(latest);

        let mut seen_attendees = HashSet::new();
        for event in &group.events {
            buf.push_str(&self.date_line(event)?);
            let block = self.attendees(event);
            if seen_attendees.insert(block.clone()) {
                buf.push_str(&block);
            }
        }

        let mut seen_bodies = HashSet::new();
        for event in &group.events {
            let block = self.body(event);
            if seen_bodies.insert(block.clone()) {
                buf.push_str(&block);
            }
        }

        Ok(buf)
    }

    /// Render a single event as its own entry
    pub fn render_event(&self, event: &CalendarEvent) -> ExportResult<String> {
        self.render_group(&EventGroup {
            series_id: event.series_id().to_string(),
            events: vec![event.clone()],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::google_calendar::models::{Attachment, EventDateTime};
    use chrono::Utc;

    fn renderer() -> OrgRenderer<Utc> {
        OrgRenderer::new(Utc)
    }

    fn attendee(email: &str, name: &str, status: Option<ResponseStatus>) -> Attendee {
        Attendee {
            email: email.to_string(),
            display_name: name.to_string(),
            response_status: status,
            ..Default::default()
        }
    }

    fn meeting() -> CalendarEvent {
        CalendarEvent {
            id: "m1".to_string(),
            ical_uid: "meeting@google.com".to_string(),
            summary: Some("Design review".to_string()),
            description: Some("Bring [notes]".to_string()),
            html_link: "https://calendar.google.com/event?eid=m1".to_string(),
            start: Some(EventDateTime::date_time("2024-01-10T09:00:00Z")),
            end: Some(EventDateTime::date_time("2024-01-10T10:30:00Z")),
            organizer: Some(Person {
                email: "lead@example.com".to_string(),
                display_name: "Lead [PM]".to_string(),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_header() {
        let header = renderer().header(&meeting());
        assert_eq!(
            header,
            "** Design review\n\
             :PROPERTIES:\n\
             :ID:       meeting@google.com\n\
             :GCALLINK: https://calendar.google.com/event?eid=m1\n\
             :ORGANIZER: [[mailto:lead@example.com][Lead {PM}]]\n\
             :END:\n\n"
        );
    }

    #[test]
    fn test_header_status_and_default_title() {
        let mut event = meeting();
        event.summary = None;
        event.status = EventStatus::Tentative;
        assert!(renderer().header(&event).starts_with("** (tentative) busy\n"));

        event.status = EventStatus::Cancelled;
        event.summary = Some("TODO [x] ship".to_string());
        assert!(renderer().header(&event).starts_with("** (cancelled) /TODO/ {x} ship\n"));

        event.status = EventStatus::Unknown;
        assert!(renderer().header(&event).starts_with("** /TODO/ {x} ship\n"));
    }

    #[test]
    fn test_header_with_creator() {
        let mut event = meeting();
        event.creator = Some(Person {
            email: "me@example.com".to_string(),
            display_name: String::new(),
        });
        let header = renderer().header(&event);
        assert!(header.contains(":CREATOR: [[mailto:me@example.com][]]\n"));
    }

    #[test]
    fn test_attendees_sorted_with_glyphs() {
        let mut event = meeting();
        event.attendees = vec![
            attendee("zed@example.com", "Zed", Some(ResponseStatus::Accepted)),
            attendee("amy@example.com", "", Some(ResponseStatus::Declined)),
            attendee("kim@example.com", "Kim", Some(ResponseStatus::Tentative)),
            attendee("bob@example.com", "Bob", Some(ResponseStatus::NeedsAction)),
            attendee("cat@example.com", "Cat", None),
        ];

        assert_eq!(
            renderer().attendees(&event),
            "Attendees:\n \
             ✗ [[mailto:amy@example.com][amy@example.com]]\n   \
             [[mailto:bob@example.com][Bob]]\n   \
             [[mailto:cat@example.com][Cat]]\n \
             ☐ [[mailto:kim@example.com][Kim]]\n \
             ✓ [[mailto:zed@example.com][Zed]]\n"
        );
        // Caller's order is untouched
        assert_eq!(event.attendees[0].email, "zed@example.com");
    }

    #[test]
    fn test_canonical_key_precedence() {
        let mut a = attendee("mail@example.com", "Name", None);
        a.id = "id-1".to_string();
        assert_eq!(canonical_key(&a), "id-1");
        a.id.clear();
        assert_eq!(canonical_key(&a), "mail@example.com");
        a.email.clear();
        a.display_name = "[Team]".to_string();
        assert_eq!(canonical_key(&a), "{Team}");
    }

    #[test]
    fn test_attendee_limit() {
        let mut event = meeting();
        event.attendees = (0..21)
            .map(|i| attendee(&format!("p{:02}@example.com", i), "", None))
            .collect();
        assert_eq!(renderer().attendees(&event), "Attendees: ... Many\n");

        event.attendees.pop();
        let block = renderer().attendees(&event);
        assert!(!block.contains("Many"));
        for i in 0..20 {
            let line = format!("[[mailto:p{:02}@example.com]", i);
            assert_eq!(block.matches(&line).count(), 1);
        }
    }

    #[test]
    fn test_no_attendees_renders_nothing() {
        assert_eq!(renderer().attendees(&meeting()), "");
    }

    #[test]
    fn test_body_escapes_and_lists_attachments() {
        let mut event = meeting();
        event.description = Some("Agenda:\n* item one\n[link]".to_string());
        event.attachments = vec![Attachment {
            title: "Slides [v2]".to_string(),
            file_url: "https://drive.google.com/slides".to_string(),
        }];

        assert_eq!(
            renderer().body(&event),
            "\nSummary: Design review\nAgenda:\n,* item one\n{link}\n\n\
             \nAttachments:\n- [[https://drive.google.com/slides][Slides {v2}]]\n"
        );
    }

    #[test]
    fn test_body_without_attachments() {
        assert_eq!(
            renderer().body(&meeting()),
            "\nSummary: Design review\nBring {notes}\n\n"
        );
    }

    #[test]
    fn test_render_group_deduplicates_blocks() {
        let mut first = meeting();
        first.ical_uid = "weekly_R20240110".to_string();
        first.attendees = vec![attendee("amy@example.com", "Amy", Some(ResponseStatus::Accepted))];

        let mut second = first.clone();
        second.ical_uid = "weekly_R20240117".to_string();
        second.start = Some(EventDateTime::date_time("2024-01-17T09:00:00Z"));
        second.end = Some(EventDateTime::date_time("2024-01-17T10:30:00Z"));

        let mut third = second.clone();
        third.ical_uid = "weekly_R20240124".to_string();
        third.summary = Some("Design review (moved)".to_string());
        third.start = Some(EventDateTime::date_time("2024-01-24T13:00:00Z"));
        third.end = Some(EventDateTime::date_time("2024-01-24T14:00:00Z"));

        let group = EventGroup {
            series_id: "weekly".to_string(),
            events: vec![first, second, third],
        };
        let text = renderer().render_group(&group).unwrap();

        assert!(text.starts_with("** Design review (moved)\n"));
        assert!(text.contains(":ID:       weekly_R20240124\n"));
        assert_eq!(text.matches("Attendees:\n").count(), 1);
        assert_eq!(text.matches("\nSummary: Design review\n").count(), 1);
        assert_eq!(text.matches("\nSummary: Design review (moved)\n").count(), 1);
        assert!(text.contains(
            "<2024-01-10 Wed 09:00-10:30>\nAttendees:\n ✓ [[mailto:amy@example.com][Amy]]\n\
             <2024-01-17 Wed 09:00-10:30>\n<2024-01-24 Wed 13:00-14:00>\n"
        ));
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut event = meeting();
        event.attendees = vec![
            attendee("b@example.com", "B", None),
            attendee("a@example.com", "A", None),
        ];
        let group = EventGroup {
            series_id: "meeting@google.com".to_string(),
            events: vec![event],
        };
        let r = renderer();
        assert_eq!(r.render_group(&group).unwrap(), r.render_group(&group).unwrap());
    }

    #[test]
    fn test_render_event_undated() {
        let mut event = meeting();
        event.start = None;
        event.end = None;
        let text = renderer().render_event(&event).unwrap();
        assert!(text.contains(":END:\n\n\n\nSummary: Design review\n"));
    }

    #[test]
    fn test_render_group_propagates_bad_timestamp() {
        let mut event = meeting();
        event.start = Some(EventDateTime::date_time("garbage"));
        assert!(renderer().render_event(&event).is_err());
    }

    #[test]
    fn test_empty_group_renders_nothing() {
        let group = EventGroup {
            series_id: "none".to_string(),
            events: Vec::new(),
        };
        assert_eq!(renderer().render_group(&group).unwrap(), "");
    }
}
