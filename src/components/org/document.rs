use super::escape::{clean_string, escape_title};
use crate::components::google_calendar::CalendarListEntry;

/// First lines of every exported document
pub const DOCUMENT_PREAMBLE: &str = "# -*- eval: (auto-revert-mode 1); -*-\n#+category: cal\n";

/// Top-level heading for one calendar, tagged with its account
pub fn calendar_heading(calendar: &CalendarListEntry, tag: &str) -> String {
    let title = if calendar.summary.is_empty() {
        &calendar.id
    } else {
        &calendar.summary
    };

    let mut buf = format!("* {} :{}:\n", escape_title(title), tag);
    buf.push_str("  :PROPERTIES:\n");
    buf.push_str(&format!("  :ID:         {}\n", calendar.id));
    buf.push_str("  :END:\n");
    buf.push_str(&clean_string(&format!("\n{}\n\n", calendar.description)));
    buf
}
