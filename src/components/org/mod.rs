mod dates;
mod document;
pub mod escape;
mod event;

pub use dates::format_range;
pub use document::{calendar_heading, DOCUMENT_PREAMBLE};
pub use event::{canonical_key, sorted_attendees, OrgRenderer, DEFAULT_TITLE, MAX_LISTED_ATTENDEES};
