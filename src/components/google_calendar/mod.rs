mod client;
mod grouping;
pub mod models;
pub mod time;
pub mod token;

pub use client::GoogleCalendarClient;
pub use grouping::{group_by_series, is_declined_by_self, EventGroup, TitleFilters};
pub use models::{CalendarEvent, CalendarListEntry};
pub use time::FetchWindow;
pub use token::TokenManager;
