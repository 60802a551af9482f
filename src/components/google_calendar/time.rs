use crate::error::{other_error, ExportResult};
use chrono::{DateTime, Duration, Months, NaiveTime, Utc};

/// Timestamp format accepted by `timeMin` / `timeMax`
const QUERY_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Time range sent with every events query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchWindow {
    pub time_min: String,
    pub time_max: String,
}

/// Midnight UTC at the start of the day after `now`
pub fn tomorrow_midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    (now + Duration::hours(24))
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_utc()
}

/// Compute the events query window around tomorrow
pub fn fetch_window(now: DateTime<Utc>, past_months: u32, future_months: u32) -> ExportResult<FetchWindow> {
    let anchor = tomorrow_midnight(now);

    let min = anchor
        .checked_sub_months(Months::new(past_months))
        .ok_or_else(|| other_error("Fetch window start out of range"))?;
    let max = anchor
        .checked_add_months(Months::new(future_months))
        .ok_or_else(|| other_error("Fetch window end out of range"))?;

    Ok(FetchWindow {
        time_min: min.format(QUERY_FORMAT).to_string(),
        time_max: max.format(QUERY_FORMAT).to_string(),
    })
}
