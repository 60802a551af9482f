use crate::components::google_calendar::models::EventDateTime;
use crate::error::{Error, ExportResult};
use chrono::{DateTime, NaiveDate, TimeZone};
use std::fmt::Display;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %a %H:%M";
const TIME_FORMAT: &str = "%H:%M";

fn parse_date(value: &str) -> ExportResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|source| Error::InvalidTimestamp {
        value: value.to_string(),
        source,
    })
}

fn parse_date_time<Tz: TimeZone>(value: &str, tz: &Tz) -> ExportResult<DateTime<Tz>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(tz))
        .map_err(|source| Error::InvalidTimestamp {
            value: value.to_string(),
            source,
        })
}

/// Inclusive last day of an all-day event from its exclusive end
fn last_day(exclusive_end: NaiveDate) -> Option<NaiveDate> {
    exclusive_end.pred_opt()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Format an event's start and end as an org timestamp or range.
///
/// All-day ends are exclusive and are moved back one day before printing.
/// Timed boundaries are shown in `tz`; an end on the same local date only
/// adds its time. An event without a usable start yields an empty string.
pub fn format_range<Tz>(
    start: Option<&EventDateTime>,
    end: Option<&EventDateTime>,
    tz: &Tz,
) -> ExportResult<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let Some(start) = start else {
        return Ok(String::new());
    };

    if start.is_all_day() {
        let first = parse_date(start.date.as_deref().unwrap_or_default())?;
        let start_text = format!("<{}>", first.format(DATE_FORMAT));

        let Some(end_date) = end.filter(|e| e.is_all_day()).and_then(|e| e.date.as_deref()) else {
            return Ok(start_text);
        };
        return match last_day(parse_date(end_date)?) {
            Some(last) if last > first => Ok(format!("{}--<{}>", start_text, last.format(DATE_FORMAT))),
            _ => Ok(start_text),
        };
    }

    let Some(start_time) = non_empty(&start.date_time) else {
        return Ok(String::new());
    };
    let begin = parse_date_time(start_time, tz)?;
    let begin_text = begin.format(DATE_TIME_FORMAT).to_string();

    let Some(end_time) = end.and_then(|e| non_empty(&e.date_time)) else {
        return Ok(format!("<{}>", begin_text));
    };
    let finish = parse_date_time(end_time, tz)?;

    if finish.date_naive() == begin.date_naive() {
        Ok(format!("<{}-{}>", begin_text, finish.format(TIME_FORMAT)))
    } else {
        Ok(format!("<{}>--<{}>", begin_text, finish.format(DATE_TIME_FORMAT)))
    }
}
