//! Display helpers for scan timestamps and text previews

use chrono::{DateTime, Datelike, Duration, Local, TimeZone};

/// Longest text preview shown on a history card
pub const PREVIEW_CHARS: usize = 100;

/// Format an epoch-ms timestamp relative to the current local time
pub fn format_date(timestamp_ms: i64) -> String {
    format_date_relative(timestamp_ms, &Local::now())
}

/// "Today, 3:04 PM", "Yesterday, 3:04 PM", "Mar 2, 3:04 PM", or
/// "Mar 2, 2023, 3:04 PM" when the year differs from `now`
pub fn format_date_relative<Tz: TimeZone>(timestamp_ms: i64, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let Some(date) = now.timezone().timestamp_millis_opt(timestamp_ms).single() else {
        return String::from("Unknown date");
    };

    let today = now.date_naive();
    let day = date.date_naive();
    let time = date.format("%-I:%M %p");

    // anything from the start of today onwards counts as today
    if day >= today {
        format!("Today, {}", time)
    } else if day == today - Duration::days(1) {
        format!("Yesterday, {}", time)
    } else if date.year() != now.year() {
        format!("{}, {}", date.format("%b %-d, %Y"), time)
    } else {
        format!("{}, {}", date.format("%b %-d"), time)
    }
}

/// Cut `text` to at most `max_chars` characters, marking the cut with "..."
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
