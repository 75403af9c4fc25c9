//! Creation timestamps as they are stored in the `posts.created_at` column.
//!
//! New rows are always written in [`STORED_FORMAT`] (UTC, second precision),
//! the same shape SQLite's `CURRENT_TIMESTAMP` default produces. Older rows may
//! carry RFC 3339 text, so reads still accept a small set of fallbacks.

use time::format_description::well_known::Rfc3339;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

pub const STORED_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Current time in the canonical stored form.
pub fn now() -> Result<String, time::error::Format> {
    format_stored(OffsetDateTime::now_utc())
}

pub fn format_stored(at: OffsetDateTime) -> Result<String, time::error::Format> {
    at.to_offset(UtcOffset::UTC).format(STORED_FORMAT)
}

/// Parses a stored timestamp, trying the canonical form, then RFC 3339, then
/// the leading `YYYY-MM-DD` alone (read as UTC midnight).
pub fn parse(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(at) = PrimitiveDateTime::parse(raw, STORED_FORMAT) {
        return Some(at.assume_utc());
    }
    if let Ok(at) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(at);
    }
    let date = parse_date(raw.get(..10)?)?;
    Some(PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_utc())
}

pub fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), DATE_FORMAT).ok()
}

/// Human-readable day label, e.g. `June 1, 2025`.
pub fn day_label(date: Date) -> String {
    format!("{} {}, {}", date.month(), date.day(), date.year())
}
