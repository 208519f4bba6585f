use chrono::{DateTime, Duration, NaiveTime, Timelike, Utc};

/// Next UTC instant sitting exactly on an `interval_hours` boundary after
/// `from`, with zero minutes/seconds/millis.
///
/// Always strictly later than `from`: input already on a boundary advances a
/// full interval. A computed hour of 24 or more rolls into the next calendar
/// day through the duration arithmetic.
pub fn next_aligned_hour(from: DateTime<Utc>, interval_hours: u32) -> DateTime<Utc> {
    let next = (from.hour() / interval_hours) * interval_hours + interval_hours;
    let midnight = from.date_naive().and_time(NaiveTime::MIN).and_utc();
    midnight + Duration::hours(i64::from(next))
}

/// Start time of slot `index`: `first_start + index * interval_hours`.
pub fn slot_start(first_start: DateTime<Utc>, index: u32, interval_hours: u32) -> DateTime<Utc> {
    first_start + Duration::hours(i64::from(index) * i64::from(interval_hours))
}
