//! Relative-time captions for display.
//!
//! These functions never fail: a missing or unparseable timestamp yields
//! [`UNAVAILABLE`]. "Now" is always passed in.

use chrono::{DateTime, NaiveDate, Utc};

/// Caption used when there is no usable timestamp.
pub const UNAVAILABLE: &str = "unavailable";

/// Describe how long ago `then` was, in the largest whole unit elapsed.
///
/// Timestamps at or after `now` read as "a few seconds ago".
pub fn time_ago(then: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
  let Some(then) = then else {
    return UNAVAILABLE.to_owned();
  };

  let delta = now.signed_duration_since(then);
  let days = delta.num_days();
  let hours = delta.num_hours();
  let minutes = delta.num_minutes();

  if days >= 1 {
    format!("{} ago", count(days, "day"))
  } else if hours >= 1 {
    format!("{} ago", count(hours, "hour"))
  } else if minutes >= 1 {
    format!("{} ago", count(minutes, "minute"))
  } else {
    "a few seconds ago".to_owned()
  }
}

/// [`time_ago`] over an RFC 3339 string.
pub fn time_ago_str(raw: &str, now: DateTime<Utc>) -> String {
  let parsed = DateTime::parse_from_rfc3339(raw.trim())
    .ok()
    .map(|dt| dt.with_timezone(&Utc));
  time_ago(parsed, now)
}

/// Signed whole calendar days from `today` to `date`.
pub fn days_between(today: NaiveDate, date: NaiveDate) -> i64 {
  date.signed_duration_since(today).num_days()
}

/// "in N day(s)" for a future date, "today" otherwise.
pub fn days_until(date: NaiveDate, today: NaiveDate) -> String {
  let days = days_between(today, date);
  if days > 0 {
    format!("in {}", count(days, "day"))
  } else {
    "today".to_owned()
  }
}

/// `1 day`, `3 days`.
fn count(n: i64, unit: &str) -> String {
  if n == 1 { format!("{n} {unit}") } else { format!("{n} {unit}s") }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};

  use super::*;

  fn now() -> DateTime<Utc> { Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap() }

  #[test]
  fn missing_timestamp_is_unavailable() {
    assert_eq!(time_ago(None, now()), "unavailable");
  }

  #[test]
  fn picks_the_largest_whole_unit() {
    let n = now();
    assert_eq!(time_ago(Some(n - Duration::seconds(20)), n), "a few seconds ago");
    assert_eq!(time_ago(Some(n - Duration::minutes(1)), n), "1 minute ago");
    assert_eq!(time_ago(Some(n - Duration::minutes(59)), n), "59 minutes ago");
    assert_eq!(time_ago(Some(n - Duration::hours(1)), n), "1 hour ago");
    assert_eq!(time_ago(Some(n - Duration::hours(23)), n), "23 hours ago");
    assert_eq!(time_ago(Some(n - Duration::hours(24)), n), "1 day ago");
    assert_eq!(time_ago(Some(n - Duration::days(12)), n), "12 days ago");
  }

  #[test]
  fn future_timestamp_reads_as_just_now() {
    let n = now();
    assert_eq!(time_ago(Some(n + Duration::hours(2)), n), "a few seconds ago");
  }

  #[test]
  fn string_input_tolerates_garbage() {
    let n = now();
    assert_eq!(time_ago_str("not a date", n), "unavailable");
    assert_eq!(time_ago_str("", n), "unavailable");
    assert_eq!(time_ago_str("2025-06-15T09:00:00Z", n), "3 hours ago");
    assert_eq!(time_ago_str("2025-06-15T10:00:00+01:00", n), "3 hours ago");
  }

  #[test]
  fn days_until_counts_calendar_days() {
    let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
    assert_eq!(days_until(today + Duration::days(1), today), "in 1 day");
    assert_eq!(days_until(today + Duration::days(3), today), "in 3 days");
    assert_eq!(days_until(today, today), "today");
    assert_eq!(days_until(today - Duration::days(2), today), "today");
  }
}
