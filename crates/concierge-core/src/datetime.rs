use std::cmp::Ordering;

use chrono::{
  DateTime,
  NaiveDate,
  NaiveDateTime,
  Utc
};
use chrono_tz::Tz;

const SECONDS_PER_DAY: i64 = 86_400;

const FORM_DATETIME_FORMATS: [&str;
  3] = [
  "%Y-%m-%dT%H:%M",
  "%Y-%m-%dT%H:%M:%S",
  "%Y-%m-%d %H:%M"
];

/// Parses the value of a date (or
/// datetime-local) input. Values are
/// wall-clock readings with no zone
/// attached; an empty or malformed value
/// is `None`.
pub fn parse_form_date(
  raw: &str
) -> Option<NaiveDateTime> {
  let token = raw.trim();
  if token.is_empty() {
    return None;
  }

  if let Ok(date) =
    NaiveDate::parse_from_str(
      token, "%Y-%m-%d"
    )
  {
    return date.and_hms_opt(0, 0, 0);
  }

  FORM_DATETIME_FORMATS
    .iter()
    .find_map(|fmt| {
      NaiveDateTime::parse_from_str(
        token, fmt
      )
      .ok()
    })
}

#[must_use]
pub fn format_form_date(
  date: NaiveDate
) -> String {
  date.format("%Y-%m-%d").to_string()
}

/// Calendar nights between two
/// wall-clock readings, rounded up to
/// whole days. `None` unless `check_out`
/// is strictly later.
///
/// Both readings are zone-free, so a
/// daylight-saving shift between them
/// never adds or drops a night.
#[must_use]
pub fn nights_between(
  check_in: NaiveDateTime,
  check_out: NaiveDateTime
) -> Option<u32> {
  let seconds = check_out
    .signed_duration_since(check_in)
    .num_seconds();
  if seconds <= 0 {
    return None;
  }

  let nights = seconds
    .div_euclid(SECONDS_PER_DAY)
    + i64::from(
      seconds.rem_euclid(
        SECONDS_PER_DAY
      ) != 0
    );
  u32::try_from(nights).ok()
}

#[must_use]
pub fn today_in(
  tz: &Tz,
  now: DateTime<Utc>
) -> NaiveDate {
  now.with_timezone(tz).date_naive()
}

/// Orders two raw form values. Parsed
/// values are compared when both parse;
/// otherwise the raw text is compared,
/// which is chronological for ISO
/// dates.
#[must_use]
pub fn compare_form_values(
  left: &str,
  right: &str
) -> Ordering {
  match (
    parse_form_date(left),
    parse_form_date(right)
  ) {
    | (Some(l), Some(r)) => l.cmp(&r),
    | _ => left.cmp(right)
  }
}
