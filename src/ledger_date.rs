//! Parsing of the free-form date strings stored on transactions and sent in requests.
//!
//! Transaction dates are kept exactly as the client sent them and are only
//! interpreted when read. A string that cannot be interpreted never matches a
//! date filter.

use std::ops::RangeInclusive;

use time::{
    Date, OffsetDateTime, PrimitiveDateTime, format_description::well_known::Rfc3339,
    macros::format_description,
};
use time_tz::Tz;

use crate::{Error, timezone::to_wall_clock};

/// The years a request may refer to. The periods either side of any date in
/// this range are still representable.
const REFERENCE_YEARS: RangeInclusive<i32> = 1..=9998;

time::serde::format_description!(
    pub wall_clock,
    PrimitiveDateTime,
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]"
);

/// Interpret `raw` as a wall-clock date and time.
///
/// Accepted forms, tried in order:
/// - RFC 3339 with an offset, e.g. `2025-06-18T09:30:00.000Z`. The instant is
///   converted to the wall-clock time in `local_timezone`.
/// - `YYYY-MM-DDTHH:MM`, optionally followed by `:SS` and fractional seconds.
/// - `YYYY-MM-DD`, read as midnight.
///
/// Returns `None` for anything else.
pub fn parse_transaction_date(raw: &str, local_timezone: &Tz) -> Option<PrimitiveDateTime> {
    let raw = raw.trim();

    if let Ok(date_time) = OffsetDateTime::parse(raw, &Rfc3339) {
        return to_wall_clock(date_time, local_timezone);
    }

    let naive_format = format_description!(
        "[year]-[month]-[day]T[hour]:[minute][optional [:[second][optional [.[subsecond]]]]]"
    );
    if let Ok(date_time) = PrimitiveDateTime::parse(raw, naive_format) {
        return Some(date_time);
    }

    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(Date::midnight)
}

/// Whether `raw` starts with a full `YYYY-MM-DDTHH:MM:SS` timestamp.
///
/// Date-only strings and strings with a different layout return false.
pub fn has_iso_datetime_prefix(raw: &str) -> bool {
    let Some(prefix) = raw.get(..19) else {
        return false;
    };

    PrimitiveDateTime::parse(
        prefix,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    )
    .is_ok()
}

/// Resolve an optional reference date from a request, defaulting to `now`.
///
/// # Errors
///
/// Returns [Error::InvalidDate] if `raw` is present but cannot be parsed, or
/// falls outside the years 1 to 9998.
pub fn reference_date(
    raw: Option<&str>,
    now: PrimitiveDateTime,
    local_timezone: &Tz,
) -> Result<PrimitiveDateTime, Error> {
    match raw.map(str::trim) {
        None | Some("") => Ok(now),
        Some(raw) => parse_transaction_date(raw, local_timezone)
            .filter(|date| REFERENCE_YEARS.contains(&date.year()))
            .ok_or_else(|| Error::InvalidDate(raw.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::{Error, test_utils::utc, timezone::get_timezone};

    use super::{has_iso_datetime_prefix, parse_transaction_date, reference_date};

    #[test]
    fn parses_date_only_as_midnight() {
        assert_eq!(
            parse_transaction_date("2025-06-18", utc()),
            Some(datetime!(2025-06-18 0:00))
        );
    }

    #[test]
    fn parses_rfc3339_in_utc() {
        assert_eq!(
            parse_transaction_date("2025-06-18T09:30:00.000Z", utc()),
            Some(datetime!(2025-06-18 9:30))
        );
        assert_eq!(
            parse_transaction_date("2025-06-18T09:30:00+12:00", utc()),
            Some(datetime!(2025-06-17 21:30))
        );
    }

    #[test]
    fn parses_rfc3339_in_local_timezone() {
        let auckland = get_timezone("Pacific/Auckland").unwrap();

        assert_eq!(
            parse_transaction_date("2025-06-01T00:30:00+12:00", auckland),
            Some(datetime!(2025-06-01 0:30))
        );
        assert_eq!(
            parse_transaction_date("2025-05-31T12:30:00.000Z", auckland),
            Some(datetime!(2025-06-01 0:30))
        );
        // Naive dates are already wall-clock times.
        assert_eq!(
            parse_transaction_date("2025-06-01T00:30", auckland),
            Some(datetime!(2025-06-01 0:30))
        );
    }

    #[test]
    fn parses_naive_date_times() {
        assert_eq!(
            parse_transaction_date("2025-06-18T09:30", utc()),
            Some(datetime!(2025-06-18 9:30))
        );
        assert_eq!(
            parse_transaction_date("2025-06-18T09:30:15", utc()),
            Some(datetime!(2025-06-18 9:30:15))
        );
        assert_eq!(
            parse_transaction_date(" 2025-06-18T09:30:15.250 ", utc()),
            Some(datetime!(2025-06-18 9:30:15.250))
        );
    }

    #[test]
    fn rejects_unparsable_dates() {
        for raw in ["", "yesterday", "18/06/2025", "2025-13-01", "2025-02-30"] {
            assert_eq!(parse_transaction_date(raw, utc()), None, "want {raw:?} rejected");
        }
    }

    #[test]
    fn iso_prefix_requires_time_component() {
        assert!(has_iso_datetime_prefix("2025-06-18T09:30:00"));
        assert!(has_iso_datetime_prefix("2025-06-18T09:30:00.000Z"));
        assert!(!has_iso_datetime_prefix("2025-06-18"));
        assert!(!has_iso_datetime_prefix("2025-06-18 09:30:00"));
        assert!(!has_iso_datetime_prefix("Wed Jun 18 2025 09:30"));
    }

    #[test]
    fn reference_date_defaults_to_now() {
        let now = datetime!(2025-06-18 9:30);

        assert_eq!(reference_date(None, now, utc()), Ok(now));
        assert_eq!(reference_date(Some(""), now, utc()), Ok(now));
        assert_eq!(
            reference_date(Some("2025-01-02"), now, utc()),
            Ok(datetime!(2025-01-02 0:00))
        );
        assert_eq!(
            reference_date(Some("soon"), now, utc()),
            Err(Error::InvalidDate("soon".to_owned()))
        );
    }

    #[test]
    fn reference_date_rejects_years_without_neighbouring_periods() {
        let now = datetime!(2025-06-18 9:30);

        for raw in ["-9999-01-01", "0000-01-01", "9999-12-31"] {
            assert_eq!(
                reference_date(Some(raw), now, utc()),
                Err(Error::InvalidDate(raw.to_owned())),
                "want {raw:?} rejected"
            );
        }
        assert_eq!(
            reference_date(Some("1900-03-01"), now, utc()),
            Ok(datetime!(1900-03-01 0:00))
        );
    }
}
