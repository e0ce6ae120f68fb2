//! Resolves the configured timezone into the wall-clock time used by the ledger.

use time::{OffsetDateTime, PrimitiveDateTime};
use time_tz::{Offset, TimeZone, Tz};

use crate::Error;

/// Look up a timezone by its canonical name, e.g. "Pacific/Auckland".
///
/// # Errors
/// Returns [Error::InvalidTimezoneError] if `canonical_timezone` is not a
/// canonical timezone name.
pub fn get_timezone(canonical_timezone: &str) -> Result<&'static Tz, Error> {
    time_tz::timezones::get_by_name(canonical_timezone).ok_or_else(|| {
        tracing::error!("Could not get local offset for timezone {canonical_timezone}");
        Error::InvalidTimezoneError(canonical_timezone.to_owned())
    })
}

/// The wall-clock time in `timezone` at `instant`.
///
/// Returns `None` if the instant is too close to the edge of the supported
/// date range to be shifted into another offset.
pub fn to_wall_clock(instant: OffsetDateTime, timezone: &Tz) -> Option<PrimitiveDateTime> {
    if !(-9998..=9998).contains(&instant.year()) {
        return None;
    }

    let local = instant.to_offset(timezone.get_offset_utc(&instant).to_utc());

    Some(PrimitiveDateTime::new(local.date(), local.time()))
}

/// The current date and time in `canonical_timezone`, without the offset.
///
/// # Errors
/// Returns [Error::InvalidTimezoneError] if `canonical_timezone` is not a
/// canonical timezone name, e.g. "Pacific/Auckland".
pub fn now_local(canonical_timezone: &str) -> Result<PrimitiveDateTime, Error> {
    let timezone = get_timezone(canonical_timezone)?;

    to_wall_clock(OffsetDateTime::now_utc(), timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(canonical_timezone.to_owned()))
}
