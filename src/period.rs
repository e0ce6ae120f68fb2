//! Calendar windows used to scope ledger queries.
//!
//! Weeks start on Monday. Every [Period] is inclusive at both ends and finishes
//! at 23:59:59.999 on its last day, so consecutive periods never overlap.

use time::{Date, Duration, Month, PrimitiveDateTime, Time, macros::time};

/// The length of a calendar period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// A single calendar day.
    Day,
    /// Monday to Sunday.
    Week,
    /// The first to the last day of a calendar month.
    Month,
}

/// The last representable instant of a day.
const END_OF_DAY: Time = time!(23:59:59.999);

/// An inclusive `[start, end]` window of wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    /// The first instant in the period, midnight on the first day.
    pub start: PrimitiveDateTime,
    /// The last instant in the period, 23:59:59.999 on the last day.
    pub end: PrimitiveDateTime,
}

/// A period and the period of the same length immediately before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodPair {
    /// The period containing the reference instant.
    pub current: Period,
    /// The period before `current`.
    pub previous: Period,
}

impl Period {
    fn from_dates(first: Date, last: Date) -> Self {
        Self {
            start: first.midnight(),
            end: PrimitiveDateTime::new(last, END_OF_DAY),
        }
    }

    /// The period of `granularity` that contains `reference`.
    pub fn containing(granularity: Granularity, reference: PrimitiveDateTime) -> Self {
        let date = reference.date();

        match granularity {
            Granularity::Day => Self::from_dates(date, date),
            Granularity::Week => {
                let (first, last) = week_bounds(date);
                Self::from_dates(first, last)
            }
            Granularity::Month => {
                let (first, last) = month_bounds(date);
                Self::from_dates(first, last)
            }
        }
    }

    /// The period of `granularity` immediately before the one containing `reference`.
    pub fn previous(granularity: Granularity, reference: PrimitiveDateTime) -> Self {
        let current = Self::containing(granularity, reference);

        Self::containing(granularity, current.start - Duration::milliseconds(1))
    }

    /// The current and previous periods of `granularity` relative to `reference`.
    pub fn pair(granularity: Granularity, reference: PrimitiveDateTime) -> PeriodPair {
        PeriodPair {
            current: Self::containing(granularity, reference),
            previous: Self::previous(granularity, reference),
        }
    }

    /// Whether `instant` falls within the period, boundaries included.
    pub fn contains(&self, instant: PrimitiveDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// The calendar month `month` of `year`.
pub fn month_period(year: i32, month: Month) -> Period {
    let first = first_of_month(year, month);

    Period::containing(Granularity::Month, first.midnight())
}

/// The last instant of `year`, 23:59:59.999 on 31 December.
pub fn year_end(year: i32) -> PrimitiveDateTime {
    let last_day =
        Date::from_calendar_date(year, Month::December, 31).expect("invalid year end date");

    PrimitiveDateTime::new(last_day, END_OF_DAY)
}

/// Move `date` forward by `months` calendar months.
///
/// The day of the month is clamped to the length of the target month, so
/// 31 January plus one month is 28 (or 29) February.
pub fn add_months(date: Date, months: u32) -> Date {
    let month_index = date.month() as u32 - 1 + months;
    let year = date.year() + (month_index / 12) as i32;
    let month = date.month().nth_next((months % 12) as u8);
    let day = date.day().min(last_day_of_month(year, month));

    Date::from_calendar_date(year, month, day).expect("invalid date after adding months")
}

pub fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

fn first_of_month(year: i32, month: Month) -> Date {
    Date::from_calendar_date(year, month, 1).expect("invalid month start date")
}

fn week_bounds(date: Date) -> (Date, Date) {
    let weekday_number = date.weekday().number_from_monday() as i64;
    let start = date - Duration::days(weekday_number - 1);

    (start, start + Duration::days(6))
}

fn month_bounds(date: Date) -> (Date, Date) {
    let start = date - Duration::days(date.day() as i64 - 1);
    let end = start + Duration::days(last_day_of_month(date.year(), date.month()) as i64 - 1);

    (start, end)
}

#[cfg(test)]
mod tests {
    use time::{
        Duration, Month,
        macros::{date, datetime},
    };

    use super::{Granularity, Period, add_months, last_day_of_month, month_period, year_end};

    #[test]
    fn day_period_spans_midnight_to_end_of_day() {
        let period = Period::containing(Granularity::Day, datetime!(2025-06-18 14:30));

        assert_eq!(period.start, datetime!(2025-06-18 0:00));
        assert_eq!(period.end, datetime!(2025-06-18 23:59:59.999));
    }

    #[test]
    fn week_starts_on_monday_and_ends_on_sunday() {
        // 2025-06-18 is a Wednesday.
        let period = Period::containing(Granularity::Week, datetime!(2025-06-18 9:00));

        assert_eq!(period.start, datetime!(2025-06-16 0:00));
        assert_eq!(period.end, datetime!(2025-06-22 23:59:59.999));
    }

    #[test]
    fn sunday_belongs_to_the_week_before() {
        let period = Period::containing(Granularity::Week, datetime!(2025-06-22 23:00));

        assert_eq!(period.start, datetime!(2025-06-16 0:00));
    }

    #[test]
    fn month_handles_leap_february() {
        let leap = Period::containing(Granularity::Month, datetime!(2024-02-10 12:00));
        let common = Period::containing(Granularity::Month, datetime!(2025-02-10 12:00));

        assert_eq!(leap.end, datetime!(2024-02-29 23:59:59.999));
        assert_eq!(common.end, datetime!(2025-02-28 23:59:59.999));
    }

    #[test]
    fn previous_month_crosses_year_boundary() {
        let period = Period::previous(Granularity::Month, datetime!(2025-01-15 8:00));

        assert_eq!(period.start, datetime!(2024-12-01 0:00));
        assert_eq!(period.end, datetime!(2024-12-31 23:59:59.999));
    }

    #[test]
    fn previous_week_and_day() {
        let reference = datetime!(2025-06-16 0:00);

        let week = Period::previous(Granularity::Week, reference);
        let day = Period::previous(Granularity::Day, reference);

        assert_eq!(week.start, datetime!(2025-06-09 0:00));
        assert_eq!(week.end, datetime!(2025-06-15 23:59:59.999));
        assert_eq!(day.start, datetime!(2025-06-15 0:00));
    }

    #[test]
    fn pair_periods_are_adjacent() {
        let pair = Period::pair(Granularity::Month, datetime!(2025-03-31 23:59));

        assert_eq!(
            pair.previous.end + Duration::milliseconds(1),
            pair.current.start
        );
    }

    #[test]
    fn contains_includes_both_boundaries() {
        let period = month_period(2025, Month::April);

        assert!(period.contains(datetime!(2025-04-01 0:00)));
        assert!(period.contains(datetime!(2025-04-30 23:59:59.999)));
        assert!(!period.contains(datetime!(2025-05-01 0:00)));
        assert!(!period.contains(datetime!(2025-03-31 23:59:59.999)));
    }

    #[test]
    fn add_months_wraps_years_and_clamps_days() {
        assert_eq!(add_months(date!(2025-03-01), 1), date!(2025-04-01));
        assert_eq!(add_months(date!(2025-11-01), 3), date!(2026-02-01));
        assert_eq!(add_months(date!(2025-01-31), 1), date!(2025-02-28));
        assert_eq!(add_months(date!(2025-06-15), 12), date!(2026-06-15));
        assert_eq!(add_months(date!(2025-06-15), 0), date!(2025-06-15));
    }

    #[test]
    fn year_end_is_last_instant_of_december() {
        assert_eq!(year_end(2025), datetime!(2025-12-31 23:59:59.999));
    }

    #[test]
    fn last_day_of_month_follows_leap_rules() {
        assert_eq!(last_day_of_month(2000, Month::February), 29);
        assert_eq!(last_day_of_month(1900, Month::February), 28);
        assert_eq!(last_day_of_month(2025, Month::September), 30);
    }
}
