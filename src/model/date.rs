//! Date — a calendar day in UTC, stored as (year, day of year).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A day in UTC: the year of the Common Era plus the day within that year.
///
/// Ordering is by `(year, year_day)`. The zero value (`year == 0`,
/// `year_day == 0`) is not a real day; it stands for "no date".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Date {
    year: i32,
    year_day: u16,
}

impl Date {
    /// Build a date from a year, month, and day of month.
    ///
    /// Out-of-range months and days roll over the way a calendar does:
    /// month 13 of 2023 is January 2024, day 0 is the last day of the
    /// previous month, and so on. Results outside the range `chrono` can
    /// represent saturate to its first or last day.
    pub fn from_ymd(year: i32, month: i32, day: i32) -> Date {
        let naive = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or(year < 0)
            .and_then(|d| shift_months(d, i64::from(month) - 1).ok_or(month < 1))
            .and_then(|d| shift_days(d, i64::from(day) - 1).ok_or(day < 1))
            .unwrap_or_else(|before| if before { NaiveDate::MIN } else { NaiveDate::MAX });
        Self::from_naive(naive)
    }

    /// The UTC day that `t` falls on.
    pub fn of<Tz: TimeZone>(t: &DateTime<Tz>) -> Date {
        Self::from_naive(t.with_timezone(&Utc).date_naive())
    }

    /// Today, in UTC.
    pub fn now() -> Date {
        Self::of(&Utc::now())
    }

    /// Midnight UTC at the start of this day. `None` for the zero date.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        self.to_naive()?.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Day within the year: 1..=365, or 1..=366 in leap years.
    pub fn year_day(&self) -> u16 {
        self.year_day
    }

    pub fn is_zero(&self) -> bool {
        self.year == 0 && self.year_day == 0
    }

    fn from_naive(naive: NaiveDate) -> Date {
        Date {
            year: naive.year(),
            year_day: naive.ordinal() as u16,
        }
    }

    fn to_naive(self) -> Option<NaiveDate> {
        NaiveDate::from_yo_opt(self.year, u32::from(self.year_day))
    }
}

fn shift_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let n = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months < 0 { date.checked_sub_months(n) } else { date.checked_add_months(n) }
}

fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    let n = Days::new(days.unsigned_abs());
    if days < 0 { date.checked_sub_days(n) } else { date.checked_add_days(n) }
}

// ============================================================================
// Text form: <year>-<day of year, 3 digits>
// ============================================================================

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:03}", self.year, self.year_day)
    }
}

/// Only the canonical form parses: no sign on positive years, no leading
/// zeros beyond the three day digits.
impl FromStr for Date {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidItem(format!("date {s:?}"));
        let (year, day) = s.rsplit_once('-').ok_or_else(invalid)?;
        let date = Date {
            year: year.parse().map_err(|_| invalid())?,
            year_day: day.parse().map_err(|_| invalid())?,
        };
        if date.to_string() != s {
            return Err(invalid());
        }
        if !date.is_zero() && date.to_naive().is_none() {
            return Err(invalid());
        }
        Ok(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_ymd_normalizes() {
        let cases: &[((i32, i32, i32), (i32, u16))] = &[
            ((1, 1, 1), (1, 1)),
            ((0, 0, 0), (-1, 334)),
            ((2023, 3, 12), (2023, 71)),
            ((2023, 1, 71), (2023, 71)),
            ((2022, 2, 405), (2023, 71)),
            ((2023, 12, 31), (2023, 365)),
            ((2023, 13, 0), (2023, 365)),
            ((2023, 12, 32), (2024, 1)),
            ((2020, 12, 31), (2020, 366)),
            ((2020, 13, 0), (2020, 366)),
            ((2020, 12, 32), (2021, 1)),
        ];
        for &((y, m, d), (year, year_day)) in cases {
            let date = Date::from_ymd(y, m, d);
            assert_eq!((date.year(), date.year_day()), (year, year_day), "from_ymd({y}, {m}, {d})");
        }
    }

    #[test]
    fn test_of_uses_utc() {
        let tz = chrono::FixedOffset::east_opt(9 * 3600).unwrap();
        let t = tz.with_ymd_and_hms(2023, 3, 13, 5, 0, 0).unwrap();
        assert_eq!(Date::of(&t), Date::from_ymd(2023, 3, 12));
    }

    #[test]
    fn test_to_datetime_is_midnight_utc() {
        let date = Date::from_ymd(2023, 3, 12);
        let t = date.to_datetime().unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2023, 3, 12, 0, 0, 0).unwrap());
        assert_eq!(Date::of(&t), date);
        assert_eq!(Date::default().to_datetime(), None);
    }

    #[test]
    fn test_ordering() {
        let a = Date::from_ymd(2022, 12, 31);
        let b = Date::from_ymd(2023, 1, 1);
        let c = Date::from_ymd(2023, 1, 2);
        assert!(a < b && b < c);
        assert_eq!(b.cmp(&b), std::cmp::Ordering::Equal);
        assert!(Date::default().is_zero());
        assert!(!b.is_zero());
    }

    #[test]
    fn test_display_and_parse() {
        let date = Date::from_ymd(2023, 3, 12);
        assert_eq!(date.to_string(), "2023-071");
        assert_eq!("2023-071".parse::<Date>().unwrap(), date);
        assert_eq!(Date::from_ymd(0, 0, 0).to_string(), "-1-334");
        assert_eq!("-1-334".parse::<Date>().unwrap(), Date::from_ymd(0, 0, 0));
        assert_eq!("0-000".parse::<Date>().unwrap(), Date::default());

        for bad in [
            "", "2023", "2023-71", "2023-366", "2024-367", "2023-000", "x-001", "+2023-071",
            "02023-071", "2023-0071", "-0-000",
        ] {
            assert!(bad.parse::<Date>().is_err(), "{bad:?} should not parse");
        }
        assert!("2024-366".parse::<Date>().is_ok());
    }

    #[test]
    fn test_from_ymd_saturates() {
        assert_eq!(Date::from_ymd(i32::MAX, 1, 1), Date::from_naive(NaiveDate::MAX));
        assert_eq!(Date::from_ymd(2023, 1, i32::MIN), Date::from_naive(NaiveDate::MIN));
        assert_eq!(Date::from_ymd(2023, i32::MAX, 1), Date::from_naive(NaiveDate::MAX));
    }
}
