//! Calendar arithmetic over timezone-naive dates.
//!
//! Every operation here treats a date as "start of that calendar day". Ranges
//! are inclusive on both ends and are validated before use: a range whose
//! lower bound is later than its upper bound is an error, never clamped.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::weekday::{Weekday, Workdays};

/// Field-wise calendar offset.
///
/// Each field is added to the matching component of a date before the date is
/// re-normalised, so overflowing a month rolls into the next one (January 31
/// plus one month lands on March 3 in a non-leap year). Negative values move
/// backwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Offset {
    pub years: i32,
    pub months: i32,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub milliseconds: i64,
}

impl Offset {
    pub const ZERO: Self = Self {
        years: 0,
        months: 0,
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
        milliseconds: 0,
    };

    #[must_use]
    pub const fn days(days: i64) -> Self {
        Self { days, ..Self::ZERO }
    }

    #[must_use]
    pub const fn months(months: i32) -> Self {
        Self { months, ..Self::ZERO }
    }

    #[must_use]
    pub const fn years(years: i32) -> Self {
        Self { years, ..Self::ZERO }
    }
}

/// Applies `offset` to a date-time, returning a new value.
pub fn offset_datetime(datetime: NaiveDateTime, offset: Offset) -> Result<NaiveDateTime> {
    let month0 = i64::from(datetime.month0()) + i64::from(offset.months);
    let year = i64::from(datetime.year()) + i64::from(offset.years) + month0.div_euclid(12);
    let year = i32::try_from(year).map_err(|_| Error::OffsetOutOfRange)?;
    let month = u32::try_from(month0.rem_euclid(12) + 1).map_err(|_| Error::OffsetOutOfRange)?;
    let first_of_month = NaiveDate::from_ymd_opt(year, month, 1).ok_or(Error::OffsetOutOfRange)?;

    let parts = [
        i64::from(datetime.day0())
            .checked_add(offset.days)
            .and_then(TimeDelta::try_days),
        TimeDelta::try_hours(offset.hours),
        TimeDelta::try_minutes(offset.minutes),
        TimeDelta::try_seconds(offset.seconds),
        TimeDelta::try_milliseconds(offset.milliseconds),
    ];
    let elapsed = parts
        .into_iter()
        .try_fold(datetime.time() - NaiveTime::MIN, |acc, part| {
            part.and_then(|part| acc.checked_add(&part))
        })
        .ok_or(Error::OffsetOutOfRange)?;

    first_of_month
        .and_time(NaiveTime::MIN)
        .checked_add_signed(elapsed)
        .ok_or(Error::OffsetOutOfRange)
}

/// Applies `offset` to a calendar date.
///
/// Sub-day fields only matter when they add up to whole days; the result is
/// always the start of a day.
pub fn offset_date(date: NaiveDate, offset: Offset) -> Result<NaiveDate> {
    offset_datetime(date.and_time(NaiveTime::MIN), offset).map(|datetime| datetime.date())
}

/// Today's local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Names used for the bounds of a range in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeAliases {
    pub from: &'static str,
    pub to: &'static str,
}

impl Default for RangeAliases {
    fn default() -> Self {
        Self {
            from: "from",
            to: "to",
        }
    }
}

/// Fails with [`Error::InvalidRange`] when `from` is later than `to`.
pub fn validate_range(from: NaiveDate, to: NaiveDate) -> Result<()> {
    validate_range_with(from, to, RangeAliases::default())
}

/// Like [`validate_range`], naming the bounds with `aliases` in the error.
pub fn validate_range_with(from: NaiveDate, to: NaiveDate, aliases: RangeAliases) -> Result<()> {
    if from > to {
        return Err(Error::InvalidRange {
            from,
            to,
            from_alias: aliases.from,
            to_alias: aliases.to,
        });
    }
    Ok(())
}

/// Whether `from <= date <= to`. The range itself is validated first.
pub fn is_between(date: NaiveDate, from: NaiveDate, to: NaiveDate) -> Result<bool> {
    validate_range(from, to)?;
    Ok(from <= date && date <= to)
}

/// An inclusive, validated date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        validate_range(from, to)?;
        Ok(Self { from, to })
    }

    pub const fn start(&self) -> NaiveDate {
        self.from
    }

    pub const fn end(&self) -> NaiveDate {
        self.to
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    pub fn count_days(&self) -> DayCounts {
        closed_form_counts(self.from, self.to)
    }
}

/// Total days in a range and the occurrences of each weekday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DayCounts {
    pub days: i64,
    pub monday: i64,
    pub tuesday: i64,
    pub wednesday: i64,
    pub thursday: i64,
    pub friday: i64,
    pub saturday: i64,
    pub sunday: i64,
}

impl DayCounts {
    /// Occurrences of `day`.
    pub const fn count(&self, day: Weekday) -> i64 {
        match day {
            Weekday::Monday => self.monday,
            Weekday::Tuesday => self.tuesday,
            Weekday::Wednesday => self.wednesday,
            Weekday::Thursday => self.thursday,
            Weekday::Friday => self.friday,
            Weekday::Saturday => self.saturday,
            Weekday::Sunday => self.sunday,
        }
    }

    fn count_mut(&mut self, day: Weekday) -> &mut i64 {
        match day {
            Weekday::Monday => &mut self.monday,
            Weekday::Tuesday => &mut self.tuesday,
            Weekday::Wednesday => &mut self.wednesday,
            Weekday::Thursday => &mut self.thursday,
            Weekday::Friday => &mut self.friday,
            Weekday::Saturday => &mut self.saturday,
            Weekday::Sunday => &mut self.sunday,
        }
    }

    /// Days that fall on a weekday outside `workdays`.
    pub fn off_days(&self, workdays: &Workdays) -> i64 {
        workdays
            .complement()
            .into_iter()
            .map(|day| self.count(day))
            .sum()
    }
}

/// Counts the days in the inclusive range `[from, to]`, per weekday, without
/// walking the range.
pub fn count_days(from: NaiveDate, to: NaiveDate) -> Result<DayCounts> {
    validate_range(from, to)?;
    Ok(closed_form_counts(from, to))
}

fn closed_form_counts(from: NaiveDate, to: NaiveDate) -> DayCounts {
    let days = 1 + (to - from).num_days();
    let from_day = i64::from(from.weekday().num_days_from_sunday());
    // Shift of each weekday relative to Monday in a Monday-first week.
    let occurrences = |shift: i64| (days + (from_day + shift) % 7).div_euclid(7);

    DayCounts {
        days,
        monday: occurrences(5),
        tuesday: occurrences(4),
        wednesday: occurrences(3),
        thursday: occurrences(2),
        friday: occurrences(1),
        saturday: occurrences(0),
        sunday: occurrences(6),
    }
}

/// Day-by-day version of [`count_days`], kept as a reference to check the
/// closed form against.
pub fn count_days_by_iteration(from: NaiveDate, to: NaiveDate) -> Result<DayCounts> {
    validate_range(from, to)?;
    let mut counts = DayCounts::default();
    for date in from.iter_days().take_while(|date| *date <= to) {
        *counts.count_mut(Weekday::from(date.weekday())) += 1;
        counts.days += 1;
    }
    Ok(counts)
}
