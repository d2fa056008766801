//! Norwegian public holiday calendar.
//!
//! Holidays are either fixed calendar days or a fixed number of days away from
//! Easter Sunday. A year's holidays are computed on demand and never cached.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::dates::{DateRange, Offset, offset_date};
use crate::error::{Error, Result};
use crate::weekday::{Weekday, Workdays};

/// A named public holiday.
///
/// Declaration order is significant: it is the order in which holidays of a
/// single year are enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Holiday {
    PalmSunday,
    HolyWednesday,
    MaundyThursday,
    GoodFriday,
    EasterSunday,
    EasterMonday,
    AscensionDay,
    Whitsun,
    WhitMonday,
    NewYear,
    WorkersDay,
    IndependenceDay,
    ChristmasEve,
    ChristmasDay,
    BoxingDay,
    NewYearsEve,
}

/// How a holiday's date is derived for a given year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolidayRule {
    /// Days relative to Easter Sunday.
    EasterOffset(i64),
    /// The same month and day every year.
    Fixed { month: u32, day: u32 },
}

impl Holiday {
    pub const ALL: [Self; 16] = [
        Self::PalmSunday,
        Self::HolyWednesday,
        Self::MaundyThursday,
        Self::GoodFriday,
        Self::EasterSunday,
        Self::EasterMonday,
        Self::AscensionDay,
        Self::Whitsun,
        Self::WhitMonday,
        Self::NewYear,
        Self::WorkersDay,
        Self::IndependenceDay,
        Self::ChristmasEve,
        Self::ChristmasDay,
        Self::BoxingDay,
        Self::NewYearsEve,
    ];

    /// Identifier used in configuration files, e.g. `holyWednesday`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PalmSunday => "palmSunday",
            Self::HolyWednesday => "holyWednesday",
            Self::MaundyThursday => "maundyThursday",
            Self::GoodFriday => "goodFriday",
            Self::EasterSunday => "easterSunday",
            Self::EasterMonday => "easterMonday",
            Self::AscensionDay => "ascensionDay",
            Self::Whitsun => "whitsun",
            Self::WhitMonday => "whitMonday",
            Self::NewYear => "newYear",
            Self::WorkersDay => "workersDay",
            Self::IndependenceDay => "independenceDay",
            Self::ChristmasEve => "christmasEve",
            Self::ChristmasDay => "christmasDay",
            Self::BoxingDay => "boxingDay",
            Self::NewYearsEve => "newYearsEve",
        }
    }

    /// Human-readable English name.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::PalmSunday => "Palm Sunday",
            Self::HolyWednesday => "Holy Wednesday",
            Self::MaundyThursday => "Maundy Thursday",
            Self::GoodFriday => "Good Friday",
            Self::EasterSunday => "Easter Sunday",
            Self::EasterMonday => "Easter Monday",
            Self::AscensionDay => "Ascension Day",
            Self::Whitsun => "Whitsun",
            Self::WhitMonday => "Whit Monday",
            Self::NewYear => "New Year's Day",
            Self::WorkersDay => "Workers' Day",
            Self::IndependenceDay => "Independence Day",
            Self::ChristmasEve => "Christmas Eve",
            Self::ChristmasDay => "Christmas Day",
            Self::BoxingDay => "Boxing Day",
            Self::NewYearsEve => "New Year's Eve",
        }
    }

    #[must_use]
    pub const fn rule(&self) -> HolidayRule {
        match self {
            Self::PalmSunday => HolidayRule::EasterOffset(-7),
            Self::HolyWednesday => HolidayRule::EasterOffset(-4),
            Self::MaundyThursday => HolidayRule::EasterOffset(-3),
            Self::GoodFriday => HolidayRule::EasterOffset(-2),
            Self::EasterSunday => HolidayRule::EasterOffset(0),
            Self::EasterMonday => HolidayRule::EasterOffset(1),
            Self::AscensionDay => HolidayRule::EasterOffset(39),
            Self::Whitsun => HolidayRule::EasterOffset(49),
            Self::WhitMonday => HolidayRule::EasterOffset(50),
            Self::NewYear => HolidayRule::Fixed { month: 1, day: 1 },
            Self::WorkersDay => HolidayRule::Fixed { month: 5, day: 1 },
            Self::IndependenceDay => HolidayRule::Fixed { month: 5, day: 17 },
            Self::ChristmasEve => HolidayRule::Fixed { month: 12, day: 24 },
            Self::ChristmasDay => HolidayRule::Fixed { month: 12, day: 25 },
            Self::BoxingDay => HolidayRule::Fixed { month: 12, day: 26 },
            Self::NewYearsEve => HolidayRule::Fixed { month: 12, day: 31 },
        }
    }
}

impl fmt::Display for Holiday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names match case-insensitively, so keys lowercased by environment
/// providers (`christmaseve`) still resolve.
impl FromStr for Holiday {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|holiday| holiday.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownHolidayName(s.to_string()))
    }
}

impl Serialize for Holiday {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Holiday {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A holiday occurring on a specific date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HolidayDate {
    pub name: Holiday,
    pub date: NaiveDate,
}

impl HolidayDate {
    pub fn weekday(&self) -> Weekday {
        Weekday::from(self.date.weekday())
    }
}

/// Gregorian Easter Sunday of `year` (anonymous Gregorian algorithm).
pub fn easter_sunday(year: i32) -> Result<NaiveDate> {
    let y = i64::from(year);
    let g = y.rem_euclid(19);
    let c = y.div_euclid(100);
    let h = (c - c.div_euclid(4) - (8 * c + 13).div_euclid(25) + 19 * g + 15).rem_euclid(30);
    let i = h - (h / 28) * (1 - (h / 28) * (29 / (h + 1)) * ((21 - g) / 11));
    let j = (y + y.div_euclid(4) + i + 2 - c + c.div_euclid(4)).rem_euclid(7);
    let p = i - j;
    let day = 1 + (p + 27 + (p + 6).div_euclid(40)).rem_euclid(31);
    let month = 3 + (p + 26).div_euclid(30);

    u32::try_from(month)
        .ok()
        .zip(u32::try_from(day).ok())
        .and_then(|(month, day)| NaiveDate::from_ymd_opt(year, month, day))
        .ok_or_else(|| Error::invalid_input(format!("year {year} is outside the supported calendar")))
}

/// The Easter-relative holidays of `year`.
pub fn easter_related_holidays(year: i32) -> Result<BTreeMap<Holiday, NaiveDate>> {
    let easter = easter_sunday(year)?;
    Holiday::ALL
        .into_iter()
        .filter_map(|holiday| match holiday.rule() {
            HolidayRule::EasterOffset(days) => Some((holiday, days)),
            HolidayRule::Fixed { .. } => None,
        })
        .map(|(holiday, days)| {
            offset_date(easter, Offset::days(days)).map(|date| (holiday, date))
        })
        .collect()
}

/// The fixed-date holidays of `year`.
pub fn fixed_holidays(year: i32) -> Result<BTreeMap<Holiday, NaiveDate>> {
    Holiday::ALL
        .into_iter()
        .filter_map(|holiday| match holiday.rule() {
            HolidayRule::Fixed { month, day } => Some((holiday, month, day)),
            HolidayRule::EasterOffset(_) => None,
        })
        .map(|(holiday, month, day)| {
            NaiveDate::from_ymd_opt(year, month, day)
                .map(|date| (holiday, date))
                .ok_or_else(|| {
                    Error::invalid_input(format!("year {year} is outside the supported calendar"))
                })
        })
        .collect()
}

/// Every holiday of `year`, keyed by name in declaration order.
pub fn holidays_for_year(year: i32) -> Result<BTreeMap<Holiday, NaiveDate>> {
    let mut holidays = easter_related_holidays(year)?;
    holidays.extend(fixed_holidays(year)?);
    Ok(holidays)
}

/// Lazily enumerates the holidays in an inclusive date range.
///
/// Holidays come out year by year, and within a year in [`Holiday`]
/// declaration order (which is not chronological). To restart, call
/// [`holidays_in_range`] again.
#[derive(Debug, Clone)]
pub struct HolidaysInRange {
    range: DateRange,
    next_year: i32,
    pending: std::vec::IntoIter<HolidayDate>,
}

impl Iterator for HolidaysInRange {
    type Item = HolidayDate;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(holiday) = self.pending.next() {
                if self.range.contains(holiday.date) {
                    return Some(holiday);
                }
                continue;
            }

            if self.next_year > self.range.end().year() {
                return None;
            }
            let year = self.next_year;
            self.next_year += 1;
            // Boundary years were checked in `holidays_in_range`.
            let holidays = dated_holidays_for_year(year);
            debug_assert!(holidays.is_ok(), "no holiday calendar for {year}");
            self.pending = holidays.ok()?.into_iter();
        }
    }
}

fn dated_holidays_for_year(year: i32) -> Result<Vec<HolidayDate>> {
    Ok(holidays_for_year(year)?
        .into_iter()
        .map(|(name, date)| HolidayDate { name, date })
        .collect())
}

/// Holidays falling within `[from, to]`, possibly spanning several years.
///
/// A holiday calendar can only be missing at the limits of the supported
/// calendar, so the first and last years are computed up front and any
/// failure is returned here rather than from the iterator.
pub fn holidays_in_range(from: NaiveDate, to: NaiveDate) -> Result<HolidaysInRange> {
    let range = DateRange::new(from, to)?;
    let pending = dated_holidays_for_year(from.year())?;
    if to.year() != from.year() {
        holidays_for_year(to.year())?;
    }
    Ok(HolidaysInRange {
        range,
        next_year: from.year() + 1,
        pending: pending.into_iter(),
    })
}

/// Holiday occurrences that land on a workday.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HolidayCounts {
    /// Total holiday occurrences on a workday.
    pub on_workdays: i64,
    /// Occurrences per holiday, only counting those on a workday.
    pub per_holiday: BTreeMap<Holiday, i64>,
}

/// Consumes `holidays`, counting only those whose weekday is in `workdays`.
pub fn group_holidays_by_weekday(
    holidays: impl IntoIterator<Item = HolidayDate>,
    workdays: &Workdays,
) -> HolidayCounts {
    let mut counts = HolidayCounts::default();
    for holiday in holidays {
        if workdays.contains(holiday.weekday()) {
            counts.on_workdays += 1;
            *counts.per_holiday.entry(holiday.name).or_insert(0) += 1;
        }
    }
    counts
}
