//! Flex balance calculation.
//!
//! # Formula
//!
//! For the inclusive range `[reference_date, to]`:
//!
//! 1. Count every day and the occurrences of each weekday.
//! 2. Count holidays that land on a workday, per holiday name.
//! 3. Expected worked days = days − off-days − holidays on workdays.
//! 4. Expected hours = expected worked days × hours on workdays
//!    + Σ per holiday name (override or default holiday hours) × occurrences.
//! 5. Balance = actual hours − expected hours + reference balance.
//!
//! A holiday on an off-day contributes nothing: it is already removed as an
//! off-day and is never counted as a holiday.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::dates::{RangeAliases, count_days, today, validate_range_with};
use crate::error::Result;
use crate::holidays::{Holiday, HolidayDate, group_holidays_by_weekday, holidays_in_range};
use crate::weekday::Workdays;

/// Expected hours on a regular workday unless configured otherwise.
pub const DEFAULT_HOURS_ON_WORKDAYS: f64 = 7.5;

/// Expected hours on a holiday that falls on a workday unless configured
/// otherwise.
pub const DEFAULT_HOURS_ON_HOLIDAYS: f64 = 7.5;

/// Optional inputs to [`calc_flex_balance`].
///
/// Unset values are resolved once at the start of a calculation: `to`
/// becomes today and `holidays` becomes the Norwegian holidays in the range.
#[derive(Debug, Clone)]
pub struct FlexBalanceOptions {
    pub to: Option<NaiveDate>,
    pub workdays: Workdays,
    pub holidays: Option<Vec<HolidayDate>>,
    pub hours_on_workdays: f64,
    pub hours_on_holidays: f64,
    /// Per-holiday overrides of `hours_on_holidays`. Holidays that never occur
    /// in the range are ignored.
    pub hours_on_specific_holidays: BTreeMap<Holiday, f64>,
}

impl Default for FlexBalanceOptions {
    fn default() -> Self {
        Self {
            to: None,
            workdays: Workdays::default(),
            holidays: None,
            hours_on_workdays: DEFAULT_HOURS_ON_WORKDAYS,
            hours_on_holidays: DEFAULT_HOURS_ON_HOLIDAYS,
            hours_on_specific_holidays: BTreeMap::new(),
        }
    }
}

impl FlexBalanceOptions {
    #[must_use]
    pub fn with_to(mut self, to: NaiveDate) -> Self {
        self.to = Some(to);
        self
    }

    #[must_use]
    pub fn with_workdays(mut self, workdays: Workdays) -> Self {
        self.workdays = workdays;
        self
    }

    #[must_use]
    pub fn with_holidays(mut self, holidays: impl IntoIterator<Item = HolidayDate>) -> Self {
        self.holidays = Some(holidays.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_hours_on_workdays(mut self, hours: f64) -> Self {
        self.hours_on_workdays = hours;
        self
    }

    #[must_use]
    pub fn with_hours_on_holidays(mut self, hours: f64) -> Self {
        self.hours_on_holidays = hours;
        self
    }

    #[must_use]
    pub fn with_hours_on_holiday(mut self, holiday: Holiday, hours: f64) -> Self {
        self.hours_on_specific_holidays.insert(holiday, hours);
        self
    }
}

/// Every intermediate of a balance calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceBreakdown {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub day_count: i64,
    pub off_days: i64,
    pub holidays_on_workdays: i64,
    pub expected_worked_days: i64,
    pub expected_hours_from_holidays: f64,
    pub expected_hours: f64,
    pub actual_hours: f64,
    pub reference_balance: f64,
    pub balance: f64,
}

/// Computes the flex balance at `options.to` (default today).
pub fn calc_flex_balance(
    actual_hours: f64,
    reference_date: NaiveDate,
    reference_balance: f64,
    options: &FlexBalanceOptions,
) -> Result<f64> {
    calc_flex_breakdown(actual_hours, reference_date, reference_balance, options)
        .map(|breakdown| breakdown.balance)
}

/// Like [`calc_flex_balance`], returning every intermediate value.
pub fn calc_flex_breakdown(
    actual_hours: f64,
    reference_date: NaiveDate,
    reference_balance: f64,
    options: &FlexBalanceOptions,
) -> Result<BalanceBreakdown> {
    let to = options.to.unwrap_or_else(today);
    validate_range_with(
        reference_date,
        to,
        RangeAliases {
            from: "referenceDate",
            ..RangeAliases::default()
        },
    )?;

    let day_counts = count_days(reference_date, to)?;
    let holiday_counts = match &options.holidays {
        Some(holidays) => group_holidays_by_weekday(holidays.iter().copied(), &options.workdays),
        None => group_holidays_by_weekday(holidays_in_range(reference_date, to)?, &options.workdays),
    };
    let off_days = day_counts.off_days(&options.workdays);

    let expected_hours_from_holidays = expected_hours_from_holidays(
        &holiday_counts.per_holiday,
        options.hours_on_holidays,
        &options.hours_on_specific_holidays,
    );
    let expected_worked_days = day_counts.days - off_days - holiday_counts.on_workdays;
    let expected_hours =
        expected_worked_days as f64 * options.hours_on_workdays + expected_hours_from_holidays;
    let balance = actual_hours - expected_hours + reference_balance;

    tracing::debug!(
        %reference_date,
        %to,
        day_count = day_counts.days,
        off_days,
        holidays_on_workdays = holiday_counts.on_workdays,
        expected_hours,
        balance,
        "computed flex balance"
    );

    Ok(BalanceBreakdown {
        from: reference_date,
        to,
        day_count: day_counts.days,
        off_days,
        holidays_on_workdays: holiday_counts.on_workdays,
        expected_worked_days,
        expected_hours_from_holidays,
        expected_hours,
        actual_hours,
        reference_balance,
        balance,
    })
}

fn expected_hours_from_holidays(
    per_holiday: &BTreeMap<Holiday, i64>,
    hours_on_holidays: f64,
    hours_on_specific_holidays: &BTreeMap<Holiday, f64>,
) -> f64 {
    per_holiday
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(holiday, count)| {
            let rate = hours_on_specific_holidays
                .get(holiday)
                .copied()
                .unwrap_or(hours_on_holidays);
            rate * *count as f64
        })
        .sum()
}
