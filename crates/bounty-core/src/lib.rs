//! Core domain logic for bounty.
//!
//! This crate contains the pure flex-time computations:
//! - Calendar arithmetic: date offsets and per-weekday day counts
//! - Holiday calendar: Norwegian public holidays derived from Easter Sunday
//! - Balance engine: worked vs. expected hours from a reference point

pub mod balance;
pub mod dates;
pub mod duration;
mod error;
pub mod holidays;
pub mod weekday;

pub use balance::{
    BalanceBreakdown, DEFAULT_HOURS_ON_HOLIDAYS, DEFAULT_HOURS_ON_WORKDAYS, FlexBalanceOptions,
    calc_flex_balance, calc_flex_breakdown,
};
pub use dates::{
    DateRange, DayCounts, Offset, RangeAliases, count_days, count_days_by_iteration, is_between,
    offset_date, offset_datetime, today, validate_range, validate_range_with,
};
pub use duration::{IsoDuration, format_hhmm, parse_hhmm, parse_iso_duration};
pub use error::{Error, Result};
pub use holidays::{
    Holiday, HolidayCounts, HolidayDate, HolidayRule, HolidaysInRange, easter_related_holidays,
    easter_sunday, fixed_holidays, group_holidays_by_weekday, holidays_for_year,
    holidays_in_range,
};
pub use weekday::{Weekday, Workdays, complement_weekdays};
