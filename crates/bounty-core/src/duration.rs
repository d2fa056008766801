//! Hour and duration string helpers.
//!
//! Time-tracking backends report totals as ISO 8601 durations
//! (`PT7H30M`) or `HH:MM` strings; balances are displayed as `HH:MM`.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

static ISO_DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:(\d+)Y)?(?:(\d+)M)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
        .unwrap()
});

static HHMM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(-)?(\d+):(\d+)$").unwrap());

/// Components of an ISO 8601 duration such as `P3Y6M4DT12H30M5S`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IsoDuration {
    pub years: u64,
    pub months: u64,
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl IsoDuration {
    /// Converts a duration without calendar components to hours.
    ///
    /// Years and months have no fixed length, so they are rejected.
    pub fn subset_to_hours(&self) -> Result<f64> {
        if self.years != 0 || self.months != 0 {
            return Err(Error::invalid_input(
                "years and months are not supported in hour durations",
            ));
        }
        Ok(self.days as f64 * 24.0
            + self.hours as f64
            + self.minutes as f64 / 60.0
            + self.seconds as f64 / 3600.0)
    }
}

/// Parses an ISO 8601 duration string into its components.
pub fn parse_iso_duration(s: &str) -> Result<IsoDuration> {
    let caps = ISO_DURATION_RE
        .captures(s.trim())
        .ok_or_else(|| Error::invalid_input(format!("invalid ISO duration string: {s}")))?;

    let field = |index: usize| -> Result<u64> {
        caps.get(index).map_or(Ok(0), |m| {
            m.as_str()
                .parse()
                .map_err(|_| Error::invalid_input(format!("duration component too large: {s}")))
        })
    };

    Ok(IsoDuration {
        years: field(1)?,
        months: field(2)?,
        days: field(3)?,
        hours: field(4)?,
        minutes: field(5)?,
        seconds: field(6)?,
    })
}

/// Parses `HH:MM` (hours may exceed 24) into fractional hours. A leading `-`
/// negates the value, so `format_hhmm` output parses back.
pub fn parse_hhmm(s: &str) -> Result<f64> {
    let caps = HHMM_RE
        .captures(s.trim())
        .ok_or_else(|| Error::invalid_input(format!("invalid HH:MM string: {s}")))?;
    let hours: f64 = caps[2]
        .parse()
        .map_err(|_| Error::invalid_input(format!("invalid HH:MM string: {s}")))?;
    let minutes: f64 = caps[3]
        .parse()
        .map_err(|_| Error::invalid_input(format!("invalid HH:MM string: {s}")))?;
    let value = hours + minutes / 60.0;
    Ok(if caps.get(1).is_some() { -value } else { value })
}

/// Formats fractional hours as `HH:MM`, rounding to the nearest minute.
///
/// Negative values get a leading `-`: `-1.5` becomes `-01:30`.
#[expect(
    clippy::cast_possible_truncation,
    reason = "balances are far below i64::MAX minutes"
)]
pub fn format_hhmm(hours: f64) -> String {
    let total_minutes = (hours.abs() * 60.0).round() as i64;
    let sign = if hours < 0.0 && total_minutes > 0 { "-" } else { "" };
    format!("{sign}{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}
