//! Holidays command: lists public holidays in a date range.

use std::io::Write;

use anyhow::{Context, Result};
use bounty_core::{Holiday, Weekday, holidays_in_range, today};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::Config;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct HolidayRow {
    name: Holiday,
    label: &'static str,
    date: NaiveDate,
    weekday: Weekday,
    on_workday: bool,
}

/// The calendar year containing `date`.
fn year_of(date: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
    let year = date.year();
    let start = NaiveDate::from_ymd_opt(year, 1, 1).context("year out of range")?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31).context("year out of range")?;
    Ok((start, end))
}

/// Runs the holidays command.
///
/// Missing bounds default to the calendar year of the other bound, or of
/// today when neither is given.
pub fn run<W: Write>(
    writer: &mut W,
    config: &Config,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let (year_start, year_end) = year_of(from.or(to).unwrap_or_else(today))?;
    let from = from.unwrap_or(year_start);
    let to = to.unwrap_or(year_end);

    let mut rows: Vec<HolidayRow> = holidays_in_range(from, to)
        .context("invalid holiday range")?
        .map(|holiday| HolidayRow {
            name: holiday.name,
            label: holiday.name.label(),
            date: holiday.date,
            weekday: holiday.weekday(),
            on_workday: config.workdays.contains(holiday.weekday()),
        })
        .collect();
    rows.sort_by_key(|row| row.date);
    tracing::debug!(%from, %to, count = rows.len(), "listed holidays");

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&rows)?)?;
        return Ok(());
    }

    if rows.is_empty() {
        writeln!(writer, "No holidays between {from} and {to}.")?;
        return Ok(());
    }

    writeln!(writer, "Holidays {from} to {to}:")?;
    for row in &rows {
        let marker = if row.on_workday { "workday" } else { "" };
        let line = format!(
            "{}  {:<9}  {:<16}  {marker}",
            row.date,
            row.weekday.as_str(),
            row.label
        );
        writeln!(writer, "{}", line.trim_end())?;
    }
    let on_workdays = rows.iter().filter(|row| row.on_workday).count();
    writeln!(writer, "{} holidays, {on_workdays} on workdays", rows.len())?;
    Ok(())
}
