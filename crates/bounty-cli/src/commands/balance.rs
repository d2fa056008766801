//! Balance command: flex balance from the configured reference point.

use std::io::Write;

use anyhow::{Context, Result};
use bounty_core::{BalanceBreakdown, calc_flex_breakdown, format_hhmm, today};
use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::Config;

/// Balance at `to`, with the calculation details when one was needed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceReport {
    pub reference_date: NaiveDate,
    pub reference_balance: f64,
    pub to: NaiveDate,
    pub balance: f64,
    pub balance_hhmm: String,
    /// `None` when `to` is the reference date itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<BalanceBreakdown>,
}

/// First day not yet covered by the reference balance.
///
/// Returns `None` when `to` is the reference date: nothing is left to count.
/// A reference date after `to` is returned unchanged so the balance engine
/// reports the reversed range.
pub fn effective_start(reference_date: NaiveDate, to: NaiveDate) -> Option<NaiveDate> {
    if reference_date == to {
        None
    } else if reference_date < to {
        reference_date.checked_add_days(Days::new(1))
    } else {
        Some(reference_date)
    }
}

/// Builds the report, asking `actual_hours` for the hours worked in the
/// remaining period.
pub fn compute(
    config: &Config,
    to: NaiveDate,
    actual_hours: impl FnOnce(NaiveDate, NaiveDate) -> Result<f64>,
) -> Result<BalanceReport> {
    let reference_date = config
        .reference_date
        .context("reference_date is not configured; run `bounty init` and edit the file")?;

    let Some(from) = effective_start(reference_date, to) else {
        tracing::info!(%reference_date, "reference date is the end of the period");
        return Ok(BalanceReport {
            reference_date,
            reference_balance: config.reference_balance,
            to,
            balance: config.reference_balance,
            balance_hhmm: format_hhmm(config.reference_balance),
            breakdown: None,
        });
    };

    let hours = if from <= to {
        actual_hours(from, to)?
    } else {
        0.0
    };
    let breakdown = calc_flex_breakdown(
        hours,
        from,
        config.reference_balance,
        &config.balance_options(to),
    )
    .context("failed to calculate flex balance")?;

    Ok(BalanceReport {
        reference_date,
        reference_balance: config.reference_balance,
        to,
        balance: breakdown.balance,
        balance_hhmm: format_hhmm(breakdown.balance),
        breakdown: Some(breakdown),
    })
}

/// Asks the configured integration for hours worked in `[from, to]`.
fn fetch_work_hours(config: &Config, from: NaiveDate, to: NaiveDate) -> Result<f64> {
    let integration = config
        .integration()
        .context("failed to create integration client")?;
    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    runtime
        .block_on(integration.work_hours(from, to))
        .with_context(|| format!("failed to fetch work hours from {}", integration.name()))
}

/// Runs the balance command.
pub fn run<W: Write>(
    writer: &mut W,
    config: &Config,
    hours: Option<f64>,
    to: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let to = to.unwrap_or_else(today);
    let report = compute(config, to, |from, to| match hours {
        Some(hours) => Ok(hours),
        None => fetch_work_hours(config, from, to),
    })?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        write_report(writer, &report)?;
    }
    Ok(())
}

fn write_report<W: Write>(writer: &mut W, report: &BalanceReport) -> Result<()> {
    writeln!(
        writer,
        "Reference: {}, balance {:.2} ({})",
        report.reference_date,
        report.reference_balance,
        format_hhmm(report.reference_balance)
    )?;
    if let Some(breakdown) = &report.breakdown {
        writeln!(
            writer,
            "Period:    {} to {} ({} days, {} off-days, {} holidays on workdays)",
            breakdown.from,
            breakdown.to,
            breakdown.day_count,
            breakdown.off_days,
            breakdown.holidays_on_workdays
        )?;
        writeln!(writer, "Worked:    {:.2} h", breakdown.actual_hours)?;
        writeln!(
            writer,
            "Expected:  {:.2} h ({} workdays, {:.2} h on holidays)",
            breakdown.expected_hours,
            breakdown.expected_worked_days,
            breakdown.expected_hours_from_holidays
        )?;
    }
    writeln!(
        writer,
        "Balance:   {:.2} ({})",
        report.balance, report.balance_hhmm
    )?;
    Ok(())
}
