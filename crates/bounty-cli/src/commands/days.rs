//! Days command: counts days per weekday in an inclusive range.

use std::io::Write;

use anyhow::{Context, Result};
use bounty_core::{Weekday, count_days};
use chrono::NaiveDate;

use crate::Config;

/// Runs the days command.
pub fn run<W: Write>(
    writer: &mut W,
    config: &Config,
    from: NaiveDate,
    to: NaiveDate,
    json: bool,
) -> Result<()> {
    let counts = count_days(from, to).context("invalid day range")?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&counts)?)?;
        return Ok(());
    }

    writeln!(writer, "{from} to {to}: {} days", counts.days)?;
    for day in Weekday::ALL {
        writeln!(writer, "  {:<9}  {}", day.as_str(), counts.count(day))?;
    }
    writeln!(
        writer,
        "Off-days: {}",
        counts.off_days(&config.workdays)
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn days_command_counts_weekdays() {
        let mut output = Vec::new();
        run(
            &mut output,
            &Config::default(),
            date(2022, 4, 1),
            date(2022, 4, 30),
            false,
        )
        .unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        2022-04-01 to 2022-04-30: 30 days
          monday     4
          tuesday    4
          wednesday  4
          thursday   4
          friday     5
          saturday   5
          sunday     4
        Off-days: 9
        ");
    }

    #[test]
    fn days_command_json() {
        let mut output = Vec::new();
        run(
            &mut output,
            &Config::default(),
            date(2022, 1, 1),
            date(2022, 1, 1),
            true,
        )
        .unwrap();

        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "days": 1,
                "monday": 0,
                "tuesday": 0,
                "wednesday": 0,
                "thursday": 0,
                "friday": 0,
                "saturday": 1,
                "sunday": 0,
            })
        );
    }

    #[test]
    fn reversed_range_is_an_error() {
        let mut output = Vec::new();
        let err = run(
            &mut output,
            &Config::default(),
            date(2022, 2, 1),
            date(2022, 1, 1),
            false,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("\"from\" date cannot be later than \"to\" date"));
        assert!(output.is_empty());
    }
}
