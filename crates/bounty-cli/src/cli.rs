//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Flex-time balance calculator.
///
/// Compares hours registered in a time-tracking backend with the hours
/// expected from your workdays and Norwegian public holidays.
#[derive(Debug, Parser)]
#[command(name = "bounty", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the flex balance from the configured reference point.
    Balance {
        /// Worked hours to use instead of asking the configured integration.
        #[arg(long)]
        hours: Option<f64>,

        /// Last day of the period (YYYY-MM-DD, default today).
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List public holidays in a date range (default: the current year).
    Holidays {
        /// First day of the range (YYYY-MM-DD).
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day of the range (YYYY-MM-DD).
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Count days and weekdays in an inclusive date range.
    Days {
        /// First day of the range (YYYY-MM-DD).
        #[arg(long)]
        from: NaiveDate,

        /// Last day of the range (YYYY-MM-DD).
        #[arg(long)]
        to: NaiveDate,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Write a template configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}
