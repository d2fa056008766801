//! Error taxonomy for the balance core.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by calendar arithmetic, the holiday calendar and the
/// balance engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The lower bound of a date range is later than the upper bound.
    #[error("\"{from_alias}\" date cannot be later than \"{to_alias}\" date")]
    InvalidRange {
        from: NaiveDate,
        to: NaiveDate,
        from_alias: &'static str,
        to_alias: &'static str,
    },

    /// An argument could not be interpreted.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// A holiday name outside the known calendar.
    #[error("unknown holiday name: {0}")]
    UnknownHolidayName(String),

    /// Applying an offset left the representable date range.
    #[error("date offset out of range")]
    OffsetOutOfRange,
}

impl Error {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
