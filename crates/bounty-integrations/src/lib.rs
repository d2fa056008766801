//! Work-hour sources for bounty.
//!
//! Each backend reports how many hours were registered in an inclusive date
//! range:
//! - [Harvest](harvest): paginated time entries
//! - [Clockify](clockify): the dashboard summary report
//! - [XLedger](xledger): GraphQL timesheets with cursor pagination

use std::time::Duration;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub mod clockify;
pub mod harvest;
pub mod xledger;

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Integration client errors.
#[derive(Debug, Error)]
pub enum IntegrationError {
    /// A required credential was missing or blank.
    #[error("invalid {field}: {reason}")]
    InvalidCredentials {
        field: &'static str,
        reason: &'static str,
    },
    /// An `entries_to_ignore` filter sets no field, so it would match everything.
    #[error("entries_to_ignore filters cannot be empty")]
    EmptyFilter,
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// API returned an error response.
    #[error("API error: {message}")]
    Api { message: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// A configured time-tracking backend.
#[derive(Debug)]
pub enum Integration {
    Harvest(harvest::Client),
    Clockify(clockify::Client),
    XLedger(xledger::Client),
}

impl Integration {
    /// Returns the lowercase backend name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Harvest(_) => "harvest",
            Self::Clockify(_) => "clockify",
            Self::XLedger(_) => "xledger",
        }
    }

    /// Total registered hours in `[from, to]`, ignored entries excluded.
    ///
    /// # Errors
    ///
    /// Returns an error if a request fails or the backend answers with
    /// something other than the expected payload.
    pub async fn work_hours(&self, from: NaiveDate, to: NaiveDate) -> Result<f64, IntegrationError> {
        tracing::debug!(integration = self.name(), %from, %to, "fetching work hours");
        let hours = match self {
            Self::Harvest(client) => client.work_hours(from, to).await?,
            Self::Clockify(client) => client.work_hours(from, to).await?,
            Self::XLedger(client) => client.work_hours(from, to).await?,
        };
        tracing::info!(integration = self.name(), hours, "fetched work hours");
        Ok(hours)
    }
}

/// Rejects empty and whitespace-only credentials.
fn require_credential(value: &str, field: &'static str) -> Result<(), IntegrationError> {
    if value.is_empty() {
        return Err(IntegrationError::InvalidCredentials {
            field,
            reason: "cannot be empty",
        });
    }
    if value.trim().is_empty() {
        return Err(IntegrationError::InvalidCredentials {
            field,
            reason: "cannot be whitespace-only",
        });
    }
    Ok(())
}

/// Rejects filter lists containing a filter with no fields.
fn require_filters<F>(filters: &[F], is_empty: impl Fn(&F) -> bool) -> Result<(), IntegrationError> {
    if filters.iter().any(is_empty) {
        return Err(IntegrationError::EmptyFilter);
    }
    Ok(())
}

fn http_client() -> Result<reqwest::Client, IntegrationError> {
    reqwest::Client::builder()
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .map_err(IntegrationError::ClientBuild)
}

/// Reads a response body, mapping non-success statuses to [`IntegrationError::Api`].
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, IntegrationError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(IntegrationError::Api {
            message: format!("status {status}: {body}"),
        });
    }
    parse_json(&body)
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, IntegrationError> {
    serde_json::from_str(body).map_err(|err| IntegrationError::InvalidResponse(err.to_string()))
}
