//! Clockify dashboard summary.
//!
//! The dashboard report returns the total tracked time and a per-project
//! breakdown, both as ISO 8601 durations. Ignored projects are subtracted from
//! the total.

use std::collections::BTreeMap;
use std::fmt;

use bounty_core::parse_iso_duration;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{IntegrationError, http_client, read_json, require_credential, require_filters};

const API_URL: &str = "https://global.api.clockify.me";

/// Projects matching a filter are subtracted from the total.
///
/// A filter matches when every field it sets equals the project's value.
/// Filters must set at least one field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FilterFields")]
pub struct EntryFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FilterFields {
    #[serde(default)]
    project_name: Option<String>,
    #[serde(default)]
    client_name: Option<String>,
    #[serde(default)]
    label: Option<String>,
}

impl TryFrom<FilterFields> for EntryFilter {
    type Error = IntegrationError;

    fn try_from(fields: FilterFields) -> Result<Self, Self::Error> {
        let filter = Self {
            project_name: fields.project_name,
            client_name: fields.client_name,
            label: fields.label,
        };
        if filter.is_empty() {
            return Err(IntegrationError::EmptyFilter);
        }
        Ok(filter)
    }
}

impl EntryFilter {
    pub const fn is_empty(&self) -> bool {
        self.project_name.is_none() && self.client_name.is_none() && self.label.is_none()
    }

    pub fn matches(&self, project: &ProjectTotal) -> bool {
        field_matches(self.project_name.as_deref(), project.project_name.as_deref())
            && field_matches(self.client_name.as_deref(), project.client_name.as_deref())
            && field_matches(self.label.as_deref(), project.label.as_deref())
    }
}

fn field_matches(wanted: Option<&str>, actual: Option<&str>) -> bool {
    wanted.is_none_or(|wanted| actual == Some(wanted))
}

/// Returns true when any filter matches the project.
pub fn apply_filters(filters: &[EntryFilter], project: &ProjectTotal) -> bool {
    filters.iter().any(|filter| filter.matches(project))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTotal {
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardInfo {
    pub total_time: String,
    /// Keyed by project ID.
    #[serde(default)]
    pub project_and_total_time: BTreeMap<String, ProjectTotal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardRequest {
    start_date: String,
    end_date: String,
    access: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
}

impl DashboardRequest {
    fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            start_date: format!("{}T00:00:00", from.format("%Y-%m-%d")),
            end_date: format!("{}T23:59:59", to.format("%Y-%m-%d")),
            access: "ME",
            kind: "PROJECT",
        }
    }
}

/// Total hours minus ignored project hours, clamped at zero.
///
/// # Errors
///
/// Returns [`IntegrationError::InvalidResponse`] if a duration is malformed
/// or carries years or months.
pub fn hours_from_dashboard(
    info: &DashboardInfo,
    entries_to_ignore: &[EntryFilter],
) -> Result<f64, IntegrationError> {
    let total = duration_hours(&info.total_time)?;
    let mut ignored = 0.0;
    for project in info.project_and_total_time.values() {
        if apply_filters(entries_to_ignore, project) {
            ignored += duration_hours(&project.duration)?;
        }
    }
    Ok((total - ignored).max(0.0))
}

fn duration_hours(value: &str) -> Result<f64, IntegrationError> {
    parse_iso_duration(value)
        .and_then(|duration| duration.subset_to_hours())
        .map_err(|err| IntegrationError::InvalidResponse(err.to_string()))
}

/// Clockify API client.
pub struct Client {
    http: reqwest::Client,
    api_key: String,
    workspace_id: String,
    entries_to_ignore: Vec<EntryFilter>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_key", &"[REDACTED]")
            .field("workspace_id", &self.workspace_id)
            .field("entries_to_ignore", &self.entries_to_ignore)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client for an API key and workspace.
    ///
    /// # Errors
    ///
    /// Returns an error if either value is blank, if a filter sets no field,
    /// or if the HTTP client fails to build.
    pub fn new(
        api_key: impl Into<String>,
        workspace_id: impl Into<String>,
        entries_to_ignore: Vec<EntryFilter>,
    ) -> Result<Self, IntegrationError> {
        let api_key = api_key.into();
        let workspace_id = workspace_id.into();
        require_credential(&api_key, "Clockify API key")?;
        require_credential(&workspace_id, "Clockify workspace ID")?;
        require_filters(&entries_to_ignore, EntryFilter::is_empty)?;

        Ok(Self {
            http: http_client()?,
            api_key,
            workspace_id,
            entries_to_ignore,
        })
    }

    /// Tracked hours from `from` 00:00:00 through `to` 23:59:59.
    pub async fn work_hours(&self, from: NaiveDate, to: NaiveDate) -> Result<f64, IntegrationError> {
        let url = format!(
            "{API_URL}/workspaces/{}/reports/dashboard-info",
            self.workspace_id
        );
        let response = self
            .http
            .post(url)
            .header("X-Api-Key", &self.api_key)
            .json(&DashboardRequest::new(from, to))
            .send()
            .await?;
        let info: DashboardInfo = read_json(response).await?;
        tracing::debug!(
            total = %info.total_time,
            projects = info.project_and_total_time.len(),
            "clockify dashboard"
        );
        hours_from_dashboard(&info, &self.entries_to_ignore)
    }
}
