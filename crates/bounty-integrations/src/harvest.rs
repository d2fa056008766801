//! Harvest time entries.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{IntegrationError, http_client, read_json, require_credential, require_filters};

const TIME_ENTRIES_URL: &str = "https://api.harvestapp.com/v2/time_entries";

/// Entries matching a filter are left out of the total.
///
/// A filter matches when every field it sets equals the entry's project or
/// task name. A filter with no fields would match everything, so it is
/// rejected when deserialized and by [`Client::new`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FilterFields")]
pub struct EntryFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FilterFields {
    #[serde(default)]
    project: Option<String>,
    #[serde(default)]
    task: Option<String>,
}

impl TryFrom<FilterFields> for EntryFilter {
    type Error = IntegrationError;

    fn try_from(fields: FilterFields) -> Result<Self, Self::Error> {
        let filter = Self {
            project: fields.project,
            task: fields.task,
        };
        if filter.is_empty() {
            return Err(IntegrationError::EmptyFilter);
        }
        Ok(filter)
    }
}

impl EntryFilter {
    pub const fn is_empty(&self) -> bool {
        self.project.is_none() && self.task.is_none()
    }

    pub fn matches(&self, entry: &TimeEntry) -> bool {
        self.project
            .as_ref()
            .is_none_or(|project| *project == entry.project.name)
            && self
                .task
                .as_ref()
                .is_none_or(|task| *task == entry.task.name)
    }
}

/// The default filter excludes registered absence.
pub fn default_entries_to_ignore() -> Vec<EntryFilter> {
    vec![EntryFilter {
        project: Some("Absence".to_string()),
        task: Some("Time off".to_string()),
    }]
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimeEntry {
    pub hours: f64,
    pub project: NamedRef,
    pub task: NamedRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct TimeEntriesPage {
    time_entries: Vec<TimeEntry>,
    links: Links,
}

#[derive(Debug, Deserialize)]
struct Links {
    next: Option<String>,
}

/// Sums the hours of entries that no filter matches.
pub fn sum_hours<'a>(
    entries: impl IntoIterator<Item = &'a TimeEntry>,
    entries_to_ignore: &[EntryFilter],
) -> f64 {
    entries
        .into_iter()
        .filter(|entry| !entries_to_ignore.iter().any(|filter| filter.matches(entry)))
        .map(|entry| entry.hours)
        .sum()
}

/// Harvest API client.
pub struct Client {
    http: reqwest::Client,
    token: String,
    account_id: String,
    entries_to_ignore: Vec<EntryFilter>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("token", &"[REDACTED]")
            .field("account_id", &self.account_id)
            .field("entries_to_ignore", &self.entries_to_ignore)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client for a personal access token and account.
    ///
    /// # Errors
    ///
    /// Returns an error if either credential is blank, if a filter sets no
    /// field, or if the HTTP client fails to build.
    pub fn new(
        token: impl Into<String>,
        account_id: impl Into<String>,
        entries_to_ignore: Vec<EntryFilter>,
    ) -> Result<Self, IntegrationError> {
        let token = token.into();
        let account_id = account_id.into();
        require_credential(&token, "Harvest token")?;
        require_credential(&account_id, "Harvest account ID")?;
        require_filters(&entries_to_ignore, EntryFilter::is_empty)?;

        Ok(Self {
            http: http_client()?,
            token,
            account_id,
            entries_to_ignore,
        })
    }

    /// Registered hours in `[from, to]`, following `links.next` until exhausted.
    pub async fn work_hours(&self, from: NaiveDate, to: NaiveDate) -> Result<f64, IntegrationError> {
        let range = [
            ("from", from.format("%Y-%m-%d").to_string()),
            ("to", to.format("%Y-%m-%d").to_string()),
        ];

        sum_pages(&self.entries_to_ignore, |next| {
            let request = match next {
                Some(url) => self.http.get(url),
                None => self.http.get(TIME_ENTRIES_URL).query(&range),
            }
            .bearer_auth(&self.token)
            .header("Harvest-Account-ID", &self.account_id);

            async move {
                let response = request.send().await?;
                read_json::<TimeEntriesPage>(response).await
            }
        })
        .await
    }
}

/// Sums hours page by page. `fetch_page` gets `None` for the first page and
/// the previous page's `links.next` after that.
async fn sum_pages<F, Fut>(
    entries_to_ignore: &[EntryFilter],
    mut fetch_page: F,
) -> Result<f64, IntegrationError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<TimeEntriesPage, IntegrationError>>,
{
    let mut hours = 0.0;
    let mut pages = 0_usize;
    let mut next = None;

    loop {
        let page = fetch_page(next.take()).await?;
        pages += 1;
        hours += sum_hours(&page.time_entries, entries_to_ignore);
        tracing::debug!(page = pages, entries = page.time_entries.len(), "harvest page");

        match page.links.next {
            Some(url) => next = Some(url),
            None => break,
        }
    }

    Ok(hours)
}
