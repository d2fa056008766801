//! XLedger timesheets over GraphQL.

use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{IntegrationError, http_client, parse_json, require_credential};

const GRAPHQL_URL: &str = "https://www.xledger.net/graphql";
const PAGE_SIZE: u32 = 10_000;

const TIMESHEETS_QUERY: &str = "\
query GetTimeEntries($first: Int, $from: String, $to: String, $employeeId: Int, $cursor: Int64String) {
  timesheets(
    first: $first
    filter: { employeeDbId: $employeeId, assignmentDate_gte: $from, assignmentDate_lte: $to, dbId_gt: $cursor }
  ) {
    edges {
      node {
        workingHours
      }
      cursor
    }
  }
}";

static WORKING_HOURS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\d+$").unwrap());

#[derive(Debug, Serialize)]
struct GraphQlRequest {
    query: &'static str,
    variables: Variables,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Variables {
    first: u32,
    from: String,
    to: String,
    employee_id: i64,
    cursor: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<TimesheetsData>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct TimesheetsData {
    timesheets: Connection,
}

#[derive(Debug, Deserialize)]
struct Connection {
    edges: Vec<Edge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Edge {
    pub node: TimesheetNode,
    /// Timesheet database ID, used as the `dbId_gt` cursor.
    pub cursor: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetNode {
    pub working_hours: String,
}

/// Parses a decimal `workingHours` value such as `"7.50"`.
///
/// # Errors
///
/// Returns [`IntegrationError::InvalidResponse`] unless the value is digits,
/// a dot, and digits.
pub fn parse_working_hours(value: &str) -> Result<f64, IntegrationError> {
    let invalid = || IntegrationError::InvalidResponse(format!("invalid working hours: {value}"));
    if !WORKING_HOURS_RE.is_match(value) {
        return Err(invalid());
    }
    value.parse().map_err(|_| invalid())
}

/// Extracts the edges of one page, surfacing GraphQL errors.
fn parse_page(body: &str) -> Result<Vec<Edge>, IntegrationError> {
    let response: GraphQlResponse = parse_json(body)?;
    if let Some(errors) = response.errors.filter(|errors| !errors.is_empty()) {
        let message = errors
            .into_iter()
            .map(|error| error.message)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(IntegrationError::Api { message });
    }
    response
        .data
        .map(|data| data.timesheets.edges)
        .ok_or_else(|| IntegrationError::InvalidResponse("missing data".to_string()))
}

/// XLedger GraphQL client.
pub struct Client {
    http: reqwest::Client,
    api_key: String,
    employee_id: i64,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_key", &"[REDACTED]")
            .field("employee_id", &self.employee_id)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client for an API token and employee.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is blank, if the employee ID is not
    /// positive, or if the HTTP client fails to build.
    pub fn new(api_key: impl Into<String>, employee_id: i64) -> Result<Self, IntegrationError> {
        let api_key = api_key.into();
        require_credential(&api_key, "XLedger API key")?;
        if employee_id <= 0 {
            return Err(IntegrationError::InvalidCredentials {
                field: "XLedger employee ID",
                reason: "must be positive",
            });
        }

        Ok(Self {
            http: http_client()?,
            api_key,
            employee_id,
        })
    }

    async fn fetch_page(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        cursor: String,
    ) -> Result<Vec<Edge>, IntegrationError> {
        let request = GraphQlRequest {
            query: TIMESHEETS_QUERY,
            variables: Variables {
                first: PAGE_SIZE,
                from: from.format("%Y-%m-%d").to_string(),
                to: to.format("%Y-%m-%d").to_string(),
                employee_id: self.employee_id,
                cursor,
            },
        };
        let response = self
            .http
            .post(GRAPHQL_URL)
            .header("Authorization", format!("token {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        // GraphQL errors may arrive with a success status, so parse either way.
        let status = response.status();
        let body = response.text().await?;
        match parse_page(&body) {
            Err(IntegrationError::InvalidResponse(_)) if !status.is_success() => {
                Err(IntegrationError::Api {
                    message: format!("status {status}: {body}"),
                })
            }
            result => result,
        }
    }

    /// Sum of `workingHours` for timesheets assigned in `[from, to]`.
    pub async fn work_hours(&self, from: NaiveDate, to: NaiveDate) -> Result<f64, IntegrationError> {
        sum_pages(|cursor| self.fetch_page(from, to, cursor)).await
    }
}

/// Sums `workingHours` page by page. Each page is requested with the cursor
/// of the previous page's last edge, starting from `"0"`, until a page comes
/// back empty.
async fn sum_pages<F, Fut>(mut fetch_page: F) -> Result<f64, IntegrationError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Vec<Edge>, IntegrationError>>,
{
    let mut hours = 0.0;
    let mut cursor = "0".to_string();

    loop {
        let edges = fetch_page(cursor.clone()).await?;
        tracing::debug!(%cursor, edges = edges.len(), "xledger page");
        let Some(last) = edges.last() else {
            break;
        };
        cursor.clone_from(&last.cursor);
        for edge in &edges {
            hours += parse_working_hours(&edge.node.working_hours)?;
        }
    }

    Ok(hours)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::future::ready;

    use super::*;

    fn edge(working_hours: &str, cursor: &str) -> Edge {
        Edge {
            node: TimesheetNode {
                working_hours: working_hours.to_string(),
            },
            cursor: cursor.to_string(),
        }
    }

    #[test]
    fn parses_decimal_working_hours() {
        assert!((parse_working_hours("7.50").unwrap() - 7.5).abs() < f64::EPSILON);
        assert!((parse_working_hours("0.25").unwrap() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_non_decimal_working_hours() {
        for value in ["7", "7,5", "-1.0", ".5", "7.5h", ""] {
            assert!(
                matches!(
                    parse_working_hours(value),
                    Err(IntegrationError::InvalidResponse(_))
                ),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn parses_page_edges() {
        let body = r#"{"data": {"timesheets": {"edges": [
            {"node": {"workingHours": "7.5"}, "cursor": "101"},
            {"node": {"workingHours": "3.75"}, "cursor": "102"}
        ]}}}"#;
        let edges = parse_page(body).unwrap();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[1].cursor, "102");
        assert_eq!(edges[0].node.working_hours, "7.5");
    }

    #[test]
    fn empty_page_has_no_edges() {
        let body = r#"{"data": {"timesheets": {"edges": []}}}"#;
        assert!(parse_page(body).unwrap().is_empty());
    }

    #[test]
    fn graphql_errors_become_api_errors() {
        let body = r#"{"data": null, "errors": [{"message": "Unauthorized"}, {"message": "Denied"}]}"#;
        let err = parse_page(body).unwrap_err();
        assert_eq!(err.to_string(), "API error: Unauthorized; Denied");
    }

    #[test]
    fn request_carries_range_and_cursor() {
        let request = GraphQlRequest {
            query: TIMESHEETS_QUERY,
            variables: Variables {
                first: PAGE_SIZE,
                from: "2022-04-01".to_string(),
                to: "2022-04-30".to_string(),
                employee_id: 42,
                cursor: "0".to_string(),
            },
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body["variables"],
            serde_json::json!({
                "first": 10_000,
                "from": "2022-04-01",
                "to": "2022-04-30",
                "employeeId": 42,
                "cursor": "0",
            })
        );
        assert!(body["query"].as_str().unwrap().contains("assignmentDate_lte: $to"));
    }

    #[tokio::test]
    async fn sum_pages_advances_cursor_to_last_edge() {
        let mut pages = VecDeque::from([
            vec![edge("7.50", "101"), edge("3.75", "102")],
            vec![edge("7.50", "205")],
            Vec::new(),
        ]);
        let mut cursors = Vec::new();

        let hours = sum_pages(|cursor| {
            cursors.push(cursor);
            ready(Ok(pages.pop_front().unwrap_or_default()))
        })
        .await
        .unwrap();

        assert!((hours - 18.75).abs() < f64::EPSILON);
        assert_eq!(cursors, ["0", "102", "205"]);
        assert!(pages.is_empty());
    }

    #[tokio::test]
    async fn sum_pages_with_no_timesheets_requests_once() {
        let mut cursors = Vec::new();
        let hours = sum_pages(|cursor| {
            cursors.push(cursor);
            ready(Ok(Vec::new()))
        })
        .await
        .unwrap();

        assert!(hours.abs() < f64::EPSILON);
        assert_eq!(cursors, ["0"]);
    }

    #[tokio::test]
    async fn sum_pages_stops_on_invalid_working_hours() {
        let mut pages = VecDeque::from([vec![edge("7.50", "101")], vec![edge("7,5", "102")]]);
        let mut requests = 0;

        let err = sum_pages(|_| {
            requests += 1;
            ready(Ok(pages.pop_front().unwrap_or_default()))
        })
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "invalid response: invalid working hours: 7,5");
        assert_eq!(requests, 2);
    }

    #[tokio::test]
    async fn sum_pages_propagates_api_errors() {
        let err = sum_pages(|_| {
            ready(Err(IntegrationError::Api {
                message: "Unauthorized".to_string(),
            }))
        })
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "API error: Unauthorized");
    }

    #[test]
    fn new_rejects_missing_employee_id() {
        for employee_id in [0, -3] {
            let err = Client::new("key", employee_id).unwrap_err();
            assert_eq!(err.to_string(), "invalid XLedger employee ID: must be positive");
        }
    }

    #[test]
    fn new_rejects_blank_key_and_redacts_debug() {
        assert!(Client::new("   ", 1).is_err());
        let client = Client::new("secret", 1).unwrap();
        assert!(!format!("{client:?}").contains("secret"));
    }
}
