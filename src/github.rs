//! GitHub Issues API client.
//!
//! One `POST /repos/{owner}/{repo}/issues` per task, authenticated with a
//! personal access token. The [`IssueSink`] trait keeps the submission loop
//! testable without a network.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::milestone::Task;

const API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("milestone-issues/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{status} - {body}")]
    Api { status: u16, body: String },

    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Issue creation request body.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

/// The slice of the creation response we care about.
#[derive(Debug, Deserialize)]
pub struct CreatedIssue {
    pub html_url: String,
}

impl NewIssue {
    /// Build the issue title and body for a task.
    ///
    /// Titles follow the `M<NN>-T<NNN>` scheme so issues sort by milestone
    /// and task number; the body carries the task text plus metadata lines.
    pub fn from_task(task: &Task) -> Self {
        let mut body = String::new();
        if !task.body.is_empty() {
            body.push_str(&task.body);
            body.push_str("\n\n");
        }
        body.push_str(&format!("**Milestone:** {:02}\n", task.milestone_num));
        body.push_str(&format!("**Section:** {}\n", task.section));
        body.push_str(&format!("**Task:** {}", task.number));

        Self {
            title: format!(
                "M{:02}-T{:03}: {}",
                task.milestone_num, task.number, task.title
            ),
            body,
            labels: task.labels.clone(),
        }
    }
}

/// Anything that can turn a [`NewIssue`] into a created issue.
#[async_trait]
pub trait IssueSink {
    async fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue, PublishError>;
}

/// GitHub REST client for a single repository.
pub struct IssuesClient {
    client: Client,
    token: String,
    issues_url: String,
}

impl IssuesClient {
    /// Create a client for `owner/repo`.
    pub fn new(token: &str, owner: &str, repo: &str) -> Self {
        Self {
            client: Client::new(),
            token: token.to_string(),
            issues_url: format!("{API_BASE}/repos/{owner}/{repo}/issues"),
        }
    }
}

#[async_trait]
impl IssueSink for IssuesClient {
    async fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue, PublishError> {
        tracing::debug!(title = %issue.title, "creating issue");

        let resp = self
            .client
            .post(&self.issues_url)
            .header("Authorization", format!("token {}", self.token))
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", USER_AGENT)
            .json(issue)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if status != reqwest::StatusCode::CREATED {
            return Err(PublishError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
