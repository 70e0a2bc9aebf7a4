//! Sequential issue submission with progress reporting.
//!
//! Tasks are submitted one at a time in extraction order, with a fixed pause
//! between consecutive requests to stay under the API's rate limits. A failed
//! creation is counted and reported but never stops the run; there is no
//! retry.

use std::time::Duration;

use crate::github::{IssueSink, NewIssue, PublishError};
use crate::milestone::Task;

const TITLE_PREVIEW_LEN: usize = 60;

/// Running totals for one submission run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub created: usize,
    pub failed: usize,
}

/// Submit every task to the sink, in order, pausing `delay` between
/// consecutive submissions.
pub async fn publish_all<S>(sink: &S, tasks: &[Task], delay: Duration) -> Summary
where
    S: IssueSink + Sync,
{
    let mut summary = Summary::default();

    for (i, task) in tasks.iter().enumerate() {
        println!(
            "Creating issue {}: {}...",
            task.number,
            truncate(&task.title, TITLE_PREVIEW_LEN)
        );

        match sink.create_issue(&NewIssue::from_task(task)).await {
            Ok(created) => {
                println!("  ✓ Created: {}", created.html_url);
                summary.created += 1;
            }
            Err(PublishError::Api { status, body }) => {
                println!("  ✗ Error: {status} - {body}");
                tracing::warn!(task = task.number, status, "issue creation failed");
                summary.failed += 1;
            }
            Err(err) => {
                println!("  ✗ Error: {err}");
                tracing::warn!(task = task.number, error = %err, "issue creation failed");
                summary.failed += 1;
            }
        }

        if i + 1 < tasks.len() {
            tokio::time::sleep(delay).await;
        }
    }

    summary
}

/// Cut a title down to at most `max` characters for progress lines.
fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
