//! Milestone document parsing.
//!
//! Scans a milestone markdown file and extracts one [`Task`] per unchecked
//! checklist item, tagging each with the section it appears under and a set
//! of classification labels derived from the section heading and task text.
//!
//! Line classification is done by small predicate functions over single
//! lines, so the scan loop stays declarative and each pattern is testable
//! on its own.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static MILESTONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^# Milestone (\d+):").expect("valid regex"));
static SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^## (\d+\.\d+) (.+)").expect("valid regex"));
static TASK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\. \[ \] (.+)").expect("valid regex"));
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#+ ").expect("valid regex"));
static ACCEPTANCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#+ Acceptance").expect("valid regex"));

/// One unit of work extracted from a milestone document.
///
/// Tasks are immutable after extraction; they flow one-way into issue
/// creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Task number, taken verbatim from the document's enumeration.
    pub number: u32,
    /// Single-line title following the checklist marker.
    pub title: String,
    /// Combined section id and heading, e.g. "2.3 Database Schema".
    pub section: String,
    /// Free text following the task line, trimmed; empty if none.
    pub body: String,
    /// Deduplicated classification labels, sorted for determinism.
    pub labels: Vec<String>,
    /// Milestone number shared by all tasks from the document.
    pub milestone_num: u32,
}

/// Result of parsing one milestone document.
#[derive(Debug, Clone)]
pub struct MilestoneDoc {
    pub milestone_num: u32,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no milestone heading found (expected a line like `# Milestone 1:`)")]
    MissingMilestoneHeading,
}

/// Section cursor state while scanning the document.
#[derive(Debug, Clone)]
struct Section {
    id: String,
    heading: String,
}

impl Section {
    fn label(&self) -> String {
        format!("{} {}", self.id, self.heading)
    }
}

/// Match a top-level milestone heading, returning the milestone number.
fn milestone_heading(line: &str) -> Option<u32> {
    MILESTONE_RE
        .captures(line)
        .and_then(|caps| caps[1].parse().ok())
}

/// Match a second-level section heading like `## 2.1 Database Setup`.
fn section_heading(line: &str) -> Option<Section> {
    SECTION_RE.captures(line).map(|caps| Section {
        id: caps[1].to_string(),
        heading: caps[2].to_string(),
    })
}

/// Match an unchecked checklist item like `3. [ ] Add login form`.
///
/// Checked items (`[x]`) deliberately do not match; they are excluded from
/// extraction.
fn task_line(line: &str) -> Option<(u32, &str)> {
    let caps = TASK_RE.captures(line)?;
    let number = caps[1].parse().ok()?;
    let title = caps.get(2)?.as_str();
    Some((number, title))
}

/// Any heading line, whatever its depth.
fn is_heading(line: &str) -> bool {
    HEADING_RE.is_match(line)
}

/// An `Acceptance` sub-heading at any depth.
fn is_acceptance_heading(line: &str) -> bool {
    ACCEPTANCE_RE.is_match(line)
}

/// Parse a milestone document into its milestone number and ordered tasks.
///
/// The milestone number comes from the first matching heading; a document
/// without one is a fatal input error and yields no tasks. Each task
/// inherits the most recently opened section; task lines seen before any
/// section heading are skipped.
pub fn extract(text: &str) -> Result<MilestoneDoc, ExtractError> {
    let milestone_num = text
        .lines()
        .find_map(milestone_heading)
        .ok_or(ExtractError::MissingMilestoneHeading)?;

    let lines: Vec<&str> = text.lines().collect();
    let mut current_section: Option<Section> = None;
    let mut tasks = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        if let Some(section) = section_heading(line) {
            current_section = Some(section);
            continue;
        }

        let Some((number, title)) = task_line(line) else {
            continue;
        };
        let Some(section) = current_section.as_ref() else {
            tracing::debug!(number, "skipping task before first section heading");
            continue;
        };

        let body = collect_body(&lines[i + 1..]);
        let labels = derive_labels(milestone_num, &section.heading, title, &body);

        tasks.push(Task {
            number,
            title: title.to_string(),
            section: section.label(),
            body,
            labels,
            milestone_num,
        });
    }

    tracing::debug!(milestone_num, count = tasks.len(), "extracted tasks");

    Ok(MilestoneDoc {
        milestone_num,
        tasks,
    })
}

/// Collect body lines following a task line.
///
/// Stops at (and does not consume) the next task line, any heading, an
/// `Acceptance` sub-heading, or a blank line. The result is joined with
/// newlines and trimmed.
fn collect_body(rest: &[&str]) -> String {
    let mut collected = Vec::new();
    for line in rest {
        if task_line(line).is_some()
            || is_heading(line)
            || is_acceptance_heading(line)
            || line.trim().is_empty()
        {
            break;
        }
        collected.push(*line);
    }
    collected.join("\n").trim().to_string()
}

/// Derive classification labels from the milestone number, section heading,
/// and combined task text. All text matching is case-insensitive.
fn derive_labels(milestone_num: u32, section_heading: &str, title: &str, body: &str) -> Vec<String> {
    let mut labels = BTreeSet::new();
    labels.insert(format!("milestone-{milestone_num:02}"));

    let section = section_heading.to_lowercase();
    if section.contains("setup") || section.contains("configuration") {
        labels.insert("setup".to_string());
    }
    if section.contains("database") || section.contains("schema") {
        labels.insert("database".to_string());
    }
    if section.contains("auth") {
        labels.insert("auth".to_string());
    }
    if section.contains("api") || section.contains("trpc") {
        labels.insert("api".to_string());
    }

    let content = format!("{}{}", title.to_lowercase(), body.to_lowercase());
    if content.contains("test") {
        labels.insert("testing".to_string());
    }
    if content.contains("migration") {
        labels.insert("migration".to_string());
    }
    if content.contains("frontend") || content.contains("component") || content.contains("ui") {
        labels.insert("frontend".to_string());
    }
    if content.contains("config") || content.contains("environment") {
        labels.insert("config".to_string());
    }

    labels.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_single_task() {
        let doc = "\
# Milestone 3: Example

## 2.1 Database Setup

1. [ ] Add migration script
   Runs the schema update.
";
        let result = extract(doc).unwrap();
        assert_eq!(result.milestone_num, 3);
        assert_eq!(result.tasks.len(), 1);

        let task = &result.tasks[0];
        assert_eq!(task.number, 1);
        assert_eq!(task.title, "Add migration script");
        assert_eq!(task.section, "2.1 Database Setup");
        assert_eq!(task.body, "Runs the schema update.");
        assert_eq!(task.milestone_num, 3);
        for label in ["milestone-03", "database", "setup", "migration"] {
            assert!(task.labels.contains(&label.to_string()), "missing {label}");
        }
    }

    #[test]
    fn test_missing_milestone_heading_is_fatal() {
        let doc = "## 1.1 Setup\n\n1. [ ] Do something\n";
        assert!(matches!(
            extract(doc),
            Err(ExtractError::MissingMilestoneHeading)
        ));
    }

    #[test]
    fn test_first_milestone_heading_wins() {
        let doc = "\
# Milestone 2: First

## 1.1 Setup

1. [ ] Task one

# Milestone 9: Second
";
        let result = extract(doc).unwrap();
        assert_eq!(result.milestone_num, 2);
        assert_eq!(result.tasks[0].milestone_num, 2);
    }

    #[test]
    fn test_checked_items_are_excluded() {
        let doc = "\
# Milestone 1: X

## 1.1 Setup

1. [x] Already done
2. [ ] Still open
";
        let result = extract(doc).unwrap();
        assert_eq!(result.tasks.len(), 1);
        assert_eq!(result.tasks[0].number, 2);
        assert_eq!(result.tasks[0].title, "Still open");
    }

    #[test]
    fn test_task_before_any_section_is_skipped() {
        let doc = "\
# Milestone 1: X

1. [ ] Orphan task

## 1.1 Setup

2. [ ] Real task
";
        let result = extract(doc).unwrap();
        assert_eq!(result.tasks.len(), 1);
        assert_eq!(result.tasks[0].number, 2);
    }

    #[test]
    fn test_tasks_preserve_document_order() {
        let doc = "\
# Milestone 1: X

## 1.1 A

3. [ ] Third
1. [ ] First

## 1.2 B

2. [ ] Second
";
        let result = extract(doc).unwrap();
        let numbers: Vec<u32> = result.tasks.iter().map(|t| t.number).collect();
        assert_eq!(numbers, vec![3, 1, 2]);
        assert_eq!(result.tasks[2].section, "1.2 B");
    }

    #[test]
    fn test_section_cursor_carries_across_content() {
        let doc = "\
# Milestone 1: X

## 1.1 Setup

Some prose in between.
Not a task.
1. [ ] Task under setup
";
        let result = extract(doc).unwrap();
        assert_eq!(result.tasks[0].section, "1.1 Setup");
    }

    #[test]
    fn test_body_stops_at_blank_line() {
        let doc = "\
# Milestone 1: X

## 1.1 A

1. [ ] Task
line one
line two

trailing prose not part of body
";
        let result = extract(doc).unwrap();
        assert_eq!(result.tasks[0].body, "line one\nline two");
    }

    #[test]
    fn test_body_stops_at_next_task_line() {
        let doc = "\
# Milestone 1: X

## 1.1 A

1. [ ] First
body of first
2. [ ] Second
";
        let result = extract(doc).unwrap();
        assert_eq!(result.tasks.len(), 2);
        assert_eq!(result.tasks[0].body, "body of first");
        assert_eq!(result.tasks[1].body, "");
    }

    #[test]
    fn test_body_stops_at_heading_and_acceptance() {
        let doc = "\
# Milestone 1: X

## 1.1 A

1. [ ] With heading after
body line
### Acceptance
- criteria here

## 1.2 B

2. [ ] With section after
other body
## 1.3 C
";
        let result = extract(doc).unwrap();
        assert_eq!(result.tasks[0].body, "body line");
        assert_eq!(result.tasks[1].body, "other body");
    }

    #[test]
    fn test_body_is_trimmed() {
        let doc = "# Milestone 1: X\n\n## 1.1 A\n\n1. [ ] Task\n   indented body   \n";
        let result = extract(doc).unwrap();
        assert_eq!(result.tasks[0].body, "indented body");
        // Re-running yields the same trimmed string.
        let again = extract(doc).unwrap();
        assert_eq!(again.tasks[0].body, result.tasks[0].body);
    }

    #[test]
    fn test_zero_tasks_is_not_an_error() {
        let doc = "# Milestone 5: Empty\n\nNothing to do here.\n";
        let result = extract(doc).unwrap();
        assert_eq!(result.milestone_num, 5);
        assert!(result.tasks.is_empty());
    }

    #[test]
    fn test_section_labels_are_case_insensitive() {
        let doc = "\
# Milestone 1: X

## 3.2 AUTH Flows

1. [ ] Wire up login
";
        let result = extract(doc).unwrap();
        assert!(result.tasks[0].labels.contains(&"auth".to_string()));
    }

    #[test]
    fn test_content_labels_from_title_and_body() {
        let doc = "\
# Milestone 12: X

## 4.1 tRPC Routers

1. [ ] Build recipe router
   Cover it with integration tests and a UI harness.
";
        let result = extract(doc).unwrap();
        let labels = &result.tasks[0].labels;
        for expected in ["milestone-12", "api", "testing", "frontend"] {
            assert!(labels.contains(&expected.to_string()), "missing {expected}");
        }
        assert!(!labels.contains(&"database".to_string()));
    }

    #[test]
    fn test_labels_are_deduplicated() {
        // "configuration" section plus "config" in the body both map to
        // overlapping labels; each label must appear once.
        let doc = "\
# Milestone 1: X

## 1.1 Configuration Setup

1. [ ] Document environment config
";
        let result = extract(doc).unwrap();
        let labels = &result.tasks[0].labels;
        let mut deduped = labels.clone();
        deduped.dedup();
        assert_eq!(*labels, deduped);
        assert!(labels.contains(&"setup".to_string()));
        assert!(labels.contains(&"config".to_string()));
    }

    #[test]
    fn test_milestone_label_is_zero_padded() {
        let doc = "# Milestone 7: X\n\n## 1.1 A\n\n1. [ ] Task\n";
        let result = extract(doc).unwrap();
        assert!(result.tasks[0]
            .labels
            .contains(&"milestone-07".to_string()));
    }

    #[test]
    fn test_classifiers() {
        assert_eq!(milestone_heading("# Milestone 4: Recipes"), Some(4));
        assert_eq!(milestone_heading("## Milestone 4: Recipes"), None);
        assert_eq!(milestone_heading("# Milestone: Recipes"), None);

        let section = section_heading("## 2.3 Auth Middleware").unwrap();
        assert_eq!(section.id, "2.3");
        assert_eq!(section.heading, "Auth Middleware");
        assert!(section_heading("### 2.3 Too Deep").is_none());
        assert!(section_heading("## Tasks").is_none());

        assert_eq!(task_line("12. [ ] Ship it"), Some((12, "Ship it")));
        assert!(task_line("12. [x] Shipped").is_none());
        assert!(task_line("- [ ] Not numbered").is_none());

        assert!(is_heading("# Top"));
        assert!(is_heading("#### Deep"));
        assert!(!is_heading("plain text"));

        assert!(is_acceptance_heading("### Acceptance Criteria"));
        assert!(is_acceptance_heading("## Acceptance"));
        assert!(!is_acceptance_heading("Acceptance without heading"));
    }
}
