//! # milestone-issues
//!
//! Creates GitHub issues from milestone task documents.
//!
//! A milestone document is a markdown file with a `# Milestone <N>:` heading,
//! `## <x>.<y> <name>` section headings, and numbered checklist items. Every
//! unchecked item becomes one tracked issue, labelled by milestone, section,
//! and content.
//!
//! ## Flow
//! 1. Parse the document into an ordered task list ([`milestone`])
//! 2. Confirm with the operator
//! 3. Submit one issue per task, sequentially, with a rate-limit pause
//!    between requests ([`publisher`], [`github`])
//!
//! ## Modules
//! - `milestone`: document parsing and label derivation
//! - `github`: GitHub Issues REST client
//! - `publisher`: sequential submission loop and run summary
//! - `config`: environment-based credentials and repo target

pub mod config;
pub mod github;
pub mod milestone;
pub mod publisher;

pub use config::Config;
