//! CLI entry point: parse a milestone document, confirm, file the issues.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use milestone_issues::github::IssuesClient;
use milestone_issues::{milestone, publisher, Config};

#[derive(Debug, Parser)]
#[command(
    name = "milestone-issues",
    version,
    about = "Create GitHub issues from a milestone task document"
)]
struct Cli {
    /// Path to the milestone markdown file
    milestone_file: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err)
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            ) =>
        {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            let _ = err.print();
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    if !cli.milestone_file.exists() {
        anyhow::bail!("File not found: {}", cli.milestone_file.display());
    }

    // Credential check happens before parsing so a bad environment fails
    // before any other work.
    let config = Config::from_env()?;

    println!("Extracting tasks from {}...", cli.milestone_file.display());
    let content = tokio::fs::read_to_string(&cli.milestone_file)
        .await
        .with_context(|| format!("Failed to read {}", cli.milestone_file.display()))?;

    let doc = milestone::extract(&content)
        .with_context(|| format!("Failed to parse {}", cli.milestone_file.display()))?;
    println!("Found {} tasks\n", doc.tasks.len());

    if doc.tasks.is_empty() {
        println!("No tasks found in the file.");
        return Ok(ExitCode::FAILURE);
    }

    if !confirm(doc.tasks.len())? {
        println!("Aborted.");
        return Ok(ExitCode::SUCCESS);
    }

    tracing::info!(
        owner = %config.owner,
        repo = %config.repo,
        tasks = doc.tasks.len(),
        "creating issues"
    );

    let client = IssuesClient::new(&config.token, &config.owner, &config.repo);
    let summary = publisher::publish_all(&client, &doc.tasks, config.request_delay).await;

    let rule = "=".repeat(60);
    println!("\n{rule}");
    println!("Summary:");
    println!("  Total tasks: {}", doc.tasks.len());
    println!("  Created: {}", summary.created);
    println!("  Failed: {}", summary.failed);
    println!("{rule}");

    Ok(ExitCode::SUCCESS)
}

/// Ask the operator to confirm before anything is created.
fn confirm(count: usize) -> anyhow::Result<bool> {
    print!("Create {count} GitHub issues? (yes/no): ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;

    let answer = answer.trim().to_lowercase();
    Ok(answer == "yes" || answer == "y")
}
