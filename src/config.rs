//! Runtime configuration from the environment.
//!
//! The personal access token is required and checked before any parsing or
//! network activity. Target repository defaults are baked in; `GITHUB_OWNER`
//! and `GITHUB_REPO` override them.

use std::time::Duration;

use anyhow::Result;

const DEFAULT_OWNER: &str = "dougis-org";
const DEFAULT_REPO: &str = "cookbook-tanstack";

/// Pause between consecutive issue creations, for API rate limiting.
const REQUEST_DELAY: Duration = Duration::from_secs(1);

/// Resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub request_delay: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Fails if `GITHUB_TOKEN` is unset or empty.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "GITHUB_TOKEN environment variable is not set.\n\
                     Set it with: export GITHUB_TOKEN=your_github_personal_access_token"
                )
            })?;

        Ok(Self {
            token,
            owner: env_or("GITHUB_OWNER", DEFAULT_OWNER),
            repo: env_or("GITHUB_REPO", DEFAULT_REPO),
            request_delay: REQUEST_DELAY,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}
