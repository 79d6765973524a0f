use anyhow::{bail, Context, Result};

use crate::assessment::scoring::UnmatchedOptionPolicy;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// When unset the service runs on the in-memory document store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub port: u16,
    pub rust_log: String,
    pub unmatched_option: UnmatchedOptionPolicy,
    pub resend_api_key: Option<String>,
    pub mail_from: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse::<u32>()
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            unmatched_option: parse_unmatched_policy(
                &std::env::var("ASSESSMENT_UNMATCHED_OPTION").unwrap_or_else(|_| "skip".into()),
            )?,
            resend_api_key: optional_env("RESEND_API_KEY"),
            mail_from: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "noreply@keeinstitute.com".to_string()),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_unmatched_policy(raw: &str) -> Result<UnmatchedOptionPolicy> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "skip" => Ok(UnmatchedOptionPolicy::Skip),
        "reject" => Ok(UnmatchedOptionPolicy::Reject),
        other => bail!("ASSESSMENT_UNMATCHED_OPTION must be 'skip' or 'reject', got '{other}'"),
    }
}

#[cfg(test)]
impl Config {
    /// In-memory configuration used by handler tests.
    pub fn for_tests() -> Self {
        Config {
            database_url: None,
            db_max_connections: 1,
            port: 0,
            rust_log: "debug".to_string(),
            unmatched_option: UnmatchedOptionPolicy::Skip,
            resend_api_key: None,
            mail_from: "noreply@test.local".to_string(),
        }
    }
}
