//! Runtime configuration read from the environment.
//!
//! Every value is read once at startup; required values that are missing or
//! empty stop the program before any request is made.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sprintdigest_notify::{Credentials, SesConfig, DEFAULT_SUBJECT};
use sprintdigest_progress::{ClassifierConfig, DEFAULT_ITERATION_DAYS};
use sprintdigest_tracker::{GithubConfig, DEFAULT_GRAPHQL_URL};
use sprintdigest_work::RunConfig;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or empty
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable could not be parsed
    #[error("invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

type Result<T> = std::result::Result<T, ConfigError>;

/// Longest accepted iteration, in days.
const MAX_ITERATION_DAYS: u32 = 366;

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// GraphQL connection
    pub github: GithubConfig,

    /// Pipeline settings
    pub run: RunConfig,

    /// Address book location
    pub address_book: PathBuf,

    /// Email subject
    pub subject: String,

    /// Maximum sends in flight
    pub send_concurrency: usize,

    /// Timeout applied to every HTTP client
    pub http_timeout: Duration,
}

impl AppConfig {
    /// Read from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary lookup function.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = required(&lookup, "GIT_HUB_TOKEN")?;
        let project_id = required(&lookup, "PROJECT_NODE_ID")?;
        let http_timeout = Duration::from_secs(positive(&lookup, "DIGEST_HTTP_TIMEOUT_SECS", 30)?);

        let github = GithubConfig::new(token, project_id)
            .with_endpoint(
                optional(&lookup, "DIGEST_GRAPHQL_URL")
                    .unwrap_or_else(|| DEFAULT_GRAPHQL_URL.to_string()),
            )
            .with_timeout(http_timeout);

        let defaults = ClassifierConfig::default();
        let run = RunConfig {
            iteration_days: at_most(
                positive(&lookup, "DIGEST_ITERATION_DAYS", DEFAULT_ITERATION_DAYS)?,
                "DIGEST_ITERATION_DAYS",
                MAX_ITERATION_DAYS,
            )?,
            classifier: ClassifierConfig {
                status_field: optional(&lookup, "DIGEST_STATUS_FIELD")
                    .unwrap_or(defaults.status_field),
                iteration_field: optional(&lookup, "DIGEST_ITERATION_FIELD")
                    .unwrap_or(defaults.iteration_field),
            },
        };

        Ok(Self {
            github,
            run,
            address_book: optional(&lookup, "DIGEST_ADDRESS_BOOK")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("AssigneesEmail.yaml")),
            subject: optional(&lookup, "DIGEST_MAIL_SUBJECT")
                .unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
            send_concurrency: positive(&lookup, "DIGEST_SEND_CONCURRENCY", 1)?,
            http_timeout,
        })
    }
}

/// Mail service settings, needed only when emails are really sent.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// AWS region
    pub region: String,

    /// AWS credentials
    pub credentials: Credentials,
}

impl MailConfig {
    /// Read from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary lookup function.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut credentials = Credentials::new(
            required(&lookup, "AWS_ACCESS_KEY_ID")?,
            required(&lookup, "AWS_SECRET_ACCESS_KEY")?,
        );
        credentials.session_token = optional(&lookup, "AWS_SESSION_TOKEN");

        Ok(Self {
            region: required(&lookup, "AWS_REGION")?,
            credentials,
        })
    }

    /// SES transport settings.
    pub fn ses_config(&self, timeout: Duration) -> SesConfig {
        SesConfig::new(self.region.clone(), self.credentials.clone()).with_timeout(timeout)
    }
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, var: &str) -> Option<String> {
    lookup(var)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(lookup: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<String> {
    optional(lookup, var).ok_or(ConfigError::Missing(var))
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, var: &'static str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match optional(lookup, var) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}

fn positive<T>(lookup: &impl Fn(&str) -> Option<String>, var: &'static str, default: T) -> Result<T>
where
    T: FromStr + PartialOrd + Default + Display,
    T::Err: Display,
{
    let value = parsed(lookup, var, default)?;
    if value <= T::default() {
        return Err(ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

fn at_most<T>(value: T, var: &'static str, max: T) -> Result<T>
where
    T: PartialOrd + Display,
{
    if value > max {
        return Err(ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: format!("must be at most {}", max),
        });
    }
    Ok(value)
}
