//! Configuration module
//!
//! Worker and parser settings, read from the environment (with `.env`
//! support through dotenvy).

use std::env;
use std::str::FromStr;

use crate::parser_types::ParserBackend;

const PARSER_URL: &str = "http://127.0.0.1:8787";
const PARSER_TIMEOUT_SECS: u64 = 60;
const INBOX_CAPACITY: usize = 256;
const OUTBOX_CAPACITY: usize = 256;

#[derive(Clone, Debug)]
pub struct WorkerConfig {
    pub environment: String,
    pub parser_backend: ParserBackend,
    /// Base URL of the HTTP parse service
    pub parser_url: String,
    pub parser_timeout_secs: u64,
    /// Executable used by the command backend
    pub parser_command: Option<String>,
    pub parser_args: Vec<String>,
    pub inbox_capacity: usize,
    pub outbox_capacity: usize,
    /// Cap on concurrently running invocations. 0 = unbounded.
    pub max_in_flight: usize,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            parser_backend: ParserBackend::Http,
            parser_url: PARSER_URL.to_string(),
            parser_timeout_secs: PARSER_TIMEOUT_SECS,
            parser_command: None,
            parser_args: Vec::new(),
            inbox_capacity: INBOX_CAPACITY,
            outbox_capacity: OUTBOX_CAPACITY,
            max_in_flight: 0,
            log_json: false,
        }
    }
}

fn parse_var<T>(key: &str, raw: Option<String>, default: T) -> Result<T, anyhow::Error>
where
    T: FromStr,
{
    match raw {
        None => Ok(default),
        Some(value) if value.trim().is_empty() => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got '{}'", key, value)),
    }
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let parser_backend = match lookup("ADVIEW_PARSER_BACKEND") {
            Some(raw) => raw.parse()?,
            None => ParserBackend::default(),
        };

        let parser_url = lookup("ADVIEW_PARSER_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| PARSER_URL.to_string());

        let parser_command = lookup("ADVIEW_PARSER_COMMAND")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let parser_args = lookup("ADVIEW_PARSER_ARGS")
            .map(|s| s.split_whitespace().map(String::from).collect())
            .unwrap_or_default();

        let log_json = match lookup("ADVIEW_LOG_FORMAT") {
            None => false,
            Some(raw) => match raw.trim().to_lowercase().as_str() {
                "" | "text" | "pretty" => false,
                "json" => true,
                _ => {
                    return Err(anyhow::anyhow!(
                        "ADVIEW_LOG_FORMAT must be 'text' or 'json', got '{}'",
                        raw
                    ))
                }
            },
        };

        let config = Self {
            environment,
            parser_backend,
            parser_url,
            parser_timeout_secs: parse_var(
                "ADVIEW_PARSER_TIMEOUT_SECS",
                lookup("ADVIEW_PARSER_TIMEOUT_SECS"),
                PARSER_TIMEOUT_SECS,
            )?,
            parser_command,
            parser_args,
            inbox_capacity: parse_var(
                "ADVIEW_INBOX_CAPACITY",
                lookup("ADVIEW_INBOX_CAPACITY"),
                INBOX_CAPACITY,
            )?,
            outbox_capacity: parse_var(
                "ADVIEW_OUTBOX_CAPACITY",
                lookup("ADVIEW_OUTBOX_CAPACITY"),
                OUTBOX_CAPACITY,
            )?,
            max_in_flight: parse_var("ADVIEW_MAX_IN_FLIGHT", lookup("ADVIEW_MAX_IN_FLIGHT"), 0)?,
            log_json,
        };

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.parser_backend {
            ParserBackend::Http => {
                if !(self.parser_url.starts_with("http://")
                    || self.parser_url.starts_with("https://"))
                {
                    return Err(anyhow::anyhow!(
                        "ADVIEW_PARSER_URL must be an http(s) URL, got '{}'",
                        self.parser_url
                    ));
                }
                if self.parser_timeout_secs == 0 {
                    return Err(anyhow::anyhow!(
                        "ADVIEW_PARSER_TIMEOUT_SECS must be greater than 0"
                    ));
                }
            }
            ParserBackend::Command => {
                if self.parser_command.is_none() {
                    return Err(anyhow::anyhow!(
                        "ADVIEW_PARSER_BACKEND=command requires ADVIEW_PARSER_COMMAND to be set"
                    ));
                }
            }
        }

        if self.inbox_capacity == 0 || self.outbox_capacity == 0 {
            return Err(anyhow::anyhow!(
                "ADVIEW_INBOX_CAPACITY and ADVIEW_OUTBOX_CAPACITY must be greater than 0"
            ));
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}
