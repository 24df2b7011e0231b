use std::env;
use std::time::Duration;

use url::Url;

use crate::retry::RetryPolicy;

pub const DEFAULT_EXPLORER_API_URL: &str = "https://eth.blockscout.com/api/v2";
pub const DEFAULT_BLOCK_COUNT: usize = 100;
pub const DEFAULT_TX_PAGE_SIZE: usize = 50;

#[derive(Debug, Clone)]
pub struct Config {
    pub explorer_api_url: String,
    pub block_count: usize,
    pub tx_page_size: usize,
    pub retry: RetryPolicy,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid EXPLORER_API_URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("{name} must be a non-negative integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let explorer_api_url = lookup("EXPLORER_API_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EXPLORER_API_URL.to_string());
        Url::parse(&explorer_api_url).map_err(|source| ConfigError::InvalidUrl {
            url: explorer_api_url.clone(),
            source,
        })?;

        let block_count = parse_number(&lookup, "BLOCK_COUNT", DEFAULT_BLOCK_COUNT)?;
        let tx_page_size = parse_number(&lookup, "TX_PAGE_SIZE", DEFAULT_TX_PAGE_SIZE)?;

        let defaults = RetryPolicy::default();
        let max_attempts = parse_number(&lookup, "RETRY_MAX_ATTEMPTS", defaults.max_attempts)?;
        let initial_delay_ms = parse_number(
            &lookup,
            "RETRY_INITIAL_DELAY_MS",
            defaults.initial_delay.as_millis() as u64,
        )?;

        Ok(Self {
            explorer_api_url,
            block_count,
            tx_page_size,
            retry: RetryPolicy::new(max_attempts, Duration::from_millis(initial_delay_ms)),
        })
    }
}

fn parse_number<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value: raw }),
    }
}
