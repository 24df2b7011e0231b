//! Client for a Blockscout-style v2 REST API.
//!
//! Upstream responses are translated into [`Block`] and [`Transaction`]
//! records; nothing outside this module sees the upstream field names.

use chrono::DateTime;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

use crate::models::{Block, Transaction};

const MAX_ERROR_BODY: usize = 256;
/// Integer timestamps above this are taken to be milliseconds.
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

#[derive(thiserror::Error, Debug)]
pub enum ExplorerError {
    #[error("rate limited by block explorer")]
    RateLimited,
    #[error("block explorer returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("request to block explorer failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected block explorer response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid block explorer url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ExplorerError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}

#[derive(Clone, Debug)]
pub struct ExplorerClient {
    http: reqwest::Client,
    base_url: String,
}

impl ExplorerClient {
    pub fn new(base_url: &str) -> Result<Self, ExplorerError> {
        Url::parse(base_url)?;
        let http = reqwest::Client::builder()
            .no_proxy()
            .user_agent(concat!("chain-pulse/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Most recent blocks, newest first as the explorer lists them.
    pub async fn list_recent_blocks(&self, limit: usize) -> Result<Vec<Block>, ExplorerError> {
        let base_query = [("type".to_string(), "block".to_string())];
        let raw: Vec<RawBlock> = self.collect_pages("blocks", &base_query, limit).await?;
        Ok(raw.into_iter().map(normalize_block).collect())
    }

    pub async fn get_transactions_for_block(
        &self,
        block_number: u64,
        page_size: usize,
    ) -> Result<Vec<Transaction>, ExplorerError> {
        let path = format!("blocks/{block_number}/transactions");
        let raw: Vec<RawTransaction> = self.collect_pages(&path, &[], page_size).await?;
        Ok(raw.into_iter().map(normalize_tx).collect())
    }

    /// Follows `next_page_params` until `limit` items are gathered or the
    /// explorer runs out of pages.
    async fn collect_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        base_query: &[(String, String)],
        limit: usize,
    ) -> Result<Vec<T>, ExplorerError> {
        let mut out = Vec::new();
        let mut cursor: Vec<(String, String)> = Vec::new();

        while out.len() < limit {
            let query: Vec<(String, String)> =
                base_query.iter().cloned().chain(cursor.drain(..)).collect();
            let page: Page<T> = self.get_page(path, &query).await?;
            tracing::debug!(path, items = page.items.len(), "fetched explorer page");

            let exhausted = page.items.is_empty();
            out.extend(page.items);

            match page.next_page_params {
                Some(params) if !exhausted => cursor = query_pairs(params),
                _ => break,
            }
        }

        out.truncate(limit);
        Ok(out)
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<Page<T>, ExplorerError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ExplorerError::RateLimited);
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(ExplorerError::Api {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    #[serde(default)]
    next_page_params: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct RawBlock {
    #[serde(default)]
    hash: String,
    height: u64,
    #[serde(default)]
    timestamp: Option<Value>,
    #[serde(default)]
    transaction_count: Option<u64>,
    #[serde(default)]
    tx_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawTransaction {
    #[serde(default)]
    hash: String,
    #[serde(default)]
    from: Option<RawAddress>,
    #[serde(default)]
    to: Option<RawAddress>,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    gas_price: Option<Value>,
    #[serde(default)]
    timestamp: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAddress {
    Object { hash: String },
    Plain(String),
}

fn normalize_block(raw: RawBlock) -> Block {
    Block {
        hash: raw.hash,
        number: raw.height,
        timestamp: raw.timestamp.map(timestamp_seconds).unwrap_or_default(),
        transaction_count: raw.transaction_count.or(raw.tx_count).unwrap_or_default(),
    }
}

fn normalize_tx(raw: RawTransaction) -> Transaction {
    Transaction {
        hash: raw.hash,
        from: raw.from.map(RawAddress::into_hash).unwrap_or_default(),
        to: raw.to.map(RawAddress::into_hash),
        value: raw.value.map(amount_string).unwrap_or_default(),
        gas_price: raw.gas_price.map(amount_string).unwrap_or_default(),
        timestamp: raw.timestamp.map(timestamp_seconds).unwrap_or_default(),
    }
}

impl RawAddress {
    fn into_hash(self) -> String {
        match self {
            Self::Object { hash } | Self::Plain(hash) => hash,
        }
    }
}

/// Amounts usually arrive as decimal strings; small ones occasionally as
/// JSON integers. Anything else becomes empty and decodes to zero.
fn amount_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Number(n) if n.is_u64() => n.to_string(),
        _ => String::new(),
    }
}

/// Unix seconds from an integer, float, numeric string or RFC 3339 string.
/// Anything else becomes 0 with a warning rather than failing the page.
fn timestamp_seconds(raw: Value) -> i64 {
    match raw {
        Value::Number(n) => match n.as_i64() {
            Some(secs) => epoch_seconds(secs),
            None => epoch_seconds(n.as_f64().unwrap_or_default() as i64),
        },
        Value::String(text) => {
            let text = text.trim();
            if let Ok(n) = text.parse::<i64>() {
                return epoch_seconds(n);
            }
            match DateTime::parse_from_rfc3339(text) {
                Ok(dt) => dt.timestamp(),
                Err(err) => {
                    tracing::warn!(timestamp = text, error = %err, "unparsable timestamp, using 0");
                    0
                }
            }
        }
        other => {
            tracing::warn!(timestamp = %other, "unexpected timestamp type, using 0");
            0
        }
    }
}

fn epoch_seconds(n: i64) -> i64 {
    if n > MILLIS_THRESHOLD {
        n / 1000
    } else {
        n
    }
}

fn query_pairs(params: Map<String, Value>) -> Vec<(String, String)> {
    params
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect()
}
