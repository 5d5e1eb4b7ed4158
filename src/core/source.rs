//! Remote rate source abstraction

use async_trait::async_trait;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Bad response: {0}")]
    BadResponse(String),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

/// Rates quoted against the base currency, with the server's validity window.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSnapshot {
    pub rates: BTreeMap<String, f64>,
    pub last_update_at_unix: i64,
    pub next_update_at_unix: i64,
}

#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rates(&self) -> Result<RateSnapshot, FetchError>;
}
