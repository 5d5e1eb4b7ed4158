//! Durable storage abstraction for cached rates

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

use super::rate::{LastViewedScreen, RateRecord};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Stored value could not be encoded or decoded: {0}")]
    Codec(String),
}

/// Storage for rate records and the two singleton records.
///
/// Every call is atomic: implementations serialize calls against each other and
/// either apply all of a multi-record write or none of it.
#[async_trait]
pub trait RateStore: Send + Sync {
    /// Guard held by callers across a read-fetch-write sequence so that
    /// refreshes of the same store never interleave. Individual calls do not
    /// take it.
    fn refresh_guard(&self) -> &Mutex<()>;

    async fn get_all(&self) -> Result<Vec<RateRecord>, StorageError>;

    /// Drops every stored record and inserts `records` as given.
    async fn replace_all(&self, records: Vec<RateRecord>) -> Result<(), StorageError>;

    /// Overwrites known codes (deriving their trend) and inserts unknown ones.
    /// Stored codes missing from `rates` are left alone.
    async fn merge_rates(&self, rates: &BTreeMap<String, f64>) -> Result<(), StorageError>;

    /// Sets the favorite flag; unknown codes are ignored.
    async fn set_favorite(&self, code: &str, value: bool) -> Result<(), StorageError>;

    async fn get_next_update(&self) -> Result<Option<i64>, StorageError>;
    async fn set_next_update(&self, next_update_at_unix: i64) -> Result<(), StorageError>;
    async fn clear_next_update(&self) -> Result<(), StorageError>;

    /// Defaults to the rate list when nothing has been persisted.
    async fn get_last_screen(&self) -> Result<LastViewedScreen, StorageError>;
    async fn set_last_screen(&self, screen: &LastViewedScreen) -> Result<(), StorageError>;
}
