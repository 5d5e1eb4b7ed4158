use crate::core::rate::{LastViewedScreen, RateRecord};
use crate::core::store::{RateStore, StorageError};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Default)]
struct State {
    records: HashMap<String, RateRecord>,
    next_update: Option<i64>,
    last_screen: Option<LastViewedScreen>,
}

/// In-memory rate store. Every call runs under a single lock.
#[derive(Default)]
pub struct MemoryRateStore {
    inner: Mutex<State>,
    refresh: Mutex<()>,
}

impl MemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `records`, e.g. for tests.
    pub fn with_records(records: impl IntoIterator<Item = RateRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|r| (r.currency_code.clone(), r))
            .collect();
        Self {
            inner: Mutex::new(State {
                records,
                ..State::default()
            }),
            refresh: Mutex::new(()),
        }
    }
}

#[async_trait]
impl RateStore for MemoryRateStore {
    fn refresh_guard(&self) -> &Mutex<()> {
        &self.refresh
    }

    async fn get_all(&self) -> Result<Vec<RateRecord>, StorageError> {
        let state = self.inner.lock().await;
        Ok(state.records.values().cloned().collect())
    }

    async fn replace_all(&self, records: Vec<RateRecord>) -> Result<(), StorageError> {
        let mut state = self.inner.lock().await;
        state.records = records
            .into_iter()
            .map(|r| (r.currency_code.clone(), r))
            .collect();
        debug!(count = state.records.len(), "Replaced all rate records");
        Ok(())
    }

    async fn merge_rates(&self, rates: &BTreeMap<String, f64>) -> Result<(), StorageError> {
        let mut state = self.inner.lock().await;
        for (code, &rate) in rates {
            state
                .records
                .entry(code.clone())
                .and_modify(|record| record.apply_rate(rate))
                .or_insert_with(|| RateRecord::fresh(code.clone(), rate));
        }
        debug!(count = rates.len(), "Merged rates");
        Ok(())
    }

    async fn set_favorite(&self, code: &str, value: bool) -> Result<(), StorageError> {
        let mut state = self.inner.lock().await;
        match state.records.get_mut(code) {
            Some(record) => record.is_favorite = value,
            None => debug!("Ignoring favorite for unknown code: {}", code),
        }
        Ok(())
    }

    async fn get_next_update(&self) -> Result<Option<i64>, StorageError> {
        Ok(self.inner.lock().await.next_update)
    }

    async fn set_next_update(&self, next_update_at_unix: i64) -> Result<(), StorageError> {
        self.inner.lock().await.next_update = Some(next_update_at_unix);
        Ok(())
    }

    async fn clear_next_update(&self) -> Result<(), StorageError> {
        self.inner.lock().await.next_update = None;
        Ok(())
    }

    async fn get_last_screen(&self) -> Result<LastViewedScreen, StorageError> {
        Ok(self
            .inner
            .lock()
            .await
            .last_screen
            .clone()
            .unwrap_or_default())
    }

    async fn set_last_screen(&self, screen: &LastViewedScreen) -> Result<(), StorageError> {
        self.inner.lock().await.last_screen = Some(screen.clone());
        Ok(())
    }
}
