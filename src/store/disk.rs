use crate::core::rate::{LastViewedScreen, RateRecord};
use crate::core::store::{RateStore, StorageError};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::debug;

const RATES_PARTITION: &str = "rates";
const META_PARTITION: &str = "meta";
const NEXT_UPDATE_KEY: &str = "next_update";
const LAST_SCREEN_KEY: &str = "last_screen";

impl From<fjall::Error> for StorageError {
    fn from(err: fjall::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Codec(err.to_string())
    }
}

/// Rate store persisted in a fjall keyspace.
///
/// Records live in the `rates` partition keyed by currency code, the two
/// singletons in `meta`. Multi-record writes are committed as one batch.
pub struct DiskRateStore {
    keyspace: Keyspace,
    rates: PartitionHandle,
    meta: PartitionHandle,
    lock: Mutex<()>,
    refresh: Mutex<()>,
}

impl DiskRateStore {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(path).map_err(|e| StorageError::Backend(e.to_string()))?;

        let keyspace = fjall::Config::new(path).open()?;
        let rates = keyspace.open_partition(RATES_PARTITION, PartitionCreateOptions::default())?;
        let meta = keyspace.open_partition(META_PARTITION, PartitionCreateOptions::default())?;
        debug!("Opened rate store at {}", path.display());

        Ok(Self {
            keyspace,
            rates,
            meta,
            lock: Mutex::new(()),
            refresh: Mutex::new(()),
        })
    }

    fn read_records(&self) -> Result<Vec<RateRecord>, StorageError> {
        self.rates
            .iter()
            .map(|item| {
                let (_, value) = item?;
                Ok(serde_json::from_slice(&value)?)
            })
            .collect()
    }

    fn read_record(&self, code: &str) -> Result<Option<RateRecord>, StorageError> {
        match self.rates.get(code.as_bytes())? {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }

    fn write_meta<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        self.meta.insert(key.as_bytes(), serde_json::to_vec(value)?)?;
        self.persist()
    }

    fn persist(&self) -> Result<(), StorageError> {
        self.keyspace.persist(PersistMode::SyncData)?;
        Ok(())
    }
}

#[async_trait]
impl RateStore for DiskRateStore {
    fn refresh_guard(&self) -> &Mutex<()> {
        &self.refresh
    }

    async fn get_all(&self) -> Result<Vec<RateRecord>, StorageError> {
        let _guard = self.lock.lock().await;
        self.read_records()
    }

    async fn replace_all(&self, records: Vec<RateRecord>) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;

        let incoming: HashSet<&str> = records.iter().map(|r| r.currency_code.as_str()).collect();
        let mut batch = self.keyspace.batch();
        for item in self.rates.iter() {
            let (key, _) = item?;
            let stale = std::str::from_utf8(&key).map_or(true, |code| !incoming.contains(code));
            if stale {
                batch.remove(&self.rates, key);
            }
        }
        for record in &records {
            batch.insert(
                &self.rates,
                record.currency_code.as_bytes(),
                serde_json::to_vec(record)?,
            );
        }
        batch.commit()?;
        self.persist()?;

        debug!(count = records.len(), "Replaced all rate records");
        Ok(())
    }

    async fn merge_rates(&self, rates: &BTreeMap<String, f64>) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;

        let mut batch = self.keyspace.batch();
        for (code, &rate) in rates {
            let record = match self.read_record(code)? {
                Some(mut existing) => {
                    existing.apply_rate(rate);
                    existing
                }
                None => RateRecord::fresh(code.clone(), rate),
            };
            batch.insert(&self.rates, code.as_bytes(), serde_json::to_vec(&record)?);
        }
        batch.commit()?;
        self.persist()?;

        debug!(count = rates.len(), "Merged rates");
        Ok(())
    }

    async fn set_favorite(&self, code: &str, value: bool) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;

        let Some(mut record) = self.read_record(code)? else {
            debug!("Ignoring favorite for unknown code: {}", code);
            return Ok(());
        };
        record.is_favorite = value;
        self.rates
            .insert(code.as_bytes(), serde_json::to_vec(&record)?)?;
        self.persist()
    }

    async fn get_next_update(&self) -> Result<Option<i64>, StorageError> {
        let _guard = self.lock.lock().await;
        match self.meta.get(NEXT_UPDATE_KEY.as_bytes())? {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }

    async fn set_next_update(&self, next_update_at_unix: i64) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        self.write_meta(NEXT_UPDATE_KEY, &next_update_at_unix)
    }

    async fn clear_next_update(&self) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        self.meta.remove(NEXT_UPDATE_KEY.as_bytes())?;
        self.persist()
    }

    async fn get_last_screen(&self) -> Result<LastViewedScreen, StorageError> {
        let _guard = self.lock.lock().await;
        match self.meta.get(LAST_SCREEN_KEY.as_bytes())? {
            Some(value) => Ok(serde_json::from_slice(&value)?),
            None => Ok(LastViewedScreen::default()),
        }
    }

    async fn set_last_screen(&self, screen: &LastViewedScreen) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        self.write_meta(LAST_SCREEN_KEY, screen)
    }
}
