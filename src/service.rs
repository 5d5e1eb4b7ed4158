//! Rate cache orchestration: decides between cache and network on each request

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::core::policy::{self, Clock, RefreshAction, SystemClock};
use crate::core::rate::{ExchangeRateInfo, LastViewedScreen, RateRecord, sort_for_list};
use crate::core::{RateError, RateSource, RateStore};

/// Where the app should reopen, resolved against the cached rates.
#[derive(Debug, Clone, PartialEq)]
pub enum ResumeTarget {
    RateList,
    Calculator(ExchangeRateInfo),
}

/// Serves rates from the store, refreshing from the source when the server's
/// next-update time has passed.
///
/// Refreshes are serialized on the store's refresh guard, so any number of
/// services may share one store.
#[derive(Clone)]
pub struct RateCacheService {
    source: Arc<dyn RateSource>,
    store: Arc<dyn RateStore>,
    clock: Arc<dyn Clock>,
}

impl RateCacheService {
    pub fn new(source: Arc<dyn RateSource>, store: Arc<dyn RateStore>) -> Self {
        Self {
            source,
            store,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns all cached rates, favorites first then by code.
    ///
    /// A failed fetch leaves the store exactly as it was.
    pub async fn get_rates(&self) -> Result<Vec<RateRecord>, RateError> {
        let _guard = self.store.refresh_guard().lock().await;

        let cached = self.store.get_all().await?;
        let stored_next = self.store.get_next_update().await?;
        let now = self.clock.now_unix();
        let action = policy::decide(now, stored_next, cached.is_empty());
        debug!(?action, now, ?stored_next, cached = cached.len(), "Refresh decision");

        let mut records = match action {
            RefreshAction::FullFetch => self.full_fetch().await?,
            RefreshAction::IncrementalUpdate => self.incremental_update().await?,
            RefreshAction::ServeCache => cached,
        };
        sort_for_list(&mut records);
        Ok(records)
    }

    async fn full_fetch(&self) -> Result<Vec<RateRecord>, RateError> {
        let snapshot = self.source.fetch_rates().await?;
        let records: Vec<RateRecord> = snapshot
            .rates
            .iter()
            .map(|(code, &rate)| RateRecord::fresh(code.clone(), rate))
            .collect();

        self.store.replace_all(records.clone()).await?;
        self.store
            .set_next_update(snapshot.next_update_at_unix)
            .await?;
        info!(
            count = records.len(),
            next_update = snapshot.next_update_at_unix,
            "Populated rate cache"
        );
        Ok(records)
    }

    async fn incremental_update(&self) -> Result<Vec<RateRecord>, RateError> {
        let snapshot = self.source.fetch_rates().await?;

        self.store.merge_rates(&snapshot.rates).await?;
        // set replaces the singleton; clearing first would leave a populated
        // cache without a timestamp if the write failed, forcing a full fetch
        self.store
            .set_next_update(snapshot.next_update_at_unix)
            .await?;
        info!(
            count = snapshot.rates.len(),
            next_update = snapshot.next_update_at_unix,
            "Updated cached rates"
        );
        Ok(self.store.get_all().await?)
    }

    /// Flips the favorite flag of `code` and returns the full, re-sorted list.
    /// Unknown codes leave the list unchanged. Never touches the network.
    pub async fn toggle_favorite(&self, code: &str) -> Result<Vec<RateRecord>, RateError> {
        let _guard = self.store.refresh_guard().lock().await;

        let current = self
            .store
            .get_all()
            .await?
            .into_iter()
            .find(|r| r.currency_code == code)
            .map(|r| r.is_favorite);
        match current {
            Some(is_favorite) => {
                self.store.set_favorite(code, !is_favorite).await?;
                debug!(code, favorite = !is_favorite, "Toggled favorite");
            }
            None => debug!("Cannot toggle favorite for unknown code: {}", code),
        }

        let mut records = self.store.get_all().await?;
        sort_for_list(&mut records);
        Ok(records)
    }

    /// Cached rate for one code, without any refresh.
    pub async fn rate_info(&self, code: &str) -> Result<Option<ExchangeRateInfo>, RateError> {
        Ok(self
            .store
            .get_all()
            .await?
            .iter()
            .find(|r| r.currency_code == code)
            .map(ExchangeRateInfo::from))
    }

    /// Persists the current screen in the background.
    ///
    /// Failures are logged; the returned handle may be awaited or dropped.
    pub fn record_screen(&self, screen: LastViewedScreen) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            match store.set_last_screen(&screen).await {
                Ok(()) => debug!(?screen, "Recorded last viewed screen"),
                Err(e) => warn!("Failed to record last viewed screen: {}", e),
            }
        })
    }

    pub async fn resume_screen(&self) -> Result<LastViewedScreen, RateError> {
        Ok(self.store.get_last_screen().await?)
    }

    /// Resolves the persisted screen. A calculator for a currency that is no
    /// longer cached falls back to the list.
    pub async fn resume_target(&self) -> Result<ResumeTarget, RateError> {
        match self.resume_screen().await? {
            LastViewedScreen::ExchangeRateList => Ok(ResumeTarget::RateList),
            LastViewedScreen::Calculator { currency_code } => {
                match self.rate_info(&currency_code).await? {
                    Some(info) => Ok(ResumeTarget::Calculator(info)),
                    None => {
                        debug!("No cached rate for {}, resuming to list", currency_code);
                        Ok(ResumeTarget::RateList)
                    }
                }
            }
        }
    }
}
