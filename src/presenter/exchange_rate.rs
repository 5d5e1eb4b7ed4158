use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::core::RateError;
use crate::core::rate::{ExchangeRateInfo, RateRecord};
use crate::service::RateCacheService;

#[derive(Debug, Clone, PartialEq)]
pub enum RateAction {
    /// Load rates through the cache.
    Fetch,
    /// Narrow the last loaded list by code or name.
    ApplyFilter(String),
    ToggleFavorite(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RateListState {
    RatesLoaded(Vec<ExchangeRateInfo>),
    Error(RateError),
}

/// State holder for the rate list screen.
pub struct ExchangeRateViewModel {
    service: RateCacheService,
    all_rates: Vec<ExchangeRateInfo>,
    state: RateListState,
}

fn to_infos(records: Vec<RateRecord>) -> Vec<ExchangeRateInfo> {
    records.into_iter().map(ExchangeRateInfo::from).collect()
}

impl ExchangeRateViewModel {
    pub fn new(service: RateCacheService) -> Self {
        Self {
            service,
            all_rates: Vec::new(),
            state: RateListState::RatesLoaded(Vec::new()),
        }
    }

    pub fn state(&self) -> &RateListState {
        &self.state
    }

    pub async fn handle(&mut self, action: RateAction) -> RateListState {
        debug!(?action, "Handling rate list action");
        self.state = match action {
            RateAction::Fetch => self.fetch().await,
            RateAction::ApplyFilter(keyword) => self.filter(&keyword),
            RateAction::ToggleFavorite(code) => self.toggle_favorite(&code).await,
        };
        self.state.clone()
    }

    async fn fetch(&mut self) -> RateListState {
        match self.service.get_rates().await {
            Ok(records) => {
                self.all_rates = to_infos(records);
                RateListState::RatesLoaded(self.all_rates.clone())
            }
            Err(e) => RateListState::Error(e),
        }
    }

    fn filter(&self, keyword: &str) -> RateListState {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return RateListState::RatesLoaded(self.all_rates.clone());
        }
        RateListState::RatesLoaded(
            self.all_rates
                .iter()
                .filter(|info| info.matches(keyword))
                .cloned()
                .collect(),
        )
    }

    async fn toggle_favorite(&mut self, code: &str) -> RateListState {
        match self.service.toggle_favorite(code).await {
            Ok(records) => {
                self.all_rates = to_infos(records);
                RateListState::RatesLoaded(self.all_rates.clone())
            }
            Err(e) => RateListState::Error(e),
        }
    }

    /// Moves the view model onto its own task, fed by an action channel.
    pub fn spawn(mut self) -> ExchangeRateHandle {
        let (action_tx, mut action_rx) = mpsc::channel(16);
        let (state_tx, state_rx) = watch::channel(self.state.clone());

        let task = tokio::spawn(async move {
            while let Some(action) = action_rx.recv().await {
                let state = self.handle(action).await;
                state_tx.send_replace(state);
            }
            debug!("Rate list action channel closed");
        });

        ExchangeRateHandle {
            actions: action_tx,
            states: state_rx,
            task,
        }
    }
}

/// Handle to a spawned [`ExchangeRateViewModel`].
pub struct ExchangeRateHandle {
    actions: mpsc::Sender<RateAction>,
    states: watch::Receiver<RateListState>,
    task: JoinHandle<()>,
}

impl ExchangeRateHandle {
    pub async fn send(&self, action: RateAction) -> Result<(), mpsc::error::SendError<RateAction>> {
        self.actions.send(action).await
    }

    pub fn subscribe(&self) -> watch::Receiver<RateListState> {
        self.states.clone()
    }

    pub fn state(&self) -> RateListState {
        self.states.borrow().clone()
    }

    /// Closes the action channel and waits for queued actions to finish.
    pub async fn shutdown(self) {
        drop(self.actions);
        let _ = self.task.await;
    }
}
