//! Core business logic abstractions

pub mod config;
pub mod currency;
pub mod error;
pub mod log;
pub mod policy;
pub mod rate;
pub mod source;
pub mod store;

// Re-export main types for cleaner imports
pub use error::RateError;
pub use policy::{Clock, RefreshAction, SystemClock};
pub use rate::{ExchangeRateInfo, LastViewedScreen, RateRecord, Trend};
pub use source::{FetchError, RateSnapshot, RateSource};
pub use store::{RateStore, StorageError};
