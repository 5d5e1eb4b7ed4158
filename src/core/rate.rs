//! Rate records and the read models derived from them

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::Display;

use super::currency::display_name;

/// Absolute rate difference at or below which a change is considered flat.
pub const TREND_EPSILON: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Flat,
}

impl Trend {
    /// Direction of a move from `old` to `new`.
    pub fn between(old: f64, new: f64) -> Self {
        if (new - old).abs() > TREND_EPSILON {
            if new > old { Trend::Up } else { Trend::Down }
        } else {
            Trend::Flat
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Up => "▲",
            Trend::Down => "▼",
            Trend::Flat => "-",
        }
    }
}

impl Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Trend::Up => "up",
                Trend::Down => "down",
                Trend::Flat => "flat",
            }
        )
    }
}

/// One cached rate, quoted against the base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRecord {
    pub currency_code: String,
    pub rate: f64,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub trend: Trend,
}

impl RateRecord {
    /// A record as first inserted: not a favorite, no trend yet.
    pub fn fresh(currency_code: impl Into<String>, rate: f64) -> Self {
        Self {
            currency_code: currency_code.into(),
            rate,
            is_favorite: false,
            trend: Trend::Flat,
        }
    }

    /// Overwrites the rate, deriving the trend from the previous value.
    pub fn apply_rate(&mut self, new_rate: f64) {
        self.trend = Trend::between(self.rate, new_rate);
        self.rate = new_rate;
    }
}

/// Favorites first, then by currency code.
pub fn list_order(a: &RateRecord, b: &RateRecord) -> Ordering {
    b.is_favorite
        .cmp(&a.is_favorite)
        .then_with(|| a.currency_code.cmp(&b.currency_code))
}

pub fn sort_for_list(records: &mut [RateRecord]) {
    records.sort_by(list_order);
}

/// Plain alphabetical order, ignoring favorites.
pub fn sort_alphabetical(records: &mut [RateRecord]) {
    records.sort_by(|a, b| a.currency_code.cmp(&b.currency_code));
}

/// The screen a user last had open.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum LastViewedScreen {
    #[default]
    ExchangeRateList,
    Calculator { currency_code: String },
}

/// A rate record joined with the display name of its currency.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeRateInfo {
    pub currency_code: String,
    pub name: String,
    pub rate: f64,
    pub is_favorite: bool,
    pub trend: Trend,
}

impl ExchangeRateInfo {
    /// Case-insensitive substring match on code or display name.
    pub fn matches(&self, keyword: &str) -> bool {
        let keyword = keyword.to_lowercase();
        self.currency_code.to_lowercase().contains(&keyword)
            || self.name.to_lowercase().contains(&keyword)
    }
}

impl From<&RateRecord> for ExchangeRateInfo {
    fn from(record: &RateRecord) -> Self {
        Self {
            currency_code: record.currency_code.clone(),
            name: display_name(&record.currency_code).to_string(),
            rate: record.rate,
            is_favorite: record.is_favorite,
            trend: record.trend,
        }
    }
}

impl From<RateRecord> for ExchangeRateInfo {
    fn from(record: RateRecord) -> Self {
        Self::from(&record)
    }
}
