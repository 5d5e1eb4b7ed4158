//! View models translating cache results into screen state

pub mod calculator;
pub mod exchange_rate;

pub use calculator::{CalculatorAction, CalculatorState, CalculatorViewModel};
pub use exchange_rate::{ExchangeRateHandle, ExchangeRateViewModel, RateAction, RateListState};
