use crate::core::rate::ExchangeRateInfo;
use crate::providers::er_api::BASE_CURRENCY;

#[derive(Debug, Clone, PartialEq)]
pub enum CalculatorAction {
    SubmitInput(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CalculatorState {
    Result(String),
    Error(String),
}

/// Converts base-currency amounts using one cached rate.
pub struct CalculatorViewModel {
    exchange_rate: ExchangeRateInfo,
    state: CalculatorState,
}

impl CalculatorViewModel {
    pub fn new(exchange_rate: ExchangeRateInfo) -> Self {
        Self {
            exchange_rate,
            state: CalculatorState::Result("0".to_string()),
        }
    }

    pub fn exchange_rate(&self) -> &ExchangeRateInfo {
        &self.exchange_rate
    }

    pub fn currency_code(&self) -> &str {
        &self.exchange_rate.currency_code
    }

    pub fn state(&self) -> &CalculatorState {
        &self.state
    }

    pub fn handle(&mut self, action: CalculatorAction) -> &CalculatorState {
        match action {
            CalculatorAction::SubmitInput(input) => {
                self.state = self.calculate(&input);
            }
        }
        &self.state
    }

    fn calculate(&self, input: &str) -> CalculatorState {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return CalculatorState::Error("Please enter an amount".to_string());
        }
        let amount = match trimmed.parse::<f64>() {
            Ok(amount) if amount.is_finite() => amount,
            _ => return CalculatorState::Error("Please enter a valid number".to_string()),
        };

        let converted = amount * self.exchange_rate.rate;
        CalculatorState::Result(format!(
            "{}{:.2} → {:.2} {}",
            base_symbol(),
            amount,
            converted,
            self.exchange_rate.currency_code
        ))
    }
}

fn base_symbol() -> &'static str {
    match BASE_CURRENCY {
        "USD" => "$",
        _ => "",
    }
}
