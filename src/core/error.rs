//! Errors returned by the rate cache service

use super::source::FetchError;
use super::store::StorageError;

/// Failure of a rate cache operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl RateError {
    /// Message suitable for showing to the user, chosen by variant.
    pub fn user_message(&self) -> &'static str {
        match self {
            RateError::Fetch(FetchError::InvalidEndpoint(_)) => {
                "The exchange rate service address is invalid. Check your configuration."
            }
            RateError::Fetch(FetchError::BadResponse(_)) => {
                "Could not reach the exchange rate service. Please try again later."
            }
            RateError::Fetch(FetchError::MalformedPayload(_)) => {
                "The exchange rate service returned data that could not be read."
            }
            RateError::Storage(_) => "Saved exchange rates could not be accessed.",
        }
    }
}
