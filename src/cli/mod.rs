//! Terminal front-end for the rate cache

pub mod convert;
pub mod rates;
pub mod setup;
pub mod ui;
