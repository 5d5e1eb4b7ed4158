pub mod er_api;

pub use er_api::ErApiRateSource;
