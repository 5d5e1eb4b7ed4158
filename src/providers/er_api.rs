use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::core::config::ErApiProviderConfig;
use crate::core::source::{FetchError, RateSnapshot, RateSource};

/// Every rate is quoted against this currency.
pub const BASE_CURRENCY: &str = "USD";

/// Rate source backed by the open.er-api.com `latest` endpoint.
pub struct ErApiRateSource {
    base_url: String,
    timeout: Duration,
}

impl ErApiRateSource {
    pub fn new(base_url: &str) -> Self {
        ErApiRateSource {
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn from_config(config: &ErApiProviderConfig) -> Self {
        ErApiRateSource {
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn endpoint(&self) -> Result<Url, FetchError> {
        let raw = format!(
            "{}/v6/latest/{}",
            self.base_url.trim_end_matches('/'),
            BASE_CURRENCY
        );
        Url::parse(&raw).map_err(|e| FetchError::InvalidEndpoint(format!("{raw}: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct ErApiResponse {
    result: Option<String>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    time_last_update_unix: Option<i64>,
    time_next_update_unix: Option<i64>,
    rates: Option<BTreeMap<String, f64>>,
}

impl ErApiResponse {
    fn into_snapshot(self) -> Result<RateSnapshot, FetchError> {
        if let Some(result) = self.result.as_deref() {
            if result != "success" {
                return Err(FetchError::BadResponse(format!(
                    "API result '{}' ({})",
                    result,
                    self.error_type.as_deref().unwrap_or("unknown error")
                )));
            }
        }

        let missing = |field: &str| FetchError::MalformedPayload(format!("missing field `{field}`"));
        let last_update_at_unix = self
            .time_last_update_unix
            .ok_or_else(|| missing("time_last_update_unix"))?;
        let next_update_at_unix = self
            .time_next_update_unix
            .ok_or_else(|| missing("time_next_update_unix"))?;
        let raw_rates = self.rates.ok_or_else(|| missing("rates"))?;

        let mut rates = BTreeMap::new();
        for (code, rate) in raw_rates {
            if !rate.is_finite() || rate <= 0.0 {
                warn!("Dropping invalid rate {} for {}", rate, code);
                continue;
            }
            match rates.entry(code.trim().to_uppercase()) {
                Entry::Vacant(slot) => {
                    slot.insert(rate);
                }
                Entry::Occupied(kept) => warn!(
                    "Ignoring rate {} for {}, already have {} for {}",
                    rate,
                    code,
                    kept.get(),
                    kept.key()
                ),
            }
        }

        Ok(RateSnapshot {
            rates,
            last_update_at_unix,
            next_update_at_unix,
        })
    }
}

#[async_trait]
impl RateSource for ErApiRateSource {
    #[instrument(name = "ErApiFetch", skip(self), fields(base = BASE_CURRENCY))]
    async fn fetch_rates(&self) -> Result<RateSnapshot, FetchError> {
        let url = self.endpoint()?;
        debug!("Requesting exchange rates from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("xrate/0.1")
            .timeout(self.timeout)
            .build()
            .map_err(|e| FetchError::BadResponse(format!("Client error: {e}")))?;

        let response = client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::BadResponse(format!("Request error: {e} for URL: {url}")))?;

        if !response.status().is_success() {
            return Err(FetchError::BadResponse(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::BadResponse(format!("Failed to read body: {e}")))?;

        let data: ErApiResponse = serde_json::from_str(&text).map_err(|e| {
            FetchError::MalformedPayload(format!("Failed to parse JSON response: {e}"))
        })?;

        let snapshot = data.into_snapshot()?;
        debug!(
            count = snapshot.rates.len(),
            next_update = snapshot.next_update_at_unix,
            "Received exchange rates"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v6/latest/USD"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn test_successful_rates_fetch() {
        let mock_response = r#"{
            "result": "success",
            "base_code": "USD",
            "time_last_update_unix": 1744588951,
            "time_next_update_unix": 1744676481,
            "rates": {
                "USD": 1,
                "EUR": 0.8812,
                "KRW": 1425.61,
                "jpy": 143.5
            }
        }"#;

        let mock_server = create_mock_server(200, mock_response).await;
        let source = ErApiRateSource::new(&mock_server.uri());
        let snapshot = source.fetch_rates().await.unwrap();

        assert_eq!(snapshot.last_update_at_unix, 1744588951);
        assert_eq!(snapshot.next_update_at_unix, 1744676481);
        assert_eq!(snapshot.rates.len(), 4);
        assert_eq!(snapshot.rates["USD"], 1.0);
        assert_eq!(snapshot.rates["KRW"], 1425.61);
        assert_eq!(snapshot.rates["JPY"], 143.5);
    }

    #[tokio::test]
    async fn test_trailing_slash_in_base_url() {
        let mock_response = r#"{
            "time_last_update_unix": 1,
            "time_next_update_unix": 2,
            "rates": {"USD": 1}
        }"#;
        let mock_server = create_mock_server(200, mock_response).await;
        let source = ErApiRateSource::new(&format!("{}/", mock_server.uri()));

        let snapshot = source.fetch_rates().await.unwrap();
        assert_eq!(snapshot.rates.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_rates_are_dropped() {
        let mock_response = r#"{
            "result": "success",
            "time_last_update_unix": 1,
            "time_next_update_unix": 2,
            "rates": {"USD": 1, "BAD": 0, "NEG": -3.5}
        }"#;
        let mock_server = create_mock_server(200, mock_response).await;
        let source = ErApiRateSource::new(&mock_server.uri());

        let snapshot = source.fetch_rates().await.unwrap();
        assert_eq!(snapshot.rates.keys().collect::<Vec<_>>(), vec!["USD"]);
    }

    #[tokio::test]
    async fn test_colliding_codes_keep_first_rate() {
        let mock_response = r#"{
            "result": "success",
            "time_last_update_unix": 1,
            "time_next_update_unix": 2,
            "rates": {"jpy": 150.0, "JPY": 143.5, " eur ": 0.88}
        }"#;
        let mock_server = create_mock_server(200, mock_response).await;
        let source = ErApiRateSource::new(&mock_server.uri());

        let snapshot = source.fetch_rates().await.unwrap();
        assert_eq!(snapshot.rates.len(), 2);
        assert_eq!(snapshot.rates["JPY"], 143.5);
        assert_eq!(snapshot.rates["EUR"], 0.88);
    }

    #[tokio::test]
    async fn test_server_error_is_bad_response() {
        let mock_server = create_mock_server(500, "").await;
        let source = ErApiRateSource::new(&mock_server.uri());

        let result = source.fetch_rates().await;
        assert_eq!(
            result.unwrap_err(),
            FetchError::BadResponse("HTTP error: 500 Internal Server Error".to_string())
        );
    }

    #[tokio::test]
    async fn test_api_error_result_is_bad_response() {
        let mock_response = r#"{"result": "error", "error-type": "unsupported-code"}"#;
        let mock_server = create_mock_server(200, mock_response).await;
        let source = ErApiRateSource::new(&mock_server.uri());

        match source.fetch_rates().await {
            Err(FetchError::BadResponse(msg)) => assert!(msg.contains("unsupported-code")),
            other => panic!("Expected BadResponse, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_payload() {
        let mock_response = r#"{"result": "success", "rates": "nope"}"#;
        let mock_server = create_mock_server(200, mock_response).await;
        let source = ErApiRateSource::new(&mock_server.uri());

        match source.fetch_rates().await {
            Err(FetchError::MalformedPayload(msg)) => {
                assert!(msg.contains("Failed to parse JSON response"))
            }
            other => panic!("Expected MalformedPayload, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_timestamps_is_malformed() {
        let mock_response = r#"{"result": "success", "rates": {"USD": 1}}"#;
        let mock_server = create_mock_server(200, mock_response).await;
        let source = ErApiRateSource::new(&mock_server.uri());

        assert_eq!(
            source.fetch_rates().await.unwrap_err(),
            FetchError::MalformedPayload("missing field `time_last_update_unix`".to_string())
        );
    }

    #[tokio::test]
    async fn test_invalid_endpoint() {
        let source = ErApiRateSource::new("not a url");
        assert!(matches!(
            source.fetch_rates().await,
            Err(FetchError::InvalidEndpoint(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_bad_response() {
        let source = ErApiRateSource::new("http://127.0.0.1:1");
        assert!(matches!(
            source.fetch_rates().await,
            Err(FetchError::BadResponse(_))
        ));
    }
}
