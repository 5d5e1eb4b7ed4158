use std::fs;
use tracing::info;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xrate::core::config::AppConfig;
use xrate::core::rate::{LastViewedScreen, Trend};
use xrate::service::ResumeTarget;

const RATES_PATH: &str = "/v6/latest/USD";

fn rates_body(next_update: i64, krw: f64) -> String {
    format!(
        r#"{{
            "result": "success",
            "base_code": "USD",
            "time_last_update_unix": {last},
            "time_next_update_unix": {next_update},
            "rates": {{
                "USD": 1,
                "EUR": 0.8812,
                "JPY": 143.51,
                "KRW": {krw}
            }}
        }}"#,
        last = next_update - 86_400,
    )
}

/// Temp config pointing at `server` with its own data directory.
struct TestApp {
    _dir: tempfile::TempDir,
    config_path: String,
}

impl TestApp {
    fn new(server: &MockServer) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config_path = dir.path().join("config.yaml");
        let config_content = format!(
            r#"
providers:
  er_api:
    base_url: {}
    timeout_secs: 5
store: disk
data_path: {}
"#,
            server.uri(),
            dir.path().join("data").display()
        );
        fs::write(&config_path, config_content).expect("Failed to write config file");

        Self {
            config_path: config_path.to_string_lossy().into_owned(),
            _dir: dir,
        }
    }

    fn path(&self) -> Option<&str> {
        Some(&self.config_path)
    }

    fn config(&self) -> AppConfig {
        AppConfig::load_from_path(&self.config_path).expect("Failed to load config")
    }
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let mock_server = MockServer::start().await;
    let next_update = chrono::Utc::now().timestamp() + 3600;

    Mock::given(method("GET"))
        .and(path(RATES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(rates_body(next_update, 1425.6)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = TestApp::new(&mock_server);

    let result = xrate::run_command(xrate::AppCommand::Rates { filter: None }, app.path()).await;
    assert!(result.is_ok(), "Rates command failed with: {:?}", result.err());

    let result = xrate::run_command(
        xrate::AppCommand::Favorite {
            code: "krw".to_string(),
        },
        app.path(),
    )
    .await;
    assert!(result.is_ok(), "Favorite command failed with: {:?}", result.err());

    let result = xrate::run_command(
        xrate::AppCommand::Rates {
            filter: Some("yen".to_string()),
        },
        app.path(),
    )
    .await;
    assert!(result.is_ok(), "Filtered rates failed with: {:?}", result.err());

    // cache is still fresh, so this must not hit the server again
    let service = xrate::build_service(&app.config());
    let rates = service.get_rates().await.expect("Failed to read cached rates");
    let codes: Vec<_> = rates.iter().map(|r| r.currency_code.as_str()).collect();
    info!(?codes, "Cached rates");
    assert_eq!(codes, vec!["KRW", "EUR", "JPY", "USD"]);
    assert!(rates[0].is_favorite);
    assert_eq!(
        service.resume_screen().await.unwrap(),
        LastViewedScreen::ExchangeRateList
    );
}

#[test_log::test(tokio::test)]
async fn test_stale_cache_refresh_updates_trend() {
    let mock_server = MockServer::start().await;
    let past = chrono::Utc::now().timestamp() - 60;

    Mock::given(method("GET"))
        .and(path(RATES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(rates_body(past, 1425.6)))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = TestApp::new(&mock_server);
    xrate::run_command(xrate::AppCommand::Rates { filter: None }, app.path())
        .await
        .expect("First load failed");

    let future = chrono::Utc::now().timestamp() + 3600;
    Mock::given(method("GET"))
        .and(path(RATES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(rates_body(future, 1430.0)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = xrate::build_service(&app.config());
    let rates = service.get_rates().await.expect("Refresh failed");
    let krw = rates
        .iter()
        .find(|r| r.currency_code == "KRW")
        .expect("KRW missing");
    assert_eq!(krw.rate, 1430.0);
    assert_eq!(krw.trend, Trend::Up);
    let eur = rates.iter().find(|r| r.currency_code == "EUR").unwrap();
    assert_eq!(eur.trend, Trend::Flat);
}

#[test_log::test(tokio::test)]
async fn test_convert_records_screen_for_resume() {
    let mock_server = MockServer::start().await;
    let next_update = chrono::Utc::now().timestamp() + 3600;

    Mock::given(method("GET"))
        .and(path(RATES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(rates_body(next_update, 1425.6)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = TestApp::new(&mock_server);

    let result = xrate::run_command(
        xrate::AppCommand::Convert {
            code: "KRW".to_string(),
            amount: "10".to_string(),
        },
        app.path(),
    )
    .await;
    assert!(result.is_ok(), "Convert failed with: {:?}", result.err());

    let result = xrate::run_command(xrate::AppCommand::Resume, app.path()).await;
    assert!(result.is_ok(), "Resume failed with: {:?}", result.err());

    let service = xrate::build_service(&app.config());
    match service.resume_target().await.unwrap() {
        ResumeTarget::Calculator(info) => {
            assert_eq!(info.currency_code, "KRW");
            assert_eq!(info.rate, 1425.6);
        }
        other => panic!("Expected calculator screen, got {other:?}"),
    }

    let result = xrate::run_command(
        xrate::AppCommand::Convert {
            code: "KRW".to_string(),
            amount: "ten".to_string(),
        },
        app.path(),
    )
    .await;
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("Please enter a valid number")
    );

    let result = xrate::run_command(
        xrate::AppCommand::Convert {
            code: "XYZ".to_string(),
            amount: "1".to_string(),
        },
        app.path(),
    )
    .await;
    assert!(result.is_err());
}

#[test_log::test(tokio::test)]
async fn test_server_error_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(RATES_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let app = TestApp::new(&mock_server);
    let result = xrate::run_command(xrate::AppCommand::Rates { filter: None }, app.path()).await;

    let err = result.expect_err("Expected the rates command to fail");
    assert!(format!("{err:#}").contains("HTTP error: 503"));

    let service = xrate::build_service(&app.config());
    assert!(service.rate_info("USD").await.unwrap().is_none());
}
