use fxrates::core::{
    QueryError, RateQuery, RefreshEvent, RefreshScheduler, RefreshService, SnapshotStore,
};
use fxrates::providers::FixerProvider;
use fxrates::store::disk::DiskSnapshotStore;
use rust_decimal_macros::dec;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const API_KEY: &str = "integration_key";

    pub const RATES_JSON: &str = r#"{
        "success": true,
        "timestamp": 1519296206,
        "base": "EUR",
        "date": "2024-05-01",
        "rates": {"USD": 1.2, "GBP": 0.9, "JPY": 163.5}
    }"#;

    pub async fn create_mock_server(status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/latest"))
            .and(query_param("access_key", API_KEY))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    /// First request fails with a 500, every later one succeeds.
    pub async fn create_flaky_mock_server() -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/latest"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RATES_JSON))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn write_config(dir: &std::path::Path, base_url: &str) -> std::path::PathBuf {
        let config_path = dir.join("config.yaml");
        let config_content = format!(
            r#"
            provider:
              base_url: "{}"
              timeout_secs: 5
            data_path: "{}"
            "#,
            base_url,
            dir.join("data").display()
        );
        std::fs::write(&config_path, config_content).expect("Failed to write config file");
        config_path
    }
}

#[test_log::test(tokio::test)]
async fn test_refresh_then_query_cross_rate() {
    let mock_server = test_utils::create_mock_server(200, test_utils::RATES_JSON).await;
    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");

    let store: Arc<dyn SnapshotStore> =
        Arc::new(DiskSnapshotStore::open(&data_dir.path().join("snapshot")).unwrap());
    let provider = FixerProvider::new(
        &mock_server.uri(),
        test_utils::API_KEY,
        Duration::from_secs(5),
    )
    .unwrap();
    let service = RefreshService::new(Arc::new(provider), Arc::clone(&store));
    let query = RateQuery::new(store);

    assert!(matches!(query.latest().await, Err(QueryError::NoData)));

    let snapshot = service.refresh().await.expect("refresh should succeed");
    info!(?snapshot, "Refreshed snapshot");
    assert_eq!(snapshot.base_currency(), "EUR");
    assert_eq!(snapshot.len(), 3);

    let rate = query.cross_rate("GBP", "USD").await.unwrap();
    assert_eq!(rate.round_dp(4), dec!(1.3333));
}

#[test_log::test(tokio::test)]
async fn test_failed_refresh_keeps_previous_snapshot() {
    let good_server = test_utils::create_mock_server(200, test_utils::RATES_JSON).await;
    let bad_server = test_utils::create_mock_server(200, "Invalid JSON").await;
    let data_dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn SnapshotStore> =
        Arc::new(DiskSnapshotStore::open(data_dir.path()).unwrap());

    let good = FixerProvider::new(&good_server.uri(), test_utils::API_KEY, Duration::from_secs(5))
        .unwrap();
    RefreshService::new(Arc::new(good), Arc::clone(&store))
        .refresh()
        .await
        .unwrap();

    let bad = FixerProvider::new(&bad_server.uri(), test_utils::API_KEY, Duration::from_secs(5))
        .unwrap();
    let result = RefreshService::new(Arc::new(bad), Arc::clone(&store))
        .refresh()
        .await;

    assert!(result.is_err());
    let stored = store.get().await.unwrap().expect("previous snapshot kept");
    assert_eq!(stored.rate("JPY"), Some(dec!(163.5)));
}

#[test_log::test(tokio::test)]
async fn test_scheduler_recovers_after_failed_fetch() {
    let mock_server = test_utils::create_flaky_mock_server().await;
    let data_dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn SnapshotStore> =
        Arc::new(DiskSnapshotStore::open(data_dir.path()).unwrap());
    let provider =
        FixerProvider::new(&mock_server.uri(), "any_key", Duration::from_secs(5)).unwrap();
    let service = Arc::new(RefreshService::new(Arc::new(provider), Arc::clone(&store)));

    let mut handle =
        RefreshScheduler::new(service, Duration::from_millis(10), Duration::ZERO).spawn();

    let wait = Duration::from_secs(10);
    let first = tokio::time::timeout(wait, handle.next_event())
        .await
        .unwrap()
        .unwrap();
    let second = tokio::time::timeout(wait, handle.next_event())
        .await
        .unwrap()
        .unwrap();
    handle.shutdown().await;

    assert!(matches!(first, RefreshEvent::Failed { .. }));
    assert_eq!(
        second,
        RefreshEvent::Updated {
            base_currency: "EUR".to_string(),
            currencies: 3
        }
    );
    assert!(store.get().await.unwrap().is_some());
}

#[test_log::test(tokio::test)]
async fn test_run_command_reads_stored_rates() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(dir.path(), "http://127.0.0.1:1");
    let config_path = config_path.to_str().unwrap();

    // Nothing stored yet: both read commands report no data and succeed.
    fxrates::run_command(fxrates::AppCommand::Rates, Some(config_path))
        .await
        .expect("rates without data should succeed");
    fxrates::run_command(
        fxrates::AppCommand::Cross {
            from: "GBP".to_string(),
            to: "USD".to_string(),
        },
        Some(config_path),
    )
    .await
    .expect("cross without data should succeed");

    {
        let store = DiskSnapshotStore::open(&dir.path().join("data").join("snapshot")).unwrap();
        let snapshot = fxrates::core::ExchangeSnapshot::try_new(
            "EUR",
            [("USD", dec!(1.2)), ("GBP", dec!(0.9))],
        )
        .unwrap();
        store.upsert(&snapshot).await.unwrap();
    }

    let result = fxrates::run_command(
        fxrates::AppCommand::Cross {
            from: "gbp".to_string(),
            to: "usd".to_string(),
        },
        Some(config_path),
    )
    .await;
    assert!(result.is_ok(), "Cross command failed with: {:?}", result.err());

    let result = fxrates::run_command(
        fxrates::AppCommand::Cross {
            from: "XXX".to_string(),
            to: "USD".to_string(),
        },
        Some(config_path),
    )
    .await;
    let err = result.expect_err("unknown currency should fail");
    assert_eq!(err.to_string(), "currency not found: XXX");
}

#[test_log::test(tokio::test)]
async fn test_run_command_with_missing_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.yaml");

    let result =
        fxrates::run_command(fxrates::AppCommand::Rates, Some(missing.to_str().unwrap())).await;

    assert!(result.is_err());
    assert!(!dir.path().join("data").exists());
    assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
}
