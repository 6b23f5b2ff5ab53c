//! End-to-end submission scenarios against mock nodes

use std::path::PathBuf;
use std::time::Duration;

use fil_fuzzing::config::NodeSettings;
use fil_fuzzing::harness::{CaseOutcome, HarnessConfig};
use fil_fuzzing::{
    run_target, Catalog, CatalogOptions, Classification, FuzzDriver, FuzzTarget, HarnessError,
    RunSummary, Settings, Verdict,
};
use fil_rpc::{HttpRpcClient, RetryConfig};
use mockito::Matcher;
use serde_json::json;
use tokio::net::TcpListener;

fn single_case(name: &str) -> Catalog {
    let mut catalog = Catalog::blocks(&CatalogOptions::default());
    catalog.retain(|c| c.name() == name);
    assert_eq!(catalog.len(), 1, "case {} not registered", name);
    catalog
}

fn config() -> HarnessConfig {
    HarnessConfig {
        delay: Duration::ZERO,
        timeout: Duration::from_millis(300),
        artifact_dir: None,
    }
}

fn block_driver(endpoint: String, case: &str) -> FuzzDriver<HttpRpcClient> {
    let client = HttpRpcClient::with_config(endpoint, Some("test-token".into()), config().timeout).unwrap();
    FuzzDriver::new(
        client,
        FuzzTarget::Block.builder(),
        single_case(case),
        FuzzTarget::Block.method(),
        config(),
    )
}

/// Accepts connections and never answers
async fn silent_node() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    format!("http://{}/rpc/v0", addr)
}

/// An address nothing listens on
async fn closed_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/rpc/v0", addr)
}

fn settings_for(endpoint: String) -> (Settings, NodeSettings) {
    let mut settings = Settings::default();
    settings.fuzzer.delay_ms = 0;
    settings.fuzzer.timeout_secs = 1;
    settings.fuzzer.retry = RetryConfig {
        max_retries: 0,
        ..RetryConfig::default()
    };
    settings.nodes = vec![NodeSettings {
        id: "mock".into(),
        rpc: endpoint,
        token: None,
        ..NodeSettings::default()
    }];
    let node = settings.node(None).unwrap();
    (settings, node)
}

#[tokio::test]
async fn wrong_type_epoch_rejected_with_400() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/rpc/v0")
        .match_header("authorization", "Bearer test-token")
        .match_body(Matcher::PartialJson(json!({"method": "Filecoin.SyncSubmitBlock"})))
        .with_status(400)
        .with_body(r#"{"error":"invalid params"}"#)
        .create_async()
        .await;

    let driver = block_driver(format!("{}/rpc/v0", server.url()), "wrong_type_epoch");
    let report = driver.run_case(driver.catalog().find("wrong_type_epoch").unwrap()).await;
    mock.assert_async().await;

    assert_eq!(report.payload.as_ref().unwrap()["Header"]["Height"], json!("not_an_int"));
    assert_eq!(report.verdict(), Some(Verdict::ExpectedRejection));
    assert_eq!(
        report.classification(),
        Some(&Classification::ProtocolRejected {
            status: 400,
            error: json!("invalid params"),
        })
    );
}

#[tokio::test]
async fn missing_header_rejected() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/rpc/v0")
        .with_status(200)
        .with_body(r#"{"error": "missing header"}"#)
        .create_async()
        .await;

    let driver = block_driver(format!("{}/rpc/v0", server.url()), "missing_header");
    let report = driver.run_case(driver.catalog().find("missing_header").unwrap()).await;
    mock.assert_async().await;

    let payload = report.payload.as_ref().unwrap();
    assert!(payload.get("Header").is_none());
    assert!(payload.get("BlsMessages").is_some());
    assert_eq!(report.verdict(), Some(Verdict::ExpectedRejection));
}

#[tokio::test]
async fn huge_bls_messages_timeout_is_transport_rejection() {
    let endpoint = silent_node().await;
    let driver = block_driver(endpoint.clone(), "huge_bls_messages");
    let report = driver.run_case(driver.catalog().find("huge_bls_messages").unwrap()).await;

    assert_eq!(report.payload.as_ref().unwrap()["BlsMessages"].as_array().unwrap().len(), 2000);
    assert!(report.classification().unwrap().is_transport_failure());
    assert_eq!(report.verdict(), Some(Verdict::ExpectedRejection));

    // the connection was accepted, so the node counts as reached
    assert!(report.reached);
    let mut summary = RunSummary::new("block", endpoint);
    summary.reports.push(report);
    assert!(summary.ensure_reachable().is_ok());
}

#[tokio::test]
async fn empty_message_accepted_is_flagged() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/rpc/v0")
        .match_body(Matcher::PartialJson(json!({"params": [{}]})))
        .with_status(200)
        .with_body(r#"{"result": "ok"}"#)
        .create_async()
        .await;

    let driver = block_driver(format!("{}/rpc/v0", server.url()), "empty_message");
    let summary = driver.run().await;
    mock.assert_async().await;

    assert_eq!(summary.accepted(), 1);
    let report = &summary.reports[0];
    assert_eq!(report.payload_bytes, 2);
    assert!(report.payload.is_none());
    assert_eq!(report.verdict(), Some(Verdict::UnexpectedAcceptance));

    // acceptances are findings, not run failures
    let summary = summary.ensure_reachable().unwrap();
    assert_eq!(summary.acceptances().count(), 1);
}

#[tokio::test]
async fn run_target_writes_artifact() {
    let mut server = mockito::Server::new_async().await;
    let version = server
        .mock("POST", "/rpc/v0")
        .match_body(Matcher::PartialJson(json!({"method": "Filecoin.Version"})))
        .with_status(200)
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":{"Version":"1.28.0"}}"#)
        .create_async()
        .await;
    let submit = server
        .mock("POST", "/rpc/v0")
        .match_body(Matcher::PartialJson(json!({"method": "Filecoin.MpoolPush"})))
        .with_status(200)
        .with_body(r#"{"jsonrpc":"2.0","id":1,"error":{"code":1,"message":"rejected"}}"#)
        .expect(2)
        .create_async()
        .await;

    let artifacts = tempfile::tempdir().unwrap();
    let (mut settings, node) = settings_for(format!("{}/rpc/v0", server.url()));
    settings.fuzzer.only = vec!["negative_gas_limit".into(), "missing_signature".into()];
    settings.fuzzer.artifacts_dir = Some(PathBuf::from(artifacts.path()));

    let summary = run_target(&settings, &node, FuzzTarget::Message).await.unwrap();
    version.assert_async().await;
    submit.assert_async().await;

    assert_eq!(summary.total(), 2);
    assert_eq!(summary.rejected(), 2);
    assert_eq!(summary.accepted(), 0);

    let written = std::fs::read_to_string(artifacts.path().join("message_results.txt")).unwrap();
    assert!(written.contains("Expected rejections: 2"));
}

#[tokio::test]
async fn run_target_unreachable_node() {
    let (mut settings, node) = settings_for(closed_port().await);
    settings.fuzzer.only = vec!["wrong_type_epoch".into(), "empty_message".into()];

    let err = run_target(&settings, &node, FuzzTarget::Block).await.unwrap_err();
    assert!(matches!(err, HarnessError::TargetUnreachable { cases: 2, .. }));
}

#[tokio::test]
async fn run_target_non_json_replies_are_not_unreachable() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/rpc/v0")
        .with_status(400)
        .with_body("<html>Bad Request</html>")
        .expect_at_least(2)
        .create_async()
        .await;

    let (mut settings, node) = settings_for(format!("{}/rpc/v0", server.url()));
    settings.fuzzer.only = vec!["wrong_type_epoch".into(), "empty_message".into()];

    let summary = run_target(&settings, &node, FuzzTarget::Block).await.unwrap();
    mock.assert_async().await;

    assert_eq!(summary.submitted(), 2);
    assert_eq!(summary.transport_failures(), 2);
    assert_eq!(summary.unreachable(), 0);
    assert_eq!(summary.rejected(), 2);
}

#[tokio::test]
async fn run_target_empty_catalog_is_fatal() {
    let (mut settings, node) = settings_for(closed_port().await);
    settings.fuzzer.only = vec!["no_such_case".into()];

    let err = run_target(&settings, &node, FuzzTarget::Block).await.unwrap_err();
    assert!(matches!(err, HarnessError::EmptyCatalog(_)));
}

#[tokio::test]
async fn skipped_cases_do_not_reach_node() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/rpc/v0")
        .with_status(200)
        .with_body(r#"{"error":"bad"}"#)
        .expect(0)
        .create_async()
        .await;

    let client = HttpRpcClient::new(format!("{}/rpc/v0", server.url())).unwrap();
    // block catalog against message baselines: every block path is missing
    let mut catalog = Catalog::blocks(&CatalogOptions::default());
    catalog.retain(|c| c.name() == "missing_miner");
    let driver = FuzzDriver::new(
        client,
        FuzzTarget::Message.builder(),
        catalog,
        FuzzTarget::Block.method(),
        config(),
    );

    let summary = driver.run().await;
    mock.assert_async().await;
    assert_eq!(summary.skipped(), 1);
    assert!(matches!(summary.reports[0].outcome, CaseOutcome::Skipped(_)));
}
