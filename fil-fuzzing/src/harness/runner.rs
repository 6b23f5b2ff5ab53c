// fil-fuzzing/src/harness/runner.rs
//! End-to-end wiring of one fuzzing run against one node

use fil_rpc::{load_token, with_retry, HttpRpcClient, RetryConfig, RpcTransport};
use serde_json::Value;

use super::{FuzzDriver, FuzzTarget, RunSummary};
use crate::config::{NodeSettings, Settings};
use crate::constants::methods;
use crate::errors::HarnessError;
use crate::reporters;

const NO_PARAMS: &[Value] = &[];

/// Probe the node with `Filecoin.Version` before the run starts
///
/// Connection failures and timeouts are retried per `retry`. A failed probe
/// is only a warning: the run goes ahead and the per-case classification
/// records what happens.
pub async fn preflight<T: RpcTransport>(transport: &T, retry: &RetryConfig) -> bool {
    match with_retry(|| transport.call(methods::VERSION, NO_PARAMS), retry).await {
        Ok(response) => match response.error() {
            None => {
                log::info!(
                    "Node at {} is up: {}",
                    transport.endpoint(),
                    response.result().cloned().unwrap_or_default()
                );
                true
            }
            Some(error) => {
                log::warn!("Version probe on {} returned an error: {}", transport.endpoint(), error);
                false
            }
        },
        Err(e) => {
            log::warn!("Node at {} did not answer the version probe: {}", transport.endpoint(), e);
            false
        }
    }
}

/// Run the catalog for `target` against `node`
///
/// Fails before sending anything when the catalog is empty or the client
/// cannot be built, and after the run when no case could connect to the node.
pub async fn run_target(
    settings: &Settings,
    node: &NodeSettings,
    target: FuzzTarget,
) -> Result<RunSummary, HarnessError> {
    let options = settings.catalog_options();
    let mut catalog = target.catalog(&options);
    if !settings.fuzzer.only.is_empty() {
        catalog.retain(|case| settings.fuzzer.only.iter().any(|n| n == case.name()));
    }
    if catalog.is_empty() {
        return Err(HarnessError::EmptyCatalog(target.label().to_string()));
    }

    let config = settings.harness_config();
    let token = node.token.as_deref().and_then(load_token);
    let client = HttpRpcClient::with_config(node.rpc.clone(), token, config.timeout)?;
    if !client.has_token() {
        log::warn!("No auth token for node {}, calls are unauthenticated", node.id);
    }

    log::info!(
        "Fuzzing {} node {} ({} cases, mode {})",
        node.implementation,
        node.id,
        catalog.len(),
        settings.mode
    );

    preflight(&client, &settings.fuzzer.retry).await;

    let artifact_dir = config.artifact_dir.clone();
    let driver = FuzzDriver::new(client, target.builder(), catalog, target.method(), config);
    let summary = driver.run().await;

    reporters::print_summary(&summary);
    if let Some(dir) = artifact_dir {
        match reporters::save_summary(&dir, &summary) {
            Ok(path) => println!("Results saved to {}", path.display()),
            Err(e) => log::error!("Failed to write results to {}: {}", dir.display(), e),
        }
    }

    summary.ensure_reachable()
}
