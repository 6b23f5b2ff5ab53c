// fil-fuzzing/src/harness/driver.rs
//! Sequential build, mutate, submit and classify loop

use fil_rpc::RpcTransport;
use serde_json::Value;

use super::{classify, Classification, HarnessConfig, Verdict};
use crate::errors::HarnessError;
use crate::generators::BaselineBuilder;
use crate::mutators::{Catalog, MutationCase, MutationCategory, Mutator};
use crate::reporters;
use crate::utils::serialized_len;

/// What happened to one case
#[derive(Debug, Clone, PartialEq)]
pub enum CaseOutcome {
    /// Submitted and classified
    Classified(Classification),
    /// The transform could not be applied; nothing was sent
    Skipped(String),
}

/// Result of one catalog case
#[derive(Debug, Clone)]
pub struct CaseReport {
    pub name: String,
    pub category: MutationCategory,
    /// Mutated payload as submitted; absent for skipped cases and dropped
    /// once the case has been printed
    pub payload: Option<Value>,
    /// Serialized size of the submitted payload
    pub payload_bytes: usize,
    /// Whether the submission got a connection to the node
    pub reached: bool,
    pub outcome: CaseOutcome,
}

impl CaseReport {
    fn classified(case: &MutationCase, payload: Value, reached: bool, classification: Classification) -> Self {
        Self {
            name: case.name().to_string(),
            category: case.category(),
            payload_bytes: serialized_len(&payload),
            payload: Some(payload),
            reached,
            outcome: CaseOutcome::Classified(classification),
        }
    }

    fn skipped(case: &MutationCase, reason: String) -> Self {
        Self {
            name: case.name().to_string(),
            category: case.category(),
            payload: None,
            payload_bytes: 0,
            reached: false,
            outcome: CaseOutcome::Skipped(reason),
        }
    }

    /// Submitted without ever connecting to the node
    pub fn is_unreachable(&self) -> bool {
        self.classification().is_some() && !self.reached
    }

    pub fn classification(&self) -> Option<&Classification> {
        match &self.outcome {
            CaseOutcome::Classified(c) => Some(c),
            CaseOutcome::Skipped(_) => None,
        }
    }

    pub fn verdict(&self) -> Option<Verdict> {
        self.classification().map(Classification::verdict)
    }
}

/// Ordered case reports of one run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub target: String,
    pub endpoint: String,
    pub reports: Vec<CaseReport>,
}

impl RunSummary {
    pub fn new(target: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            endpoint: endpoint.into(),
            reports: Vec::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.reports.len()
    }

    /// Cases that reached the transport
    pub fn submitted(&self) -> usize {
        self.reports.iter().filter(|r| r.classification().is_some()).count()
    }

    pub fn rejected(&self) -> usize {
        self.count_verdict(Verdict::ExpectedRejection)
    }

    pub fn accepted(&self) -> usize {
        self.count_verdict(Verdict::UnexpectedAcceptance)
    }

    pub fn skipped(&self) -> usize {
        self.total() - self.submitted()
    }

    pub fn transport_failures(&self) -> usize {
        self.reports
            .iter()
            .filter_map(CaseReport::classification)
            .filter(|c| c.is_transport_failure())
            .count()
    }

    /// Submitted cases that never got a connection to the node
    pub fn unreachable(&self) -> usize {
        self.reports.iter().filter(|r| r.is_unreachable()).count()
    }

    /// Cases the node took without complaint
    pub fn acceptances(&self) -> impl Iterator<Item = &CaseReport> {
        self.reports
            .iter()
            .filter(|r| r.verdict() == Some(Verdict::UnexpectedAcceptance))
    }

    /// Fails with [`HarnessError::TargetUnreachable`] when no submitted case
    /// got a connection to the node. Timeouts and undecodable replies mean
    /// the node was reached.
    pub fn ensure_reachable(self) -> Result<Self, HarnessError> {
        let submitted = self.submitted();
        if submitted > 0 && self.unreachable() == submitted {
            return Err(HarnessError::TargetUnreachable {
                endpoint: self.endpoint,
                cases: submitted,
            });
        }
        Ok(self)
    }

    fn count_verdict(&self, verdict: Verdict) -> usize {
        self.reports.iter().filter(|r| r.verdict() == Some(verdict)).count()
    }
}

/// Drives one catalog against one node
///
/// Every case gets a freshly built baseline, so transforms never see each
/// other's output. Cases run strictly in catalog order with a fixed pause in
/// between.
pub struct FuzzDriver<T: RpcTransport> {
    transport: T,
    builder: Box<dyn BaselineBuilder>,
    catalog: Catalog,
    method: &'static str,
    config: HarnessConfig,
}

impl<T: RpcTransport> FuzzDriver<T> {
    pub fn new(
        transport: T,
        builder: Box<dyn BaselineBuilder>,
        catalog: Catalog,
        method: &'static str,
        config: HarnessConfig,
    ) -> Self {
        Self {
            transport,
            builder,
            catalog,
            method,
            config,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run the whole catalog once
    pub async fn run(&self) -> RunSummary {
        let total = self.catalog.len();
        let mut summary = RunSummary::new(self.catalog.target(), self.transport.endpoint());

        log::info!(
            "Submitting {} {} cases to {} via {}",
            total,
            self.builder.kind(),
            self.transport.endpoint(),
            self.method
        );

        for (i, case) in self.catalog.iter().enumerate() {
            let mut report = self.run_case(case).await;
            reporters::print_case(i + 1, total, &report);
            report.payload = None;
            summary.reports.push(report);

            if i + 1 < total && !self.config.delay.is_zero() {
                tokio::time::sleep(self.config.delay).await;
            }
        }

        summary
    }

    /// Build, mutate, submit and classify a single case
    pub async fn run_case(&self, case: &MutationCase) -> CaseReport {
        let mut payload = self.builder.build_baseline();

        if let Err(e) = case.mutate(&mut payload) {
            log::warn!("Skipping case {}: {}", case.name(), e);
            return CaseReport::skipped(case, e.to_string());
        }

        log::debug!("Case {} ({})", case.name(), case.category());

        let params = [payload];
        let outcome = self.transport.call(self.method, &params).await;
        let reached = !matches!(&outcome, Err(e) if e.is_unreachable());
        let classification = classify(&outcome);
        let [payload] = params;

        match classification.verdict() {
            Verdict::UnexpectedAcceptance => {
                log::warn!("Node accepted mutated {} case {}", self.builder.kind(), case.name())
            }
            Verdict::ExpectedRejection => log::debug!("Case {} rejected: {}", case.name(), classification),
        }

        CaseReport::classified(case, payload, reached, classification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::harness::FuzzTarget;
    use crate::mutators::CatalogOptions;
    use fil_rpc::{RpcResponse, TransportError};
    use serde_json::json;
    use std::sync::Mutex;

    /// Answers every call from a fixed script and records what it saw
    struct ScriptedTransport {
        reply: fn(&Value) -> Result<RpcResponse, TransportError>,
        calls: Mutex<Vec<(String, Vec<Value>)>>,
    }

    impl ScriptedTransport {
        fn new(reply: fn(&Value) -> Result<RpcResponse, TransportError>) -> Self {
            Self {
                reply,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RpcTransport for ScriptedTransport {
        async fn call(&self, method: &str, params: &[Value]) -> Result<RpcResponse, TransportError> {
            let reply = (self.reply)(&params[0]);
            self.calls.lock().unwrap().push((method.to_string(), params.to_vec()));
            reply
        }

        fn endpoint(&self) -> &str {
            "scripted"
        }
    }

    fn no_delay() -> HarnessConfig {
        HarnessConfig {
            delay: std::time::Duration::ZERO,
            ..HarnessConfig::default()
        }
    }

    fn table_catalog() -> Catalog {
        use crate::mutators::{replace, strip, CaseSpec};
        use crate::mutators::MutationCategory::*;
        static TABLE: &[CaseSpec] = &[
            ("wrong_type_epoch", TypeConfusion, |m| replace(m, "Header.Height", json!("not_an_int"))),
            ("strip_absent", MissingField, |m| strip(m, "Header.NoSuchField")),
            ("empty_message", Degenerate, |_| Ok(json!({}))),
        ];
        Catalog::from_table("block", TABLE, &CatalogOptions::default())
    }

    fn driver(transport: ScriptedTransport) -> FuzzDriver<ScriptedTransport> {
        FuzzDriver::new(
            transport,
            FuzzTarget::Block.builder(),
            table_catalog(),
            FuzzTarget::Block.method(),
            no_delay(),
        )
    }

    #[tokio::test]
    async fn test_skips_failed_mutation_and_continues() {
        let driver = driver(ScriptedTransport::new(|_| {
            Ok(RpcResponse {
                status: 200,
                body: json!({"error": {"message": "rejected"}}),
            })
        }));

        let summary = driver.run().await;

        assert_eq!(summary.total(), 3);
        assert_eq!(summary.submitted(), 2);
        assert_eq!(summary.skipped(), 1);
        assert_eq!(summary.rejected(), 2);
        assert!(matches!(summary.reports[1].outcome, CaseOutcome::Skipped(_)));
        assert!(summary.reports.iter().all(|r| r.payload.is_none()));
        assert_eq!(summary.reports[1].payload_bytes, 0);
        assert_eq!(summary.reports[2].payload_bytes, 2);
        assert_eq!(summary.reports[2].name, "empty_message");

        let calls = driver.transport().calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|(m, p)| m == "Filecoin.SyncSubmitBlock" && p.len() == 1));
        assert_eq!(calls[0].1[0]["Header"]["Height"], json!("not_an_int"));
        assert_eq!(calls[1].1[0], json!({}));
    }

    #[tokio::test]
    async fn test_acceptance_is_reported_not_fatal() {
        let driver = driver(ScriptedTransport::new(|payload| {
            let body = if payload == &json!({}) {
                json!({"result": "ok"})
            } else {
                json!({"error": "bad block"})
            };
            Ok(RpcResponse { status: 200, body })
        }));

        let summary = driver.run().await.ensure_reachable().unwrap();

        assert_eq!(summary.accepted(), 1);
        let accepted: Vec<_> = summary.acceptances().map(|r| r.name.as_str()).collect();
        assert_eq!(accepted, vec!["empty_message"]);
    }

    #[tokio::test]
    async fn test_all_transport_failures_is_unreachable() {
        let driver = driver(ScriptedTransport::new(|_| {
            Err(TransportError::Connect("connection refused".into()))
        }));

        let summary = driver.run().await;
        assert_eq!(summary.transport_failures(), 2);
        assert_eq!(summary.unreachable(), 2);
        assert_eq!(summary.rejected(), 2);

        match summary.ensure_reachable() {
            Err(HarnessError::TargetUnreachable { endpoint, cases }) => {
                assert_eq!(endpoint, "scripted");
                assert_eq!(cases, 2);
            }
            other => panic!("expected TargetUnreachable, got {:?}", other.map(|s| s.total())),
        }
    }

    #[tokio::test]
    async fn test_undecodable_replies_mean_node_was_reached() {
        let driver = driver(ScriptedTransport::new(|_| {
            Err(TransportError::Decode("status 400: expected value".into()))
        }));

        let summary = driver.run().await;
        assert_eq!(summary.transport_failures(), 2);
        assert_eq!(summary.unreachable(), 0);
        assert_eq!(summary.rejected(), 2);

        let summary = summary.ensure_reachable().unwrap();
        assert_eq!(summary.submitted(), 2);
    }

    #[tokio::test]
    async fn test_timeouts_mean_node_was_reached() {
        let driver = driver(ScriptedTransport::new(|_| Err(TransportError::Timeout(300))));
        let summary = driver.run().await;
        assert!(summary.reports.iter().filter(|r| r.classification().is_some()).all(|r| r.reached));
        assert!(summary.ensure_reachable().is_ok());
    }

    #[tokio::test]
    async fn test_each_case_gets_fresh_baseline() {
        let driver = driver(ScriptedTransport::new(|_| {
            Ok(RpcResponse { status: 500, body: json!({}) })
        }));
        let first = driver.run_case(driver.catalog().find("wrong_type_epoch").unwrap()).await;
        let second = driver.run_case(driver.catalog().find("wrong_type_epoch").unwrap()).await;

        let first = first.payload.unwrap();
        let second = second.payload.unwrap();
        assert_ne!(first["Header"]["ParentStateRoot"], second["Header"]["ParentStateRoot"]);
    }
}
