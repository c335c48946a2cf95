//! Phased topology startup.
//!
//! Services come up in three strict phases, each a barrier:
//!
//! 1. every ledger starts, in parallel, and all report ready;
//! 2. account setup runs (never before phase 1 completes);
//! 3. every connector starts, in parallel, each configured with its
//!    edges, rates, route intervals, and reporting endpoint.
//!
//! Connectors therefore never start before the ledgers they reference
//! are ready. The first failure in any phase aborts the remaining
//! phases with a fatal setup error naming the service and port; a
//! partial topology is never silently accepted.

use futures::future;
use tracing::{debug, info};

use crate::error::{Error, Result, ServiceKind};
use crate::types::{ConnectorSpec, LedgerSpec, Topology};

/// The external process manager that actually runs ledger and
/// connector services. Implementations own spawning, readiness, and
/// teardown; this crate only sequences them.
#[allow(async_fn_in_trait)]
pub trait ServiceOrchestrator {
    /// Start one ledger service and return once it reports ready.
    async fn start_ledger(&self, ledger: &LedgerSpec) -> anyhow::Result<()>;

    /// Create the test accounts on every started ledger.
    async fn setup_accounts(&self, topology: &Topology) -> anyhow::Result<()>;

    /// Start one connector service and return once it reports ready.
    async fn start_connector(&self, connector: &ConnectorSpec) -> anyhow::Result<()>;
}

/// Drive the three startup phases for a built topology.
pub async fn start_topology<O: ServiceOrchestrator>(
    orchestrator: &O,
    topology: &Topology,
) -> Result<()> {
    info!(
        ledgers = topology.num_ledgers(),
        connectors = topology.num_connectors(),
        "starting topology"
    );

    future::try_join_all(topology.ledgers().iter().map(|ledger| async move {
        orchestrator
            .start_ledger(ledger)
            .await
            .map_err(|source| Error::Setup {
                kind: ServiceKind::Ledger,
                id: ledger.id.to_string(),
                port: ledger.port,
                source,
            })
    }))
    .await?;
    debug!("all ledgers ready");

    orchestrator
        .setup_accounts(topology)
        .await
        .map_err(|source| Error::AccountSetup { source })?;
    debug!("accounts ready");

    future::try_join_all(topology.connectors().iter().map(|connector| async move {
        orchestrator
            .start_connector(connector)
            .await
            .map_err(|source| Error::Setup {
                kind: ServiceKind::Connector,
                id: connector.id.to_string(),
                port: connector.report_port,
                source,
            })
    }))
    .await?;

    info!("topology started");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{TopologyBuilder, TopologyConfig};
    use crate::graph::GraphSpec;
    use std::sync::Mutex;

    const LOOP3: &str = r#"{
        "num_ledgers": 3,
        "edge_list_map": {
            "mark": [{"source": 0, "target": 1}],
            "mary": [{"source": 1, "target": 2}],
            "martin": [{"source": 2, "target": 0}]
        }
    }"#;

    fn loop3() -> Topology {
        let graph = GraphSpec::from_json(LOOP3).unwrap();
        TopologyBuilder::new(TopologyConfig::default())
            .build(&graph)
            .unwrap()
    }

    /// Records phase-tagged events; optionally fails one service.
    #[derive(Default)]
    struct Recording {
        events: Mutex<Vec<String>>,
        fail_ledger: Option<String>,
        fail_connector: Option<String>,
    }

    impl Recording {
        fn record(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl ServiceOrchestrator for Recording {
        async fn start_ledger(&self, ledger: &LedgerSpec) -> anyhow::Result<()> {
            if self.fail_ledger.as_deref() == Some(ledger.id.as_str()) {
                anyhow::bail!("process exited");
            }
            self.record(format!("ledger:{}", ledger.id));
            Ok(())
        }

        async fn setup_accounts(&self, _topology: &Topology) -> anyhow::Result<()> {
            self.record("accounts".to_string());
            Ok(())
        }

        async fn start_connector(&self, connector: &ConnectorSpec) -> anyhow::Result<()> {
            if self.fail_connector.as_deref() == Some(connector.id.as_str()) {
                anyhow::bail!("bind failed");
            }
            self.record(format!("connector:{}", connector.id));
            Ok(())
        }
    }

    #[tokio::test]
    async fn phases_are_strict_barriers() {
        let orchestrator = Recording::default();
        let topology = loop3();
        start_topology(&orchestrator, &topology).await.unwrap();

        let events = orchestrator.events();
        assert_eq!(events.len(), 7);
        let accounts_at = events.iter().position(|e| e == "accounts").unwrap();
        for (i, event) in events.iter().enumerate() {
            if event.starts_with("ledger:") {
                assert!(i < accounts_at, "{event} after account setup");
            }
            if event.starts_with("connector:") {
                assert!(i > accounts_at, "{event} before account setup");
            }
        }
    }

    #[tokio::test]
    async fn ledger_failure_aborts_later_phases() {
        let orchestrator = Recording {
            fail_ledger: Some("demo.ledger1.".to_string()),
            ..Default::default()
        };
        let topology = loop3();
        let err = start_topology(&orchestrator, &topology)
            .await
            .unwrap_err();

        match err {
            Error::Setup { kind, id, port, .. } => {
                assert_eq!(kind, ServiceKind::Ledger);
                assert_eq!(id, "demo.ledger1.");
                assert_eq!(port, 3001);
            }
            other => panic!("unexpected error: {other}"),
        }

        let events = orchestrator.events();
        assert!(!events.iter().any(|e| e == "accounts"));
        assert!(!events.iter().any(|e| e.starts_with("connector:")));
    }

    #[tokio::test]
    async fn connector_failure_is_identified_by_id_and_port() {
        let orchestrator = Recording {
            fail_connector: Some("mary".to_string()),
            ..Default::default()
        };
        let topology = loop3();
        let err = start_topology(&orchestrator, &topology)
            .await
            .unwrap_err();

        match err {
            Error::Setup { kind, id, port, .. } => {
                assert_eq!(kind, ServiceKind::Connector);
                assert_eq!(id, "mary");
                assert_eq!(port, 4201);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
