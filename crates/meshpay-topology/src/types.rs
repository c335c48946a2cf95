//! Typed topology values.
//!
//! Ledgers and connectors live in an ordered registry keyed by stable
//! identifiers. Nothing here is reached through ad hoc dynamic keys:
//! every lookup goes through the registry index, and every edge is
//! checked to reference a ledger that exists.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;

use meshpay_fees::{HopParameters, PaymentPath, Rate};

use crate::error::{Error, Result};

/// Stable namespaced ledger identifier, e.g. `demo.ledger3.`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct LedgerId(String);

impl LedgerId {
    pub fn new(id: impl Into<String>) -> LedgerId {
        LedgerId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LedgerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable connector identifier, taken from the graph configuration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ConnectorId(String);

impl ConnectorId {
    pub fn new(id: impl Into<String>) -> ConnectorId {
        ConnectorId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A directed pair of ledgers bridged by a connector, which holds an
/// account on both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub source: LedgerId,
    pub target: LedgerId,
}

/// One ledger service in the topology. Immutable after build.
#[derive(Debug, Clone)]
pub struct LedgerSpec {
    pub id: LedgerId,
    pub port: u16,
    /// Fractional digits the ledger represents.
    pub scale: u32,
    /// Connectors holding an account here, in graph declaration order.
    /// Passed to the ledger as a routing hint.
    pub recommended_connectors: Vec<ConnectorId>,
}

impl LedgerSpec {
    pub fn base_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}

/// One connector service in the topology. Immutable after build.
#[derive(Debug, Clone)]
pub struct ConnectorSpec {
    pub id: ConnectorId,
    pub edges: Vec<Edge>,
    pub spread: Rate,
    pub slippage: Rate,
    pub route_broadcast_interval: Duration,
    pub route_expiry: Duration,
    /// Port of the introspection endpoint serving route-table reports.
    pub report_port: u16,
}

impl ConnectorSpec {
    /// URL of the connector's route-table reporting endpoint.
    pub fn report_endpoint(&self) -> String {
        format!("http://localhost:{}/routes", self.report_port)
    }

    /// Startup configuration in the wire shape the orchestrator feeds
    /// to the connector process.
    pub fn startup_config(&self) -> ConnectorStartupConfig<'_> {
        ConnectorStartupConfig {
            edges: &self.edges,
            route_broadcast_interval: self.route_broadcast_interval.as_millis() as u64,
            route_expiry: self.route_expiry.as_millis() as u64,
            reporting_port: self.report_port,
        }
    }
}

/// Connector startup configuration, serialized for the external
/// orchestrator. Intervals are milliseconds.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorStartupConfig<'a> {
    pub edges: &'a [Edge],
    pub route_broadcast_interval: u64,
    pub route_expiry: u64,
    pub reporting_port: u16,
}

/// The complete set of ledgers and connectors for one test run.
///
/// Construction validates the topology invariants: ledger and connector
/// ids are unique, and every edge endpoint references an existing
/// ledger. Lives for the duration of one test case.
#[derive(Debug, Clone)]
pub struct Topology {
    ledgers: Vec<LedgerSpec>,
    connectors: Vec<ConnectorSpec>,
    ledger_index: HashMap<LedgerId, usize>,
    connector_index: HashMap<ConnectorId, usize>,
}

impl Topology {
    pub fn new(ledgers: Vec<LedgerSpec>, connectors: Vec<ConnectorSpec>) -> Result<Topology> {
        let mut ledger_index = HashMap::with_capacity(ledgers.len());
        for (i, ledger) in ledgers.iter().enumerate() {
            if ledger_index.insert(ledger.id.clone(), i).is_some() {
                return Err(Error::DuplicateLedger(ledger.id.to_string()));
            }
        }
        let mut connector_index = HashMap::with_capacity(connectors.len());
        for (i, connector) in connectors.iter().enumerate() {
            if connector_index.insert(connector.id.clone(), i).is_some() {
                return Err(Error::DuplicateConnector(connector.id.to_string()));
            }
            for edge in &connector.edges {
                for endpoint in [&edge.source, &edge.target] {
                    if !ledger_index.contains_key(endpoint) {
                        return Err(Error::UnknownLedger {
                            connector: connector.id.to_string(),
                            ledger: endpoint.to_string(),
                        });
                    }
                }
            }
        }
        Ok(Topology {
            ledgers,
            connectors,
            ledger_index,
            connector_index,
        })
    }

    pub fn ledgers(&self) -> &[LedgerSpec] {
        &self.ledgers
    }

    pub fn connectors(&self) -> &[ConnectorSpec] {
        &self.connectors
    }

    pub fn num_ledgers(&self) -> usize {
        self.ledgers.len()
    }

    pub fn num_connectors(&self) -> usize {
        self.connectors.len()
    }

    pub fn ledger(&self, id: &str) -> Result<&LedgerSpec> {
        self.ledger_index
            .get(&LedgerId::new(id))
            .map(|&i| &self.ledgers[i])
            .ok_or_else(|| Error::NoSuchLedger(id.to_string()))
    }

    pub fn connector(&self, id: &str) -> Result<&ConnectorSpec> {
        self.connector_index
            .get(&ConnectorId::new(id))
            .map(|&i| &self.connectors[i])
            .ok_or_else(|| Error::NoSuchConnector(id.to_string()))
    }

    /// All ledger ids, in registry order.
    pub fn ledger_ids(&self) -> impl Iterator<Item = &LedgerId> {
        self.ledgers.iter().map(|l| &l.id)
    }

    /// Derive the fee-model path for a payment entering at
    /// `source_ledger` and traversing `hops`, each hop named by the
    /// connector carrying it and the ledger it lands on.
    pub fn payment_path(
        &self,
        source_ledger: &str,
        hops: &[(&str, &str)],
    ) -> Result<PaymentPath> {
        let source_scale = self.ledger(source_ledger)?.scale;
        let mut parameters = Vec::with_capacity(hops.len());
        for (connector, destination) in hops {
            let connector = self.connector(connector)?;
            let destination = self.ledger(destination)?;
            parameters.push(HopParameters {
                spread: connector.spread,
                slippage: connector.slippage,
                destination_scale: destination.scale,
            });
        }
        Ok(PaymentPath::new(source_scale, parameters)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(id: &str, port: u16, scale: u32) -> LedgerSpec {
        LedgerSpec {
            id: LedgerId::new(id),
            port,
            scale,
            recommended_connectors: Vec::new(),
        }
    }

    fn connector(id: &str, edges: Vec<(&str, &str)>) -> ConnectorSpec {
        ConnectorSpec {
            id: ConnectorId::new(id),
            edges: edges
                .into_iter()
                .map(|(s, t)| Edge {
                    source: LedgerId::new(s),
                    target: LedgerId::new(t),
                })
                .collect(),
            spread: "0.002".parse().unwrap(),
            slippage: "0.001".parse().unwrap(),
            route_broadcast_interval: Duration::from_secs(10),
            route_expiry: Duration::from_secs(15),
            report_port: 4200,
        }
    }

    #[test]
    fn rejects_edge_to_unknown_ledger() {
        let result = Topology::new(
            vec![ledger("demo.ledger0.", 3000, 4)],
            vec![connector("mark", vec![("demo.ledger0.", "demo.ledger9.")])],
        );
        assert!(matches!(result, Err(Error::UnknownLedger { .. })));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let result = Topology::new(
            vec![ledger("demo.ledger0.", 3000, 4), ledger("demo.ledger0.", 3001, 4)],
            vec![],
        );
        assert!(matches!(result, Err(Error::DuplicateLedger(_))));

        let result = Topology::new(
            vec![ledger("demo.ledger0.", 3000, 4), ledger("demo.ledger1.", 3001, 4)],
            vec![
                connector("mark", vec![("demo.ledger0.", "demo.ledger1.")]),
                connector("mark", vec![("demo.ledger1.", "demo.ledger0.")]),
            ],
        );
        assert!(matches!(result, Err(Error::DuplicateConnector(_))));
    }

    #[test]
    fn payment_path_uses_connector_rates_and_ledger_scale() {
        let topology = Topology::new(
            vec![ledger("demo.ledger0.", 3000, 4), ledger("demo.ledger1.", 3001, 2)],
            vec![connector("mark", vec![("demo.ledger0.", "demo.ledger1.")])],
        )
        .unwrap();

        let path = topology
            .payment_path("demo.ledger0.", &[("mark", "demo.ledger1.")])
            .unwrap();
        assert_eq!(path.source_scale, 4);
        assert_eq!(path.hops.len(), 1);
        assert_eq!(path.hops[0].destination_scale, 2);
        assert_eq!(path.hops[0].spread, "0.002".parse().unwrap());

        assert!(matches!(
            topology.payment_path("demo.ledger0.", &[("mabel", "demo.ledger1.")]),
            Err(Error::NoSuchConnector(_))
        ));
    }

    #[test]
    fn startup_config_wire_shape() {
        let spec = connector("mark", vec![("demo.ledger0.", "demo.ledger1.")]);
        let json = serde_json::to_value(spec.startup_config()).unwrap();
        assert_eq!(json["routeBroadcastInterval"], 10_000);
        assert_eq!(json["routeExpiry"], 15_000);
        assert_eq!(json["reportingPort"], 4200);
        assert_eq!(json["edges"][0]["source"], "demo.ledger0.");
    }

    #[test]
    fn report_endpoint_url() {
        let spec = connector("mark", vec![]);
        assert_eq!(spec.report_endpoint(), "http://localhost:4200/routes");
    }
}
