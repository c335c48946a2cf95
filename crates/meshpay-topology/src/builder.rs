//! Turning a graph configuration into a concrete topology.
//!
//! Naming and port assignment are deterministic: ledger `N` is
//! `"<namespace>ledger<N>."` on `ledger_base_port + N`, and the
//! connector declared at position `i` reports on `report_base_port + i`.
//! While translating edges the builder also accumulates the reverse
//! index (ledger, connectors touching it) that ledgers receive as a
//! routing hint.

use std::collections::HashMap;
use std::time::Duration;

use meshpay_fees::Rate;
use tracing::debug;

use crate::error::Result;
use crate::graph::GraphSpec;
use crate::types::{ConnectorId, ConnectorSpec, Edge, LedgerId, LedgerSpec, Topology};

/// Tunables for topology construction.
#[derive(Debug, Clone)]
pub struct TopologyConfig {
    /// Prefix of every ledger id.
    pub namespace: String,
    /// Ledger `N` listens on `ledger_base_port + N`.
    pub ledger_base_port: u16,
    /// Connector at position `i` reports on `report_base_port + i`.
    pub report_base_port: u16,
    /// Decimal scale of every ledger unless overridden.
    pub ledger_scale: u32,
    /// Spread of every connector unless overridden.
    pub spread: Rate,
    /// Slippage of every connector unless overridden.
    pub slippage: Rate,
    pub route_broadcast_interval: Duration,
    pub route_expiry: Duration,
    /// Per-ledger scale overrides, by ledger index.
    pub scale_overrides: HashMap<usize, u32>,
    /// Per-connector spread overrides, by connector name.
    pub spread_overrides: HashMap<String, Rate>,
    /// Per-connector slippage overrides, by connector name.
    pub slippage_overrides: HashMap<String, Rate>,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            namespace: "demo.".to_string(),
            ledger_base_port: 3000,
            report_base_port: 4200,
            ledger_scale: 4,
            spread: Rate::from_ppm(2_000).expect("valid default spread"),
            slippage: Rate::from_ppm(1_000).expect("valid default slippage"),
            route_broadcast_interval: Duration::from_secs(10),
            route_expiry: Duration::from_secs(15),
            scale_overrides: HashMap::new(),
            spread_overrides: HashMap::new(),
            slippage_overrides: HashMap::new(),
        }
    }
}

impl TopologyConfig {
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    #[must_use]
    pub fn with_base_ports(mut self, ledger: u16, report: u16) -> Self {
        self.ledger_base_port = ledger;
        self.report_base_port = report;
        self
    }

    #[must_use]
    pub fn with_ledger_scale(mut self, scale: u32) -> Self {
        self.ledger_scale = scale;
        self
    }

    #[must_use]
    pub fn with_scale_override(mut self, ledger_index: usize, scale: u32) -> Self {
        self.scale_overrides.insert(ledger_index, scale);
        self
    }

    #[must_use]
    pub fn with_spread_override(mut self, connector: impl Into<String>, spread: Rate) -> Self {
        self.spread_overrides.insert(connector.into(), spread);
        self
    }

    #[must_use]
    pub fn with_slippage_override(mut self, connector: impl Into<String>, slippage: Rate) -> Self {
        self.slippage_overrides.insert(connector.into(), slippage);
        self
    }

    #[must_use]
    pub fn with_route_intervals(mut self, broadcast: Duration, expiry: Duration) -> Self {
        self.route_broadcast_interval = broadcast;
        self.route_expiry = expiry;
        self
    }
}

/// Builds [`Topology`] values from graph configurations.
#[derive(Debug, Clone, Default)]
pub struct TopologyBuilder {
    config: TopologyConfig,
}

impl TopologyBuilder {
    pub fn new(config: TopologyConfig) -> TopologyBuilder {
        TopologyBuilder { config }
    }

    /// Deterministic ledger id for an index.
    pub fn ledger_id(&self, index: usize) -> LedgerId {
        LedgerId::new(format!("{}ledger{}.", self.config.namespace, index))
    }

    /// Translate a graph configuration into ledger and connector specs.
    pub fn build(&self, graph: &GraphSpec) -> Result<Topology> {
        let cfg = &self.config;

        // Index-based edges become id-based while the reverse
        // ledger-to-connectors index accumulates in declaration order.
        let mut ledger_connectors: HashMap<usize, Vec<ConnectorId>> = HashMap::new();
        let mut connectors = Vec::with_capacity(graph.num_connectors());
        for (position, (name, edges)) in graph.edge_list_map.iter().enumerate() {
            let id = ConnectorId::new(name.clone());
            let edges: Vec<Edge> = edges
                .iter()
                .map(|edge| {
                    for index in [edge.source, edge.target] {
                        let touching = ledger_connectors.entry(index).or_default();
                        if !touching.contains(&id) {
                            touching.push(id.clone());
                        }
                    }
                    Edge {
                        source: self.ledger_id(edge.source),
                        target: self.ledger_id(edge.target),
                    }
                })
                .collect();
            connectors.push(ConnectorSpec {
                id,
                edges,
                spread: cfg.spread_overrides.get(name).copied().unwrap_or(cfg.spread),
                slippage: cfg
                    .slippage_overrides
                    .get(name)
                    .copied()
                    .unwrap_or(cfg.slippage),
                route_broadcast_interval: cfg.route_broadcast_interval,
                route_expiry: cfg.route_expiry,
                report_port: cfg.report_base_port + position as u16,
            });
        }

        let ledgers = (0..graph.num_ledgers)
            .map(|index| LedgerSpec {
                id: self.ledger_id(index),
                port: cfg.ledger_base_port + index as u16,
                scale: cfg
                    .scale_overrides
                    .get(&index)
                    .copied()
                    .unwrap_or(cfg.ledger_scale),
                recommended_connectors: ledger_connectors.remove(&index).unwrap_or_default(),
            })
            .collect();

        let topology = Topology::new(ledgers, connectors)?;
        debug!(
            ledgers = topology.num_ledgers(),
            connectors = topology.num_connectors(),
            "built topology"
        );
        Ok(topology)
    }
}
