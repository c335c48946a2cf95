//! Meshpay Topology - Declarative Payment-Routing Networks
//!
//! Turns a declarative graph description (ledger count plus a map of
//! connector edge lists) into concrete ledger and connector startup
//! configurations, and drives their phased startup through an external
//! [`ServiceOrchestrator`].
//!
//! # Pipeline
//!
//! 1. [`GraphSpec`] parses and validates the graph file;
//! 2. [`TopologyBuilder`] derives ids, ports, scales, rates, and the
//!    ledger-to-connectors reverse index, producing a [`Topology`];
//! 3. [`start_topology`] brings the services up in three strict
//!    phases: ledgers, accounts, connectors.
//!
//! The topology itself is immutable after build and lives only for one
//! test run. Nothing here talks to the network; process lifecycle
//! belongs to the orchestrator.

mod builder;
mod error;
mod graph;
mod startup;
mod types;

pub use builder::{TopologyBuilder, TopologyConfig};
pub use error::{Error, Result, ServiceKind};
pub use graph::{EdgeIndices, GraphSpec};
pub use startup::{start_topology, ServiceOrchestrator};
pub use types::{
    ConnectorId, ConnectorSpec, ConnectorStartupConfig, Edge, LedgerId, LedgerSpec, Topology,
};
