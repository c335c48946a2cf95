//! Declarative graph configuration.
//!
//! A graph file names ledgers by index and connectors by name, each
//! connector carrying the directed edges it bridges:
//!
//! ```json
//! {
//!   "num_ledgers": 4,
//!   "edge_list_map": {
//!     "mark": [{ "source": 0, "target": 1 }],
//!     "mary": [{ "source": 1, "target": 2 }]
//!   }
//! }
//! ```
//!
//! Connector order is significant (reporting ports are assigned by
//! position), so the map is an [`IndexMap`]. Cycles are an intended
//! test condition, not an error.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{Error, Result};

/// A directed edge between two ledgers, by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct EdgeIndices {
    pub source: usize,
    pub target: usize,
}

/// A parsed, validated graph configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphSpec {
    /// Ledgers are `0..num_ledgers`.
    pub num_ledgers: usize,
    /// Connector name to the edges it bridges, in declaration order.
    pub edge_list_map: IndexMap<String, Vec<EdgeIndices>>,
}

impl GraphSpec {
    /// Parse a graph configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<GraphSpec> {
        let graph: GraphSpec = serde_json::from_str(json)?;
        graph.validate()?;
        Ok(graph)
    }

    /// Load and parse a graph configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<GraphSpec> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| Error::GraphIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn num_connectors(&self) -> usize {
        self.edge_list_map.len()
    }

    fn validate(&self) -> Result<()> {
        if self.num_ledgers == 0 {
            return Err(Error::NoLedgers);
        }
        if self.edge_list_map.is_empty() {
            return Err(Error::NoConnectors);
        }
        for (connector, edges) in &self.edge_list_map {
            for edge in edges {
                for index in [edge.source, edge.target] {
                    if index >= self.num_ledgers {
                        return Err(Error::LedgerIndexOutOfRange {
                            connector: connector.clone(),
                            index,
                            num_ledgers: self.num_ledgers,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
