//! Error types for meshpay-topology.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for topology operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The kind of external service that failed during setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Ledger,
    Connector,
    Notary,
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ledger => write!(f, "ledger"),
            Self::Connector => write!(f, "connector"),
            Self::Notary => write!(f, "notary"),
        }
    }
}

/// Errors raised while building or starting a topology.
#[derive(Debug, Error)]
pub enum Error {
    /// A graph configuration file could not be read.
    #[error("failed to read graph configuration {path}")]
    GraphIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A graph configuration was not valid JSON of the expected shape.
    #[error("malformed graph configuration")]
    GraphParse(#[from] serde_json::Error),

    /// The graph declares no ledgers.
    #[error("graph configuration declares no ledgers")]
    NoLedgers,

    /// The graph declares no connectors.
    #[error("graph configuration declares no connectors")]
    NoConnectors,

    /// A connector edge points at a ledger index that does not exist.
    #[error("connector {connector}: ledger index {index} out of range (graph has {num_ledgers} ledgers)")]
    LedgerIndexOutOfRange {
        connector: String,
        index: usize,
        num_ledgers: usize,
    },

    /// A connector edge references a ledger id missing from the topology.
    #[error("connector {connector}: edge references unknown ledger {ledger}")]
    UnknownLedger { connector: String, ledger: String },

    /// Duplicate ledger id within one topology.
    #[error("duplicate ledger id {0}")]
    DuplicateLedger(String),

    /// Duplicate connector id within one topology.
    #[error("duplicate connector id {0}")]
    DuplicateConnector(String),

    /// Lookup of a connector that is not part of the topology.
    #[error("no such connector {0}")]
    NoSuchConnector(String),

    /// Lookup of a ledger that is not part of the topology.
    #[error("no such ledger {0}")]
    NoSuchLedger(String),

    /// A service failed to start or report ready. Fatal: the remaining
    /// startup phases are aborted.
    #[error("{kind} {id} (port {port}) failed to start")]
    Setup {
        kind: ServiceKind,
        id: String,
        port: u16,
        #[source]
        source: anyhow::Error,
    },

    /// Account setup failed after the ledgers came up.
    #[error("account setup failed")]
    AccountSetup {
        #[source]
        source: anyhow::Error,
    },

    /// Invalid fee configuration while deriving hop parameters.
    #[error(transparent)]
    Fee(#[from] meshpay_fees::FeeError),
}
