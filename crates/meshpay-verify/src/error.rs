//! Error types for meshpay-verify.

use std::fmt;

use meshpay_fees::Amount;
use thiserror::Error;

/// Result type for verification operations.
pub type Result<T> = std::result::Result<T, VerifyError>;

/// One connector's missing destinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachabilityGap {
    pub connector: String,
    pub missing: Vec<String>,
}

/// Reachability check failure: which connectors cannot reach which
/// ledgers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachabilityFailure {
    pub gaps: Vec<ReachabilityGap>,
}

impl fmt::Display for ReachabilityFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "the following connectors are missing routes:")?;
        for gap in &self.gaps {
            writeln!(f, "  {} can't reach: {}", gap.connector, gap.missing.join(", "))?;
        }
        Ok(())
    }
}

/// Quiescence check failure: which connectors were still learning new
/// routes past the stabilization deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuiescenceFailure {
    /// Deadline, unix epoch milliseconds.
    pub deadline_ms: u64,
    /// Connector name and its `last_new_receive` timestamp.
    pub slow: Vec<(String, u64)>,
}

impl fmt::Display for QuiescenceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "connectors received new routes after the stabilization deadline ({} ms): ",
            self.deadline_ms
        )?;
        let slow: Vec<String> = self
            .slow
            .iter()
            .map(|(name, at)| format!("{name} (at {at} ms)"))
            .collect();
        write!(f, "{}", slow.join(", "))
    }
}

/// Verification failures. Every variant enumerates exactly which
/// entities are missing, slow, or numerically wrong.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// A poll request failed or timed out. Fatal for the run; polling
    /// happens after convergence is assumed complete, so a retry would
    /// mask a genuine protocol defect.
    #[error("transport failure polling {connector} at {endpoint}")]
    Transport {
        connector: String,
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Fewer (or more) reports than connectors: a transport or setup
    /// fault, not a protocol failure.
    #[error("expected {expected} route reports, got {actual}")]
    ReportCount { expected: usize, actual: usize },

    /// One or more connectors cannot reach every ledger.
    #[error("{0}")]
    Unreachable(ReachabilityFailure),

    /// One or more connectors kept learning routes past the deadline.
    #[error("{0}")]
    NotQuiescent(QuiescenceFailure),

    /// A balance fetch failed.
    #[error("failed to fetch balance of {account} on {ledger_url}")]
    BalanceFetch {
        ledger_url: String,
        account: String,
        #[source]
        source: reqwest::Error,
    },

    /// The ledger returned something that is not a decimal string.
    #[error("ledger {ledger_url} returned malformed balance for {account}")]
    MalformedBalance {
        ledger_url: String,
        account: String,
        #[source]
        source: meshpay_fees::FeeError,
    },

    /// A balance does not match the fee model's prediction.
    #[error("balance mismatch for {account} on {ledger_url}: expected {expected}, got {actual}")]
    BalanceMismatch {
        ledger_url: String,
        account: String,
        expected: Amount,
        actual: Amount,
    },
}
