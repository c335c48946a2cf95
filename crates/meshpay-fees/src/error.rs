//! Error types for meshpay-fees.

use thiserror::Error;

/// Result type for fee-model operations.
pub type Result<T> = std::result::Result<T, FeeError>;

/// Configuration errors raised by the fee model.
///
/// These are caller contract violations, categorically distinct from
/// convergence or transport failures in the verification crates.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeeError {
    /// The input is not a well-formed decimal amount.
    #[error("malformed decimal amount: {0:?}")]
    ParseAmount(String),

    /// The amount carries more fractional digits than the working scale.
    #[error("amount {0:?} exceeds {1} fractional digits")]
    TooPrecise(String, u32),

    /// The input is not a well-formed fractional rate.
    #[error("malformed rate: {0:?}")]
    ParseRate(String),

    /// A spread or slippage rate outside the permitted [0, 1) range.
    #[error("rate {0} is outside [0, 1)")]
    RateOutOfRange(String),

    /// A ledger scale outside the supported range.
    #[error("unsupported ledger scale {0} (expected 1..={max})", max = crate::amount::MAX_SCALE)]
    InvalidScale(u32),

    /// Payment amounts must be non-negative.
    #[error("negative payment amount {0}")]
    NegativeAmount(String),

    /// A payment path must carry at least one hop.
    #[error("payment path has no hops")]
    EmptyPath,
}
