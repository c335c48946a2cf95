//! Meshpay Fees - Fee-Accrual Reference Model
//!
//! Pure, stateless arithmetic for predicting the exact outcome of a
//! multi-hop payment across ledgers with heterogeneous decimal scales.
//! The verification harness compares these predictions against real
//! ledger balances, so the model reproduces the routing protocol's
//! rounding to the last representable unit of every hop's scale.
//!
//! # Quoting Modes
//!
//! - **Forward** ([`quote_by_source`]): given a source amount, what
//!   lands on the destination ledger after spread, slippage, and
//!   per-ledger rounding.
//! - **Reverse** ([`quote_by_destination`]): given a required
//!   destination amount, the minimal source debit that guarantees it,
//!   with every rounding step taken in the destination's favor.
//!
//! # Exactness
//!
//! No floating point anywhere: amounts are `i128` fixed point at 12
//! fractional digits, rates are parts-per-million. See [`Amount`] and
//! [`Rate`].

mod amount;
mod error;
mod model;

pub use amount::{Amount, Rate, MAX_SCALE, WORKING_SCALE};
pub use error::{FeeError, Result};
pub use model::{quote_by_destination, quote_by_source, HopParameters, PaymentPath, SourceQuote};
