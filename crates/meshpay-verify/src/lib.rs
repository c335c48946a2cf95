//! Meshpay Verify - Convergence Verification and Balance Assertions
//!
//! Decides whether a started routing topology converged correctly:
//! after the allowed propagation time plus a grace margin, every
//! connector's route table must cover every ledger (reachability) and
//! no connector may still be learning new routes (quiescence). Also
//! provides exact balance checks that compare real ledger balances
//! against the meshpay-fees reference model.
//!
//! All network activity is a single bounded wait followed by one
//! fan-out/fan-in poll round; transport failures are fatal and never
//! retried, since by polling time convergence is assumed complete and
//! a retry would mask a genuine protocol defect.

mod balance;
mod error;
mod poller;
mod report;
mod verifier;

pub use balance::BalanceClient;
pub use error::{
    QuiescenceFailure, ReachabilityFailure, ReachabilityGap, Result, VerifyError,
};
pub use poller::RouteReportPoller;
pub use report::{Route, RouteTableReport};
pub use verifier::{
    check_quiescence, check_reachability, check_report_count, verify, VerifyConfig,
};
