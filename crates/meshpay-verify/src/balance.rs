//! Exact balance checks against the ledger HTTP API.
//!
//! The ledger exposes `GET {base}/accounts/{name}/balance` returning a
//! plain decimal string. Comparison is numeric and exact at the
//! ledger's scale; there is no tolerance, because the fee model
//! predicts balances to the last representable unit.

use std::time::Duration;

use meshpay_fees::Amount;
use tracing::debug;

use crate::error::{Result, VerifyError};

/// Read-only client for ledger account balances.
#[derive(Debug, Clone)]
pub struct BalanceClient {
    client: reqwest::Client,
}

impl BalanceClient {
    pub fn new(request_timeout: Duration) -> BalanceClient {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .expect("default TLS backend available");
        BalanceClient { client }
    }

    /// Fetch one account balance as an exact decimal amount.
    pub async fn fetch(&self, ledger_url: &str, account: &str) -> Result<Amount> {
        let endpoint = format!("{ledger_url}/accounts/{account}/balance");
        let fetch_err = |source| VerifyError::BalanceFetch {
            ledger_url: ledger_url.to_string(),
            account: account.to_string(),
            source,
        };
        let body = self
            .client
            .get(&endpoint)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(fetch_err)?
            .text()
            .await
            .map_err(fetch_err)?;
        let balance: Amount =
            body.trim()
                .parse()
                .map_err(|source| VerifyError::MalformedBalance {
                    ledger_url: ledger_url.to_string(),
                    account: account.to_string(),
                    source,
                })?;
        debug!(%ledger_url, %account, %balance, "fetched balance");
        Ok(balance)
    }

    /// Assert an account holds exactly the expected amount.
    pub async fn check(&self, ledger_url: &str, account: &str, expected: Amount) -> Result<()> {
        let actual = self.fetch(ledger_url, account).await?;
        if actual != expected {
            return Err(VerifyError::BalanceMismatch {
                ledger_url: ledger_url.to_string(),
                account: account.to_string(),
                expected,
                actual,
            });
        }
        Ok(())
    }
}
