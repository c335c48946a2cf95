//! Concurrent route-report polling.

use std::time::Duration;

use futures::future;
use meshpay_topology::ConnectorSpec;
use tracing::debug;

use crate::error::{Result, VerifyError};
use crate::report::RouteTableReport;

/// Polls every connector's reporting endpoint exactly once per round.
#[derive(Debug, Clone)]
pub struct RouteReportPoller {
    client: reqwest::Client,
}

impl RouteReportPoller {
    /// Build a poller whose individual requests are bounded by
    /// `request_timeout`, so one hung connector cannot stall the round
    /// indefinitely.
    pub fn new(request_timeout: Duration) -> RouteReportPoller {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .expect("default TLS backend available");
        RouteReportPoller { client }
    }

    /// One poll round: every request is issued before any response is
    /// awaited (fan-out), and every response resolves before the first
    /// error is reported (fan-in barrier), preserving connector order.
    pub async fn poll_all(&self, connectors: &[ConnectorSpec]) -> Result<Vec<RouteTableReport>> {
        let fetches = connectors.iter().map(|connector| {
            let endpoint = connector.report_endpoint();
            async move {
                let transport = |source| VerifyError::Transport {
                    connector: connector.id.to_string(),
                    endpoint: endpoint.clone(),
                    source,
                };
                let response = self
                    .client
                    .get(&endpoint)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(transport)?;
                response
                    .json::<RouteTableReport>()
                    .await
                    .map_err(transport)
            }
        });
        let reports: Vec<RouteTableReport> = future::join_all(fetches)
            .await
            .into_iter()
            .collect::<Result<_>>()?;
        debug!(reports = reports.len(), "poll round complete");
        Ok(reports)
    }
}
