//! Convergence verification: reachability plus quiescence.
//!
//! A topology has converged when every connector can route to every
//! ledger and no connector is still learning new routes past the
//! stabilization deadline. The verifier waits out the allowed
//! propagation time plus a grace margin (polling earlier would observe
//! a still-converging, not a stable, state), runs one concurrent poll
//! round, then evaluates three ordered checks, short-circuiting on the
//! first failure:
//!
//! 1. report count equals connector count;
//! 2. every report reaches the full ledger set;
//! 3. every `last_new_receive` precedes the deadline.

use std::collections::BTreeSet;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use meshpay_topology::Topology;
use tracing::info;

use crate::error::{
    QuiescenceFailure, ReachabilityFailure, ReachabilityGap, Result, VerifyError,
};
use crate::poller::RouteReportPoller;
use crate::report::RouteTableReport;

/// Tunables for one verification run.
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    /// Time the routing protocol is allowed to reach a stable state.
    pub allowed_propagation: Duration,
    /// Extra margin past the deadline before polling begins.
    pub stabilization_grace: Duration,
    /// Bound on each individual poll request.
    pub request_timeout: Duration,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            allowed_propagation: Duration::from_secs(30),
            stabilization_grace: Duration::from_secs(15),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl VerifyConfig {
    #[must_use]
    pub fn with_allowed_propagation(mut self, allowed: Duration) -> Self {
        self.allowed_propagation = allowed;
        self
    }

    #[must_use]
    pub fn with_stabilization_grace(mut self, grace: Duration) -> Self {
        self.stabilization_grace = grace;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

fn unix_now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_millis() as u64
}

/// Verify that a started topology's routing protocol converged within
/// the allowed propagation time.
///
/// One bounded wait, one bounded fan-out/fan-in poll round, then the
/// three ordered checks. Any failure is a descriptive, enumerable
/// error, never a bare boolean.
pub async fn verify(topology: &Topology, config: &VerifyConfig) -> Result<()> {
    let deadline_ms = unix_now_ms() + config.allowed_propagation.as_millis() as u64;

    info!(
        allowed_ms = config.allowed_propagation.as_millis() as u64,
        grace_ms = config.stabilization_grace.as_millis() as u64,
        "waiting for routing tables to stabilize"
    );
    tokio::time::sleep(config.allowed_propagation + config.stabilization_grace).await;

    let poller = RouteReportPoller::new(config.request_timeout);
    let reports = poller.poll_all(topology.connectors()).await?;

    check_report_count(topology, &reports)?;
    check_reachability(topology, &reports)?;
    check_quiescence(&reports, deadline_ms)?;

    info!(connectors = reports.len(), "topology converged");
    Ok(())
}

/// Check 1: one report per connector.
pub fn check_report_count(topology: &Topology, reports: &[RouteTableReport]) -> Result<()> {
    if reports.len() != topology.num_connectors() {
        return Err(VerifyError::ReportCount {
            expected: topology.num_connectors(),
            actual: reports.len(),
        });
    }
    Ok(())
}

/// Check 2: every connector reaches every ledger.
pub fn check_reachability(topology: &Topology, reports: &[RouteTableReport]) -> Result<()> {
    let full_set: BTreeSet<&str> = topology.ledger_ids().map(|id| id.as_str()).collect();
    let mut gaps = Vec::new();
    for report in reports {
        let reachable = report.unique_destinations();
        let missing: Vec<String> = full_set
            .difference(&reachable)
            .map(|ledger| ledger.to_string())
            .collect();
        if !missing.is_empty() {
            gaps.push(ReachabilityGap {
                connector: report.name.clone(),
                missing,
            });
        }
    }
    if !gaps.is_empty() {
        return Err(VerifyError::Unreachable(ReachabilityFailure { gaps }));
    }
    Ok(())
}

/// Check 3: no connector learned a genuinely new route after the
/// deadline.
pub fn check_quiescence(reports: &[RouteTableReport], deadline_ms: u64) -> Result<()> {
    let slow: Vec<(String, u64)> = reports
        .iter()
        .filter(|report| report.last_new_receive >= deadline_ms)
        .map(|report| (report.name.clone(), report.last_new_receive))
        .collect();
    if !slow.is_empty() {
        return Err(VerifyError::NotQuiescent(QuiescenceFailure {
            deadline_ms,
            slow,
        }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Route;
    use meshpay_topology::{GraphSpec, TopologyBuilder, TopologyConfig};

    fn loop3() -> Topology {
        let graph = GraphSpec::from_json(
            r#"{
                "num_ledgers": 3,
                "edge_list_map": {
                    "mark": [{"source": 0, "target": 1}],
                    "mary": [{"source": 1, "target": 2}],
                    "martin": [{"source": 2, "target": 0}]
                }
            }"#,
        )
        .unwrap();
        TopologyBuilder::new(TopologyConfig::default())
            .build(&graph)
            .unwrap()
    }

    fn full_report(name: &str, last_new_receive: u64) -> RouteTableReport {
        RouteTableReport {
            name: name.into(),
            routes: (0..3)
                .map(|i| Route {
                    destination_ledger: format!("demo.ledger{i}."),
                })
                .collect(),
            last_new_receive,
        }
    }

    #[test]
    fn count_mismatch_is_a_transport_fault() {
        let topology = loop3();
        let reports = vec![full_report("mark", 0), full_report("mary", 0)];
        assert!(matches!(
            check_report_count(&topology, &reports),
            Err(VerifyError::ReportCount {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn reachability_enumerates_missing_ledgers_per_connector() {
        let topology = loop3();
        let mut partial = full_report("mary", 0);
        partial.routes.retain(|r| r.destination_ledger != "demo.ledger2.");
        let reports = vec![full_report("mark", 0), partial, full_report("martin", 0)];

        match check_reachability(&topology, &reports) {
            Err(VerifyError::Unreachable(failure)) => {
                assert_eq!(failure.gaps.len(), 1);
                assert_eq!(failure.gaps[0].connector, "mary");
                assert_eq!(failure.gaps[0].missing, ["demo.ledger2."]);
                let message = failure.to_string();
                assert!(message.contains("mary can't reach: demo.ledger2."));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn quiescence_enumerates_slow_connectors() {
        let deadline = 1_700_000_000_000;
        let reports = vec![
            full_report("mark", deadline - 1),
            full_report("mary", deadline),
            full_report("martin", deadline + 5_000),
        ];
        match check_quiescence(&reports, deadline) {
            Err(VerifyError::NotQuiescent(failure)) => {
                assert_eq!(
                    failure.slow,
                    vec![
                        ("mary".to_string(), deadline),
                        ("martin".to_string(), deadline + 5_000)
                    ]
                );
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn converged_reports_pass_all_checks() {
        let topology = loop3();
        let deadline = 1_700_000_000_000;
        let reports = vec![
            full_report("mark", deadline - 10_000),
            full_report("mary", deadline - 20_000),
            full_report("martin", deadline - 1),
        ];
        check_report_count(&topology, &reports).unwrap();
        check_reachability(&topology, &reports).unwrap();
        check_quiescence(&reports, deadline).unwrap();
    }
}
