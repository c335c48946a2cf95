//! Route-table report wire types.
//!
//! Connectors expose a reporting endpoint for test introspection. The
//! verifier only reads this shape; extra fields in the wire JSON are
//! ignored.

use std::collections::BTreeSet;

use serde::Deserialize;

/// One advertised route.
#[derive(Debug, Clone, Deserialize)]
pub struct Route {
    pub destination_ledger: String,
}

/// A connector's routing-table snapshot. Transient: created per poll,
/// discarded after verification.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteTableReport {
    pub name: String,
    pub routes: Vec<Route>,
    /// Unix epoch milliseconds of the most recently learned new route.
    pub last_new_receive: u64,
}

impl RouteTableReport {
    /// Distinct destination ledgers across all routes.
    pub fn unique_destinations(&self) -> BTreeSet<&str> {
        self.routes
            .iter()
            .map(|route| route.destination_ledger.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_routes_collapse_to_one_destination() {
        let report = RouteTableReport {
            name: "mark".into(),
            routes: vec![
                Route { destination_ledger: "demo.ledger0.".into() },
                Route { destination_ledger: "demo.ledger1.".into() },
                Route { destination_ledger: "demo.ledger0.".into() },
            ],
            last_new_receive: 0,
        };
        let destinations = report.unique_destinations();
        assert_eq!(destinations.len(), 2);
        assert!(destinations.contains("demo.ledger1."));
    }

    #[test]
    fn extra_wire_fields_are_ignored() {
        let json = r#"{
            "name": "mark",
            "routes": [
                {"destination_ledger": "demo.ledger0.", "source_ledger": "demo.ledger1.", "min_message_window": 1}
            ],
            "last_new_receive": 1700000000000,
            "uptime": 42
        }"#;
        let report: RouteTableReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.name, "mark");
        assert_eq!(report.last_new_receive, 1_700_000_000_000);
        assert_eq!(report.routes.len(), 1);
    }
}
