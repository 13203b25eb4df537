//! Generalized cost.
//!
//! Costs are integers in "seconds equivalent" units: one second of riding
//! costs `transit_reluctance`, one second of waiting `wait_reluctance`, and
//! each boarding a fixed `board_cost`. Walking is costed where the walk is
//! built: transfers carry their network cost and access/egress legs their own.

use serde::{Deserialize, Serialize};

use crate::domain::Seconds;

/// Weights used to compute generalized cost during the search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostModel {
    pub board_cost: i32,
    pub transfer_cost: i32,
    pub wait_reluctance: f64,
    pub transit_reluctance: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            board_cost: 600,
            transfer_cost: 0,
            wait_reluctance: 1.0,
            transit_reluctance: 1.0,
        }
    }
}

impl CostModel {
    /// Cost of boarding after waiting `wait` seconds (slack included).
    pub fn boarding(&self, wait: Seconds, is_transfer: bool) -> i32 {
        let transfer = if is_transfer { self.transfer_cost } else { 0 };
        self.board_cost + transfer + self.waiting(wait)
    }

    pub fn waiting(&self, wait: Seconds) -> i32 {
        weighted(wait.max(0), self.wait_reluctance)
    }

    pub fn riding(&self, duration: Seconds) -> i32 {
        weighted(duration.max(0), self.transit_reluctance)
    }

    /// Cost of a walking transfer whose network cost is `network_cost`.
    pub fn transfer(&self, network_cost: i32) -> i32 {
        network_cost + self.transfer_cost
    }
}

fn weighted(seconds: Seconds, reluctance: f64) -> i32 {
    (f64::from(seconds) * reluctance).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights() {
        let cost = CostModel::default();

        assert_eq!(cost.boarding(60, false), 660);
        assert_eq!(cost.riding(240), 240);
        assert_eq!(cost.waiting(-5), 0);
    }

    #[test]
    fn transfer_cost_applies_to_transfers_only() {
        let cost = CostModel {
            transfer_cost: 300,
            ..CostModel::default()
        };

        assert_eq!(cost.boarding(0, false), 600);
        assert_eq!(cost.boarding(0, true), 900);
        assert_eq!(cost.transfer(480), 780);
    }

    #[test]
    fn reluctance_is_rounded() {
        let cost = CostModel {
            transit_reluctance: 1.5,
            ..CostModel::default()
        };
        assert_eq!(cost.riding(3), 5);
    }

    #[test]
    fn only_search_weights_are_configurable() {
        let json = serde_json::to_value(CostModel::default()).unwrap();
        let mut fields: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        fields.sort();
        assert_eq!(
            fields,
            ["board_cost", "transfer_cost", "transit_reluctance", "wait_reluctance"]
        );
    }
}
