//! Board, alight and transfer slack.

use serde::{Deserialize, Serialize};

use crate::domain::Seconds;

/// Minimum buffers applied around boarding and alighting.
///
/// Transfer slack is only added between two vehicles (including an
/// on-demand access/egress ride and a scheduled trip), never between a
/// walk and a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Slack {
    pub board: Seconds,
    pub alight: Seconds,
    pub transfer: Seconds,
}

impl Default for Slack {
    fn default() -> Self {
        Self {
            board: 0,
            alight: 0,
            transfer: 60,
        }
    }
}

impl Slack {
    pub fn new(board: Seconds, alight: Seconds, transfer: Seconds) -> Self {
        Self {
            board,
            alight,
            transfer,
        }
    }

    /// Slack required before boarding, given how the traveller got to the
    /// stop.
    pub fn before_boarding(&self, arrived_by_vehicle: bool) -> Seconds {
        if arrived_by_vehicle {
            self.board + self.transfer
        } else {
            self.board
        }
    }
}
