//! Access and egress legs.
//!
//! The street/flex router (outside this crate) turns the origin and
//! destination into candidate legs connecting them to transit stops. The
//! search engine only needs the stop, the duration and two cost numbers.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::time::{Seconds, format_duration};
use crate::transit::StopIndex;

/// Which end of the journey a leg serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessEgressKind {
    Access,
    Egress,
}

/// A street or on-demand leg between the origin/destination and a stop.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessEgressLeg {
    /// The transit stop the leg starts or ends at.
    pub stop: StopIndex,

    /// Travel time in seconds.
    pub duration: Seconds,

    /// Number of transfer slots the leg consumes when compared with other
    /// paths. Plain walking uses 0; a leg containing on-demand rides uses at
    /// least 1 so it never dominates walking access on transfers alone.
    pub transfer_penalty: u32,

    /// Generalized cost of the leg.
    pub generalized_cost: i32,
}

impl AccessEgressLeg {
    /// Create a leg with explicit penalty and cost.
    pub fn new(stop: StopIndex, duration: Seconds, transfer_penalty: u32, generalized_cost: i32) -> Self {
        Self {
            stop,
            duration,
            transfer_penalty,
            generalized_cost,
        }
    }

    /// A walking leg costed with `walk_reluctance`.
    pub fn walk(stop: StopIndex, duration: Seconds, walk_reluctance: f64) -> Self {
        let cost = (f64::from(duration) * walk_reluctance).round() as i32;
        Self::new(stop, duration, 0, cost)
    }

    /// True when the leg contains on-demand rides. Such legs arrive "like a
    /// vehicle" and need transfer slack before boarding transit.
    pub fn has_rides(&self) -> bool {
        self.transfer_penalty > 0
    }
}

impl fmt::Display for AccessEgressLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_rides() {
            write!(
                f,
                "Flex {} {}x",
                format_duration(self.duration),
                self.transfer_penalty
            )
        } else {
            write!(f, "Walk {}", format_duration(self.duration))
        }
    }
}
