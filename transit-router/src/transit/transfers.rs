//! Walking transfers between stops.
//!
//! Some stops are close enough to walk between, enabling connections that
//! don't appear in any route. Transfers are directed; add both directions
//! for a symmetric path.

use crate::domain::Seconds;

use super::timetable::StopIndex;

/// A walking transfer to or from a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    /// The other end of the transfer: the target in [`Transfers::from_stop`],
    /// the source in [`Transfers::to_stop`].
    pub stop: StopIndex,
    pub duration: Seconds,
    pub generalized_cost: i32,
}

/// Transfers indexed by both ends, for forward and reverse searches.
#[derive(Debug, Clone, Default)]
pub struct Transfers {
    outgoing: Vec<Vec<Transfer>>,
    incoming: Vec<Vec<Transfer>>,
}

impl Transfers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a one-way transfer `from` → `to`.
    pub fn add(&mut self, from: StopIndex, to: StopIndex, duration: Seconds, generalized_cost: i32) {
        let needed = from.max(to) + 1;
        if self.outgoing.len() < needed {
            self.outgoing.resize_with(needed, Vec::new);
            self.incoming.resize_with(needed, Vec::new);
        }
        self.outgoing[from].push(Transfer {
            stop: to,
            duration,
            generalized_cost,
        });
        self.incoming[to].push(Transfer {
            stop: from,
            duration,
            generalized_cost,
        });
    }

    /// Transfers leaving `stop`.
    pub fn from_stop(&self, stop: StopIndex) -> &[Transfer] {
        self.outgoing.get(stop).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Transfers arriving at `stop`.
    pub fn to_stop(&self, stop: StopIndex) -> &[Transfer] {
        self.incoming.get(stop).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of directed transfers.
    pub fn len(&self) -> usize {
        self.outgoing.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Highest stop index mentioned, if any.
    pub(super) fn max_stop(&self) -> Option<StopIndex> {
        self.outgoing.len().checked_sub(1)
    }
}
