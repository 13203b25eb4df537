//! Per-search stop arrival state.
//!
//! Every accepted arrival is appended to an arena and never moved, so paths
//! can be rebuilt by following `previous` links. Each stop keeps a Pareto
//! frontier of references into the arena. Frontiers live for the whole
//! range search; an arrival pushed out of its frontier stays in the arena
//! because destination paths may still point at it.

use super::criteria::{Label, Labelled};
use super::pareto::{LabelComparator, ParetoSet};
use crate::domain::Seconds;
use crate::transit::{RouteIndex, StopIndex};

/// Index of an arrival in the arena.
pub type ArrivalId = usize;

/// How an arrival reached its stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrivalKind {
    /// Seeded from the access leg (forward) or egress leg (reverse) at this
    /// index.
    Access { leg: usize },
    /// Rode `trip` of `route`. Positions are in search order: a reverse
    /// search boards where the traveller really gets off.
    Transit {
        previous: ArrivalId,
        route: RouteIndex,
        trip: usize,
        board_position: usize,
        alight_position: usize,
    },
    /// Walked between two stops, given in travel order.
    Transfer {
        previous: ArrivalId,
        from: StopIndex,
        to: StopIndex,
        duration: Seconds,
    },
}

/// An accepted stop arrival.
#[derive(Debug, Clone)]
pub struct Arrival {
    pub stop: StopIndex,
    pub label: Label,
    pub round: usize,
    pub kind: ArrivalKind,
    /// True after transit, a transfer, or a leg with on-demand rides. Such
    /// arrivals need transfer slack before the next boarding.
    pub arrived_by_vehicle: bool,
}

impl Arrival {
    pub fn previous(&self) -> Option<ArrivalId> {
        match self.kind {
            ArrivalKind::Access { .. } => None,
            ArrivalKind::Transit { previous, .. } | ArrivalKind::Transfer { previous, .. } => {
                Some(previous)
            }
        }
    }

    pub fn is_transit(&self) -> bool {
        matches!(self.kind, ArrivalKind::Transit { .. })
    }
}

#[derive(Debug, Clone, Copy)]
struct StopLabel {
    label: Label,
    arrival: ArrivalId,
}

impl Labelled for StopLabel {
    fn label(&self) -> &Label {
        &self.label
    }
}

/// Arrival arena plus one frontier per stop.
#[derive(Debug)]
pub struct SearchState {
    arrivals: Vec<Arrival>,
    frontiers: Vec<ParetoSet<StopLabel>>,
    comparator: LabelComparator,
}

impl SearchState {
    pub fn new(num_stops: usize, comparator: LabelComparator) -> Self {
        Self {
            arrivals: Vec::new(),
            frontiers: (0..num_stops).map(|_| ParetoSet::new()).collect(),
            comparator,
        }
    }

    /// Offer an arrival to its stop's frontier. Returns its id if accepted.
    pub fn add(&mut self, arrival: Arrival) -> Option<ArrivalId> {
        let id = self.arrivals.len();
        let frontier = self.frontiers.get_mut(arrival.stop)?;
        let candidate = StopLabel {
            label: arrival.label,
            arrival: id,
        };
        if !frontier.insert(&self.comparator, candidate) {
            return None;
        }
        self.arrivals.push(arrival);
        Some(id)
    }

    pub fn arrival(&self, id: ArrivalId) -> &Arrival {
        &self.arrivals[id]
    }

    /// True while the arrival is still in its stop's frontier.
    pub fn is_current(&self, id: ArrivalId) -> bool {
        let stop = self.arrivals[id].stop;
        self.frontiers[stop].iter().any(|l| l.arrival == id)
    }

    /// Labels currently at `stop`.
    #[cfg(test)]
    pub fn labels_at(&self, stop: StopIndex) -> impl Iterator<Item = &Label> + '_ {
        self.frontiers
            .get(stop)
            .into_iter()
            .flat_map(|f| f.iter().map(|l| &l.label))
    }

    pub fn num_arrivals(&self) -> usize {
        self.arrivals.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raptor::criteria::DominanceModel;
    use crate::raptor::direction::SearchDirection;

    fn access(stop: StopIndex, time: Seconds, transfers: u32, cost: i32) -> Arrival {
        Arrival {
            stop,
            label: Label::new(time, transfers, cost),
            round: 0,
            kind: ArrivalKind::Access { leg: 0 },
            arrived_by_vehicle: false,
        }
    }

    fn state() -> SearchState {
        SearchState::new(
            3,
            LabelComparator::new(DominanceModel::multi_criteria(), SearchDirection::Forward),
        )
    }

    #[test]
    fn arrivals_replace_dominated_ones() {
        let mut state = state();
        let first = state.add(access(1, 780, 2, 720)).unwrap();
        assert!(state.is_current(first));

        assert!(state.add(access(1, 840, 2, 720)).is_none());

        let second = state.add(access(1, 720, 2, 720)).unwrap();
        assert!(state.is_current(second));
        assert!(!state.is_current(first));
        // The replaced arrival is still reachable for path building.
        assert_eq!(state.arrival(first).label.time, 780);
        assert_eq!(state.num_arrivals(), 2);
        assert_eq!(state.labels_at(1).count(), 1);
    }

    #[test]
    fn unknown_stop_is_ignored() {
        let mut state = state();
        assert!(state.add(access(7, 0, 0, 0)).is_none());
        assert_eq!(state.labels_at(7).count(), 0);
    }

    #[test]
    fn previous_links() {
        let transit = Arrival {
            stop: 2,
            label: Label::new(1080, 0, 3480),
            round: 1,
            kind: ArrivalKind::Transit {
                previous: 0,
                route: 0,
                trip: 0,
                board_position: 0,
                alight_position: 4,
            },
            arrived_by_vehicle: true,
        };
        assert_eq!(transit.previous(), Some(0));
        assert!(transit.is_transit());
        assert_eq!(access(0, 0, 0, 0).previous(), None);
    }
}
