//! Paths found by the engine, in travel order with real times.

use std::cmp::Ordering;
use std::fmt;

use super::pareto::ParetoComparator;
use super::request::RaptorProfile;
use crate::domain::{AccessEgressLeg, Seconds, format_duration, format_time};
use crate::transit::{RouteIndex, StopIndex, TransitMode};

/// One leg of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathLeg {
    Access {
        leg: AccessEgressLeg,
        stop_name: String,
        start: Seconds,
        end: Seconds,
    },
    Transit {
        route: RouteIndex,
        route_name: String,
        mode: TransitMode,
        trip_id: String,
        from: StopIndex,
        from_name: String,
        to: StopIndex,
        to_name: String,
        board: Seconds,
        alight: Seconds,
    },
    Transfer {
        from_name: String,
        to_name: String,
        start: Seconds,
        end: Seconds,
    },
    Egress {
        leg: AccessEgressLeg,
        stop_name: String,
        start: Seconds,
        end: Seconds,
    },
}

impl PathLeg {
    pub fn start(&self) -> Seconds {
        match self {
            PathLeg::Access { start, .. }
            | PathLeg::Transfer { start, .. }
            | PathLeg::Egress { start, .. } => *start,
            PathLeg::Transit { board, .. } => *board,
        }
    }

    pub fn end(&self) -> Seconds {
        match self {
            PathLeg::Access { end, .. } | PathLeg::Transfer { end, .. } | PathLeg::Egress { end, .. } => {
                *end
            }
            PathLeg::Transit { alight, .. } => *alight,
        }
    }

    /// Stop the leg ends at, for legs ending inside the network.
    fn end_stop_name(&self) -> Option<&str> {
        match self {
            PathLeg::Access { stop_name, .. } => Some(stop_name),
            PathLeg::Transit { to_name, .. } => Some(to_name),
            PathLeg::Transfer { to_name, .. } => Some(to_name),
            PathLeg::Egress { .. } => None,
        }
    }
}

impl fmt::Display for PathLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathLeg::Access { leg, .. } | PathLeg::Egress { leg, .. } => write!(f, "{leg}"),
            PathLeg::Transit {
                route_name,
                mode,
                board,
                alight,
                ..
            } => write!(
                f,
                "{mode} {route_name} {} {}",
                format_time(*board),
                format_time(*alight)
            ),
            PathLeg::Transfer { start, end, .. } => {
                write!(f, "Walk {}", format_duration(end - start))
            }
        }
    }
}

/// A complete journey found by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub start: Seconds,
    pub end: Seconds,
    /// Transfers used, including access/egress transfer penalties.
    pub transfers: u32,
    pub cost: i32,
    pub legs: Vec<PathLeg>,
}

impl Path {
    pub fn duration(&self) -> Seconds {
        self.end - self.start
    }

    /// Number of scheduled transit rides.
    pub fn rides(&self) -> usize {
        self.legs
            .iter()
            .filter(|leg| matches!(leg, PathLeg::Transit { .. }))
            .count()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for leg in &self.legs {
            write!(f, "{leg}")?;
            if let Some(stop) = leg.end_stop_name() {
                write!(f, " ~ {stop} ~ ")?;
            }
        }
        write!(
            f,
            " [{} {} {} ${}]",
            format_time(self.start),
            format_time(self.end),
            format_duration(self.duration()),
            self.cost
        )
    }
}

/// Dominance between complete paths.
///
/// Leaving later and arriving earlier are both better. `Standard` then
/// compares the number of rides, `MultiCriteria` transfers and cost.
#[derive(Debug, Clone, Copy)]
pub struct DestinationComparator {
    profile: RaptorProfile,
}

impl DestinationComparator {
    pub fn new(profile: RaptorProfile) -> Self {
        Self { profile }
    }

    fn orderings(&self, a: &Path, b: &Path) -> [Ordering; 4] {
        let start = b.start.cmp(&a.start);
        let end = a.end.cmp(&b.end);
        match self.profile {
            RaptorProfile::Standard => [start, end, a.rides().cmp(&b.rides()), Ordering::Equal],
            RaptorProfile::MultiCriteria => {
                [start, end, a.transfers.cmp(&b.transfers), a.cost.cmp(&b.cost)]
            }
        }
    }
}

impl ParetoComparator<Path> for DestinationComparator {
    fn dominates(&self, a: &Path, b: &Path) -> bool {
        let ords = self.orderings(a, b);
        ords.iter().all(|o| *o != Ordering::Greater) && ords.contains(&Ordering::Less)
    }

    fn same_criteria(&self, a: &Path, b: &Path) -> bool {
        self.orderings(a, b).iter().all(|o| *o == Ordering::Equal)
    }
}

/// Order paths for output: arrival, then latest departure, transfers, cost.
pub fn sort_paths(paths: &mut [Path]) {
    paths.sort_by(|a, b| {
        a.end
            .cmp(&b.end)
            .then(b.start.cmp(&a.start))
            .then(a.transfers.cmp(&b.transfers))
            .then(a.cost.cmp(&b.cost))
    });
}
