//! Labels and dominance.
//!
//! A [`Label`] is the value of a partial journey at a stop: the time it gets
//! there, how many transfers it used and its generalized cost. Whether one
//! label beats another depends on the [`DominanceModel`] of the profile and
//! on the search direction, since a reverse search prefers later times.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::direction::SearchDirection;
use crate::domain::Seconds;

/// Criteria of a partial journey at a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label {
    /// Arrival time (forward) or departure time (reverse).
    pub time: Seconds,
    pub transfers: u32,
    pub cost: i32,
}

impl Label {
    pub fn new(time: Seconds, transfers: u32, cost: i32) -> Self {
        Self {
            time,
            transfers,
            cost,
        }
    }
}

/// Something carrying a label, so it can live in a Pareto set.
pub trait Labelled {
    fn label(&self) -> &Label;
}

impl Labelled for Label {
    fn label(&self) -> &Label {
        self
    }
}

/// Secondary ordering used by the single-criterion model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tiebreak {
    /// Equal times are ordered by fewer transfers.
    #[default]
    FewerTransfers,
    /// Equal times are ordered by fewer transfers, then lower cost.
    FewerTransfersThenCost,
}

/// The criteria a multi-criterion comparison looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Criteria {
    pub time: bool,
    pub transfers: bool,
    pub cost: bool,
}

impl Criteria {
    pub const ALL: Criteria = Criteria {
        time: true,
        transfers: true,
        cost: true,
    };

    pub const TIME_AND_TRANSFERS: Criteria = Criteria {
        time: true,
        transfers: true,
        cost: false,
    };
}

/// How labels at the same stop are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DominanceModel {
    /// Total order: best time, then the tiebreak. A frontier holds at most
    /// one label.
    SingleCriterion { tiebreak: Tiebreak },
    /// Pareto order over the selected criteria.
    MultiCriterion { criteria: Criteria },
}

impl DominanceModel {
    pub fn standard() -> Self {
        DominanceModel::SingleCriterion {
            tiebreak: Tiebreak::FewerTransfers,
        }
    }

    pub fn multi_criteria() -> Self {
        DominanceModel::MultiCriterion {
            criteria: Criteria::ALL,
        }
    }

    /// True when `a` dominates `b`.
    pub fn dominates(&self, direction: SearchDirection, a: &Label, b: &Label) -> bool {
        match self {
            DominanceModel::SingleCriterion { tiebreak } => {
                total_order(direction, *tiebreak, a, b) == Ordering::Less
            }
            DominanceModel::MultiCriterion { criteria } => {
                let mut strictly_better = false;
                for ord in criterion_orderings(direction, criteria, a, b) {
                    match ord {
                        Ordering::Greater => return false,
                        Ordering::Less => strictly_better = true,
                        Ordering::Equal => {}
                    }
                }
                strictly_better
            }
        }
    }

    /// True when neither label beats the other on any compared criterion.
    pub fn same_criteria(&self, direction: SearchDirection, a: &Label, b: &Label) -> bool {
        match self {
            DominanceModel::SingleCriterion { tiebreak } => {
                total_order(direction, *tiebreak, a, b) == Ordering::Equal
            }
            DominanceModel::MultiCriterion { criteria } => {
                criterion_orderings(direction, criteria, a, b).all(|o| o == Ordering::Equal)
            }
        }
    }

    /// Neither label dominates the other.
    pub fn incomparable(&self, direction: SearchDirection, a: &Label, b: &Label) -> bool {
        !self.dominates(direction, a, b) && !self.dominates(direction, b, a)
    }
}

/// Compare times so that `Less` means "better".
pub fn compare_time(direction: SearchDirection, a: Seconds, b: Seconds) -> Ordering {
    match direction {
        SearchDirection::Forward => a.cmp(&b),
        SearchDirection::Reverse => b.cmp(&a),
    }
}

fn total_order(direction: SearchDirection, tiebreak: Tiebreak, a: &Label, b: &Label) -> Ordering {
    let ord = compare_time(direction, a.time, b.time).then(a.transfers.cmp(&b.transfers));
    match tiebreak {
        Tiebreak::FewerTransfers => ord,
        Tiebreak::FewerTransfersThenCost => ord.then(a.cost.cmp(&b.cost)),
    }
}

fn criterion_orderings(
    direction: SearchDirection,
    criteria: &Criteria,
    a: &Label,
    b: &Label,
) -> impl Iterator<Item = Ordering> {
    [
        criteria.time.then(|| compare_time(direction, a.time, b.time)),
        criteria.transfers.then(|| a.transfers.cmp(&b.transfers)),
        criteria.cost.then(|| a.cost.cmp(&b.cost)),
    ]
    .into_iter()
    .flatten()
}
