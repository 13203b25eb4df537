//! Range-RAPTOR transit search.
//!
//! The engine answers "which non-dominated ways are there to get from these
//! access stops to these egress stops inside this departure window". It runs
//! forward (departure fixed) or reverse (arrival fixed), with a single
//! criterion (time, then transfers) or a full Pareto set over time,
//! transfers and generalized cost.
//!
//! Callers build a [`RaptorRequest`] and pass it to [`RaptorService::route`]
//! together with the [`crate::transit::TransitData`] to search.

mod cost;
mod criteria;
mod direction;
mod pareto;
mod path;
mod request;
mod service;
mod state;
mod tuning;
mod worker;

#[cfg(test)]
mod service_tests;

pub use cost::CostModel;
pub use criteria::{Criteria, DominanceModel, Label, Labelled, Tiebreak};
pub use direction::{Forward, Reverse, SearchDirection, TimeCalculator};
pub use pareto::{LabelComparator, ParetoComparator, ParetoSet};
pub use path::{DestinationComparator, Path, PathLeg, sort_paths};
pub use request::{RaptorProfile, RaptorRequest, RaptorRequestBuilder, SearchParams};
pub use service::{RaptorResponse, RaptorService};
pub use tuning::{DynamicSearchWindow, RaptorTuning};
pub use worker::SearchStats;
