//! Engine requests and the search parameters actually used.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::cost::CostModel;
use super::criteria::DominanceModel;
use super::direction::SearchDirection;
use crate::domain::{AccessEgressLeg, Seconds};
use crate::transit::Slack;

/// What the engine optimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RaptorProfile {
    /// Best time per transfer count.
    #[default]
    Standard,
    /// Pareto set over time, transfers and cost.
    MultiCriteria,
}

impl RaptorProfile {
    pub fn dominance_model(&self) -> DominanceModel {
        match self {
            RaptorProfile::Standard => DominanceModel::standard(),
            RaptorProfile::MultiCriteria => DominanceModel::multi_criteria(),
        }
    }
}

/// A transit search.
///
/// Times are seconds from the search time zero. At least one of the
/// earliest departure and latest arrival must be set.
#[derive(Debug, Clone)]
pub struct RaptorRequest {
    pub profile: RaptorProfile,
    pub direction: SearchDirection,
    pub earliest_departure_time: Option<Seconds>,
    pub latest_arrival_time: Option<Seconds>,
    /// `None` lets the engine size the window.
    pub search_window: Option<Seconds>,
    pub access: Vec<AccessEgressLeg>,
    pub egress: Vec<AccessEgressLeg>,
    pub slack: Slack,
    pub cost: CostModel,
    /// Overrides the tuned maximum.
    pub max_transfers: Option<usize>,
    pub deadline: Option<Instant>,
}

impl RaptorRequest {
    pub fn builder() -> RaptorRequestBuilder {
        RaptorRequestBuilder::default()
    }
}

/// Fluent builder for [`RaptorRequest`].
///
/// # Examples
///
/// ```
/// use transit_router::domain::AccessEgressLeg;
/// use transit_router::raptor::{RaptorProfile, RaptorRequest, SearchDirection};
///
/// let request = RaptorRequest::builder()
///     .profile(RaptorProfile::MultiCriteria)
///     .direction(SearchDirection::Reverse)
///     .latest_arrival_time(1800)
///     .access(AccessEgressLeg::walk(0, 600, 4.0))
///     .egress(AccessEgressLeg::walk(4, 60, 4.0))
///     .build();
///
/// assert_eq!(request.latest_arrival_time, Some(1800));
/// assert!(request.earliest_departure_time.is_none());
/// ```
#[derive(Debug, Default)]
pub struct RaptorRequestBuilder {
    profile: RaptorProfile,
    direction: SearchDirection,
    earliest_departure_time: Option<Seconds>,
    latest_arrival_time: Option<Seconds>,
    search_window: Option<Seconds>,
    access: Vec<AccessEgressLeg>,
    egress: Vec<AccessEgressLeg>,
    slack: Slack,
    cost: CostModel,
    max_transfers: Option<usize>,
    deadline: Option<Instant>,
}

impl RaptorRequestBuilder {
    pub fn profile(mut self, profile: RaptorProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn direction(mut self, direction: SearchDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn earliest_departure_time(mut self, time: Seconds) -> Self {
        self.earliest_departure_time = Some(time);
        self
    }

    pub fn latest_arrival_time(mut self, time: Seconds) -> Self {
        self.latest_arrival_time = Some(time);
        self
    }

    pub fn search_window(mut self, window: Seconds) -> Self {
        self.search_window = Some(window);
        self
    }

    pub fn access(mut self, leg: AccessEgressLeg) -> Self {
        self.access.push(leg);
        self
    }

    pub fn access_legs(mut self, legs: impl IntoIterator<Item = AccessEgressLeg>) -> Self {
        self.access.extend(legs);
        self
    }

    pub fn egress(mut self, leg: AccessEgressLeg) -> Self {
        self.egress.push(leg);
        self
    }

    pub fn egress_legs(mut self, legs: impl IntoIterator<Item = AccessEgressLeg>) -> Self {
        self.egress.extend(legs);
        self
    }

    pub fn slack(mut self, slack: Slack) -> Self {
        self.slack = slack;
        self
    }

    pub fn cost(mut self, cost: CostModel) -> Self {
        self.cost = cost;
        self
    }

    pub fn max_transfers(mut self, max: usize) -> Self {
        self.max_transfers = Some(max);
        self
    }

    pub fn deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn build(self) -> RaptorRequest {
        RaptorRequest {
            profile: self.profile,
            direction: self.direction,
            earliest_departure_time: self.earliest_departure_time,
            latest_arrival_time: self.latest_arrival_time,
            search_window: self.search_window,
            access: self.access,
            egress: self.egress,
            slack: self.slack,
            cost: self.cost,
            max_transfers: self.max_transfers,
            deadline: self.deadline,
        }
    }
}

/// The time window a search actually covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Start of the departure window.
    pub earliest_departure_time: Seconds,
    pub latest_arrival_time: Option<Seconds>,
    /// Length of the window in seconds.
    pub search_window: Seconds,
    /// True when the caller gave the window rather than the engine sizing it.
    pub search_window_set: bool,
}

impl SearchParams {
    /// End of the departure window.
    pub fn latest_departure_time(&self) -> Seconds {
        self.earliest_departure_time + self.search_window
    }
}
