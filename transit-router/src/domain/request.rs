//! Routing requests.

use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::cursor::{PageCursor, PageKind};
use super::error::{InputField, RoutingError, RoutingErrorCode, SearchError};

/// Which engine profile answers the transit part of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchProfile {
    /// Best arrival per number of transfers.
    Standard,
    /// As `Standard`, but searching backwards from the arrival side.
    StandardReverse,
    /// Full Pareto set over time, transfers and generalized cost.
    #[default]
    MultiCriteria,
}

/// Street or on-demand mode for direct, access and egress travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreetMode {
    /// Not chosen by the caller; resolved by the routing worker.
    #[default]
    NotSet,
    Walk,
    Bike,
    Car,
    Flexible,
}

impl fmt::Display for StreetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StreetMode::NotSet => "not set",
            StreetMode::Walk => "walk",
            StreetMode::Bike => "bike",
            StreetMode::Car => "car",
            StreetMode::Flexible => "flexible",
        };
        f.write_str(s)
    }
}

/// An origin or destination already resolved by the caller.
///
/// The id is whatever the access/egress provider understands: a stop id, a
/// coordinate pair, a place reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
}

impl Location {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Which end of the search window gets cut when too many itineraries are
/// found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CropSide {
    /// Drop the latest departures; keep the start of the window.
    Tail,
    /// Drop the earliest departures; keep the end of the window.
    Head,
}

/// A journey planning request.
///
/// `date_time` is a departure time unless `arrive_by` is set, so exactly one
/// of earliest-departure and latest-arrival is defined.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub from: Location,
    pub to: Location,
    pub date_time: DateTime<FixedOffset>,
    pub arrive_by: bool,
    /// `None` lets the search pick a window from the expected travel time.
    pub search_window: Option<Duration>,
    pub num_itineraries: usize,
    pub search_profile: SearchProfile,
    pub direct_mode: StreetMode,
    pub access_mode: StreetMode,
    pub egress_mode: StreetMode,
    pub page_cursor: Option<PageCursor>,
    /// Wall-clock instant after which the request must not start work.
    pub deadline: Option<Instant>,
}

impl RouteRequest {
    /// Depart from `from` at or after `date_time`.
    pub fn depart_after(from: Location, to: Location, date_time: DateTime<FixedOffset>) -> Self {
        Self {
            from,
            to,
            date_time,
            arrive_by: false,
            search_window: None,
            num_itineraries: 50,
            search_profile: SearchProfile::default(),
            direct_mode: StreetMode::NotSet,
            access_mode: StreetMode::Walk,
            egress_mode: StreetMode::Walk,
            page_cursor: None,
            deadline: None,
        }
    }

    /// Arrive at `to` at or before `date_time`.
    pub fn arrive_by(from: Location, to: Location, date_time: DateTime<FixedOffset>) -> Self {
        Self {
            arrive_by: true,
            ..Self::depart_after(from, to, date_time)
        }
    }

    pub fn with_search_window(mut self, window: Duration) -> Self {
        self.search_window = Some(window);
        self
    }

    pub fn with_num_itineraries(mut self, n: usize) -> Self {
        self.num_itineraries = n;
        self
    }

    pub fn with_profile(mut self, profile: SearchProfile) -> Self {
        self.search_profile = profile;
        self
    }

    pub fn with_direct_mode(mut self, mode: StreetMode) -> Self {
        self.direct_mode = mode;
        self
    }

    pub fn with_access_egress_mode(mut self, access: StreetMode, egress: StreetMode) -> Self {
        self.access_mode = access;
        self.egress_mode = egress;
        self
    }

    pub fn with_page_cursor(mut self, cursor: PageCursor) -> Self {
        self.page_cursor = Some(cursor);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Check the parameters that do not depend on the network.
    pub fn validate(&self) -> Result<(), SearchError> {
        let mut errors = Vec::new();
        if self.search_window.is_some_and(|w| w < Duration::zero()) {
            errors.push(RoutingError::for_field(
                RoutingErrorCode::InvalidSearchTime,
                InputField::DateTime,
            ));
        }
        if self.num_itineraries == 0 {
            errors.push(RoutingError::new(RoutingErrorCode::InvalidSearchTime));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(SearchError::Validation(errors))
        }
    }

    /// Replace time, window and direct mode with those of the page cursor.
    ///
    /// Paging to a page without a latest-arrival time switches to a
    /// depart-after search. Direct results were returned on the first page,
    /// so the direct mode goes back to unset.
    pub fn apply_page_cursor(&mut self) {
        let Some(cursor) = self.page_cursor.clone() else {
            return;
        };
        if cursor.latest_arrival_time.is_none() {
            self.arrive_by = false;
        }
        self.date_time = match (self.arrive_by, cursor.latest_arrival_time) {
            (true, Some(lat)) => lat,
            _ => cursor.earliest_departure_time,
        };
        self.search_window = Some(cursor.search_window());
        self.direct_mode = StreetMode::NotSet;
        debug!(date_time = %self.date_time, kind = ?cursor.kind, "request time set from page cursor");
    }

    /// Side of the window to crop when too many results are found.
    pub fn crop_side(&self) -> CropSide {
        match self.page_cursor.as_ref().map(|c| c.kind) {
            Some(PageKind::Next) => CropSide::Tail,
            Some(PageKind::Previous) => CropSide::Head,
            None if self.arrive_by => CropSide::Head,
            None => CropSide::Tail,
        }
    }

    /// True when past the deadline.
    pub fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}
