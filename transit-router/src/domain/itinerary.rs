//! Itineraries returned to the caller.
//!
//! An `Itinerary` is a complete trip from origin to destination: street or
//! on-demand legs to and from the network, transit rides and walking
//! transfers. Direct street and flex searches produce itineraries with no
//! transit legs at all.

use std::fmt;

use chrono::{DateTime, Duration, FixedOffset};

use super::request::StreetMode;
use crate::transit::TransitMode;

/// Error building an itinerary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItineraryError {
    #[error("itinerary has no legs")]
    Empty,

    #[error("leg {index} starts before the previous leg ends")]
    OutOfOrder { index: usize },

    #[error("leg {index} ends before it starts")]
    NegativeDuration { index: usize },
}

/// What kind of travel a leg is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LegKind {
    /// Walking, cycling or driving on the street network.
    Street(StreetMode),
    /// On-demand travel, possibly combined with walking. `rides` is the
    /// number of transfer slots the leg consumes.
    Flex { rides: u32 },
    /// A ride on a scheduled trip.
    Transit {
        route: String,
        mode: TransitMode,
        trip: String,
    },
    /// A walk between two stops.
    Transfer,
}

/// One leg of an itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Leg {
    pub kind: LegKind,
    pub from: String,
    pub to: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl Leg {
    pub fn new(
        kind: LegKind,
        from: impl Into<String>,
        to: impl Into<String>,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            kind,
            from: from.into(),
            to: to.into(),
            start,
            end,
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_transit(&self) -> bool {
        matches!(self.kind, LegKind::Transit { .. })
    }

    pub fn is_walk(&self) -> bool {
        matches!(
            self.kind,
            LegKind::Street(StreetMode::Walk) | LegKind::Transfer
        )
    }
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let minutes = self.duration().num_minutes();
        match &self.kind {
            LegKind::Street(StreetMode::Walk) | LegKind::Transfer => write!(f, "Walk {minutes}m"),
            LegKind::Street(mode) => write!(f, "{mode} {minutes}m"),
            LegKind::Flex { rides } => write!(f, "Flex {minutes}m {rides}x"),
            LegKind::Transit { route, mode, .. } => write!(
                f,
                "{mode} {route} {} {}",
                self.start.format("%H:%M"),
                self.end.format("%H:%M")
            ),
        }
    }
}

/// A complete trip from origin to destination.
///
/// # Invariants
///
/// - At least one leg
/// - Legs are in time order and none has a negative duration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Itinerary {
    legs: Vec<Leg>,
    generalized_cost: i32,
}

impl Itinerary {
    /// Build an itinerary from legs in travel order.
    ///
    /// # Errors
    ///
    /// Returns `Err` if there are no legs, or legs overlap in time.
    pub fn new(legs: Vec<Leg>, generalized_cost: i32) -> Result<Self, ItineraryError> {
        if legs.is_empty() {
            return Err(ItineraryError::Empty);
        }
        for (index, leg) in legs.iter().enumerate() {
            if leg.end < leg.start {
                return Err(ItineraryError::NegativeDuration { index });
            }
            if index > 0 && leg.start < legs[index - 1].end {
                return Err(ItineraryError::OutOfOrder { index });
            }
        }
        Ok(Self {
            legs,
            generalized_cost,
        })
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn start_time(&self) -> DateTime<FixedOffset> {
        self.legs[0].start
    }

    pub fn end_time(&self) -> DateTime<FixedOffset> {
        self.legs[self.legs.len() - 1].end
    }

    pub fn duration(&self) -> Duration {
        self.end_time() - self.start_time()
    }

    pub fn generalized_cost(&self) -> i32 {
        self.generalized_cost
    }

    pub fn has_transit(&self) -> bool {
        self.legs.iter().any(Leg::is_transit)
    }

    /// Number of transit rides minus one, never negative.
    pub fn num_transfers(&self) -> usize {
        self.legs
            .iter()
            .filter(|leg| leg.is_transit())
            .count()
            .saturating_sub(1)
    }

    /// True when the whole trip is on foot.
    pub fn is_walk_only(&self) -> bool {
        self.legs.iter().all(Leg::is_walk)
    }
}

impl fmt::Display for Itinerary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, leg) in self.legs.iter().enumerate() {
            if i > 0 {
                write!(f, " ~ {} ~ ", leg.from)?;
            }
            write!(f, "{leg}")?;
        }
        write!(
            f,
            " [{} {} {}m ${}]",
            self.start_time().format("%H:%M"),
            self.end_time().format("%H:%M"),
            self.duration().num_minutes(),
            self.generalized_cost
        )
    }
}

/// Why a filter removed an itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemovalReason {
    /// A walk-only result while the caller did not ask for direct walking.
    WalkAllTheWay,
    /// Departs after the end of the search window.
    OutsideSearchWindow,
    /// Ranked below the requested number of itineraries.
    NumItinerariesLimit,
}

impl fmt::Display for RemovalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RemovalReason::WalkAllTheWay => "walk all the way",
            RemovalReason::OutsideSearchWindow => "outside search window",
            RemovalReason::NumItinerariesLimit => "number of itineraries limit",
        };
        f.write_str(s)
    }
}

/// An itinerary as seen after filtering: kept, or removed with a reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilteredItinerary {
    Kept(Itinerary),
    Removed {
        itinerary: Itinerary,
        reason: RemovalReason,
    },
}

impl FilteredItinerary {
    pub fn itinerary(&self) -> &Itinerary {
        match self {
            FilteredItinerary::Kept(it) => it,
            FilteredItinerary::Removed { itinerary, .. } => itinerary,
        }
    }

    pub fn is_kept(&self) -> bool {
        matches!(self, FilteredItinerary::Kept(_))
    }

    /// Mark as removed. Already removed entries keep their first reason.
    pub fn remove(self, reason: RemovalReason) -> Self {
        match self {
            FilteredItinerary::Kept(itinerary) => FilteredItinerary::Removed { itinerary, reason },
            removed => removed,
        }
    }
}
