//! Routing error types.
//!
//! Two layers live here. [`RoutingError`] is a plain value describing why a
//! request could not be (fully) answered; values are hashable so errors
//! reported by several sub-searches collapse into one set entry.
//! [`SearchError`] is what a sub-search returns when it fails, and its
//! variant decides how the routing worker reacts.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Kinds of routing error, in reporting priority order.
///
/// When several errors are collected for one request only the first one in
/// declaration order is returned, so location problems are reported before
/// search-window problems, and the generic system error comes last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutingErrorCode {
    /// The origin or destination could not be matched to the network.
    LocationNotFound,
    /// No transit stop is reachable from the location.
    NoStopsInRange,
    /// The location is outside the area covered by the network.
    OutsideBounds,
    /// The requested date is outside the timetable period.
    OutsideServicePeriod,
    /// Conflicting or malformed time parameters.
    InvalidSearchTime,
    /// No transit connection exists between origin and destination.
    NoTransitConnection,
    /// Transit connections exist but none inside the search window.
    NoTransitConnectionInSearchWindow,
    /// All transit results were worse than walking.
    WalkingBetterThanTransit,
    /// A sub-search ran out of its time budget.
    ProcessingTimeout,
    /// Unexpected internal failure.
    SystemError,
}

impl fmt::Display for RoutingErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoutingErrorCode::LocationNotFound => "location not found",
            RoutingErrorCode::NoStopsInRange => "no stops in range",
            RoutingErrorCode::OutsideBounds => "outside bounds",
            RoutingErrorCode::OutsideServicePeriod => "outside service period",
            RoutingErrorCode::InvalidSearchTime => "invalid search time",
            RoutingErrorCode::NoTransitConnection => "no transit connection",
            RoutingErrorCode::NoTransitConnectionInSearchWindow => {
                "no transit connection in search window"
            }
            RoutingErrorCode::WalkingBetterThanTransit => "walking better than transit",
            RoutingErrorCode::ProcessingTimeout => "processing timeout",
            RoutingErrorCode::SystemError => "system error",
        };
        f.write_str(s)
    }
}

/// Which part of the request an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputField {
    From,
    To,
    DateTime,
}

/// A routing error reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoutingError {
    pub code: RoutingErrorCode,
    pub affected_locations: Vec<InputField>,
}

impl RoutingError {
    /// An error not tied to a particular input field.
    pub fn new(code: RoutingErrorCode) -> Self {
        Self {
            code,
            affected_locations: Vec::new(),
        }
    }

    /// An error about one input field.
    pub fn for_field(code: RoutingErrorCode, field: InputField) -> Self {
        Self {
            code,
            affected_locations: vec![field],
        }
    }
}

impl fmt::Display for RoutingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)?;
        if !self.affected_locations.is_empty() {
            write!(f, " ({:?})", self.affected_locations)?;
        }
        Ok(())
    }
}

/// Pick the error to report when several were collected.
///
/// Ties on the code are broken on the affected fields so the choice does not
/// depend on set iteration order.
pub fn first_routing_error(errors: &HashSet<RoutingError>) -> Option<&RoutingError> {
    errors
        .iter()
        .min_by(|a, b| (a.code, &a.affected_locations).cmp(&(b.code, &b.affected_locations)))
}

/// Failure of a search or sub-search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The request cannot be answered as posed. Recoverable: the errors are
    /// merged into the response and other sub-searches continue.
    #[error("routing validation failed: {}", join_errors(.0))]
    Validation(Vec<RoutingError>),

    /// The time budget ran out. Aborts the sub-search it happened in only.
    #[error("search timed out")]
    Timeout,

    /// Anything else. State can no longer be trusted and the whole request
    /// is aborted.
    #[error("system error: {0}")]
    System(String),
}

impl SearchError {
    /// Validation failure with a single error.
    pub fn validation(code: RoutingErrorCode, field: Option<InputField>) -> Self {
        let error = match field {
            Some(field) => RoutingError::for_field(code, field),
            None => RoutingError::new(code),
        };
        SearchError::Validation(vec![error])
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, SearchError::Validation(_))
    }
}

fn join_errors(errors: &[RoutingError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
