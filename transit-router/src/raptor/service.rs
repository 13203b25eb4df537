//! Engine entry point.
//!
//! [`RaptorService::route`] validates a request, sizes the search window
//! when the caller did not, and runs the worker in the requested direction.

use std::time::Instant;

use tracing::{debug, trace};

use super::direction::{Forward, Reverse, SearchDirection, TimeCalculator};
use super::path::Path;
use super::request::{RaptorProfile, RaptorRequest, SearchParams};
use super::tuning::RaptorTuning;
use super::worker::{RangeRaptorWorker, SearchStats};
use crate::domain::{InputField, RoutingError, RoutingErrorCode, SearchError, Seconds};
use crate::transit::TransitData;

/// Result of a transit search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaptorResponse {
    /// Non-dominated paths, earliest arrival first.
    pub paths: Vec<Path>,
    pub search_params: SearchParams,
}

/// Runs range-RAPTOR searches with fixed tuning.
#[derive(Debug, Clone, Default)]
pub struct RaptorService {
    tuning: RaptorTuning,
}

impl RaptorService {
    pub fn new(tuning: RaptorTuning) -> Self {
        Self { tuning }
    }

    pub fn tuning(&self) -> &RaptorTuning {
        &self.tuning
    }

    /// Search `data` for paths matching `request`.
    ///
    /// An unreachable destination is not an error: the response simply has
    /// no paths.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Validation`] for conflicting times or missing
    ///   access/egress legs
    /// - [`SearchError::Timeout`] when the deadline passes
    /// - [`SearchError::System`] when a leg refers to an unknown stop
    pub fn route(&self, data: &TransitData, request: &RaptorRequest) -> Result<RaptorResponse, SearchError> {
        validate(data, request)?;
        if request.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(SearchError::Timeout);
        }

        let edt = request.earliest_departure_time;
        let lat = request.latest_arrival_time;
        let needs_travel_time = edt.is_none()
            || (request.direction == SearchDirection::Reverse && lat.is_none())
            || (request.search_window.is_none() && lat.is_none());

        let min_travel_time = if needs_travel_time {
            match self.min_travel_time(data, request)? {
                Some(t) => Some(t),
                None => {
                    debug!("destination not reachable, skipping range search");
                    return Ok(RaptorResponse {
                        paths: Vec::new(),
                        search_params: self.unreachable_params(request),
                    });
                }
            }
        } else {
            None
        };
        let travel = min_travel_time.unwrap_or(0);

        let window = match (request.search_window, edt, lat) {
            (Some(window), _, _) => window,
            (None, Some(e), Some(l)) => l - e,
            (None, _, _) => self.tuning.dynamic_search_window.window_for(travel),
        };
        let earliest_departure = edt.unwrap_or_else(|| lat.unwrap_or(0) - travel - window);
        let latest_arrival = lat.unwrap_or(earliest_departure + window + travel);

        let max_transfers = request.max_transfers.unwrap_or(self.tuning.max_transfers);
        let step = self.tuning.iteration_step_secs.max(1);

        let (paths, stats) = match request.direction {
            SearchDirection::Forward => {
                let iterations = Forward::iterations(earliest_departure, latest_arrival, window, step);
                RangeRaptorWorker::<Forward>::new(data, request, max_transfers).run(&iterations)?
            }
            SearchDirection::Reverse => {
                let iterations = Reverse::iterations(earliest_departure, latest_arrival, window, step);
                RangeRaptorWorker::<Reverse>::new(data, request, max_transfers).run(&iterations)?
            }
        };
        log_stats(request, &stats, paths.len());

        Ok(RaptorResponse {
            paths,
            search_params: SearchParams {
                earliest_departure_time: earliest_departure,
                latest_arrival_time: lat,
                search_window: window,
                search_window_set: request.search_window.is_some(),
            },
        })
    }

    /// Shortest travel time found by one standard iteration from whichever
    /// end of the trip has a fixed time.
    fn min_travel_time(&self, data: &TransitData, request: &RaptorRequest) -> Result<Option<Seconds>, SearchError> {
        let max_transfers = request.max_transfers.unwrap_or(self.tuning.max_transfers);
        let mut heuristic = request.clone();
        heuristic.profile = RaptorProfile::Standard;
        heuristic.search_window = Some(0);

        let paths = match request.earliest_departure_time {
            Some(edt) => {
                heuristic.direction = SearchDirection::Forward;
                RangeRaptorWorker::<Forward>::new(data, &heuristic, max_transfers)
                    .run(&[edt])?
                    .0
            }
            None => {
                let lat = request.latest_arrival_time.unwrap_or(0);
                heuristic.direction = SearchDirection::Reverse;
                RangeRaptorWorker::<Reverse>::new(data, &heuristic, max_transfers)
                    .run(&[lat])?
                    .0
            }
        };

        let min = paths.iter().map(Path::duration).min();
        trace!(min_travel_time = ?min, "travel time heuristic");
        Ok(min)
    }

    fn unreachable_params(&self, request: &RaptorRequest) -> SearchParams {
        let window = request
            .search_window
            .unwrap_or_else(|| self.tuning.dynamic_search_window.window_for(0));
        let earliest_departure = request
            .earliest_departure_time
            .unwrap_or_else(|| request.latest_arrival_time.unwrap_or(0) - window);
        SearchParams {
            earliest_departure_time: earliest_departure,
            latest_arrival_time: request.latest_arrival_time,
            search_window: window,
            search_window_set: request.search_window.is_some(),
        }
    }
}

fn validate(data: &TransitData, request: &RaptorRequest) -> Result<(), SearchError> {
    let mut errors = Vec::new();
    match (request.earliest_departure_time, request.latest_arrival_time) {
        (None, None) => errors.push(RoutingError::for_field(
            RoutingErrorCode::InvalidSearchTime,
            InputField::DateTime,
        )),
        (Some(edt), Some(lat)) if edt > lat => errors.push(RoutingError::for_field(
            RoutingErrorCode::InvalidSearchTime,
            InputField::DateTime,
        )),
        _ => {}
    }
    if request.search_window.is_some_and(|w| w < 0) {
        errors.push(RoutingError::new(RoutingErrorCode::InvalidSearchTime));
    }
    if request.access.is_empty() {
        errors.push(RoutingError::for_field(RoutingErrorCode::NoStopsInRange, InputField::From));
    }
    if request.egress.is_empty() {
        errors.push(RoutingError::for_field(RoutingErrorCode::NoStopsInRange, InputField::To));
    }
    if !errors.is_empty() {
        return Err(SearchError::Validation(errors));
    }

    if let Some(leg) = request
        .access
        .iter()
        .chain(&request.egress)
        .find(|leg| leg.stop >= data.num_stops())
    {
        return Err(SearchError::System(format!(
            "access/egress leg refers to unknown stop {}",
            leg.stop
        )));
    }
    Ok(())
}

fn log_stats(request: &RaptorRequest, stats: &SearchStats, paths: usize) {
    debug!(
        direction = ?request.direction,
        profile = ?request.profile,
        iterations = stats.iterations,
        rounds = stats.rounds,
        arrivals = stats.arrivals,
        deepest_round = stats.deepest_round,
        paths,
        "range raptor search complete"
    );
}
