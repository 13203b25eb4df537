//! Routes, trips and the stop index.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::transfers::{Transfer, Transfers};
use crate::domain::{Seconds, TimeError, parse_time_sequence};

/// Index of a stop in [`TransitData`].
pub type StopIndex = usize;

/// Index of a route in [`TransitData`].
pub type RouteIndex = usize;

/// Error building the transit network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    #[error("route {route}: needs at least two stops")]
    RouteTooShort { route: String },

    #[error("route {route}: trip {trip} has {actual} times, expected {expected}")]
    TripLengthMismatch {
        route: String,
        trip: String,
        expected: usize,
        actual: usize,
    },

    #[error("route {route}: trip {trip} runs backwards in time at position {position}")]
    TimesNotIncreasing {
        route: String,
        trip: String,
        position: usize,
    },

    #[error("route {route}: trip {trip} overtakes the previous trip at position {position}")]
    OvertakingTrips {
        route: String,
        trip: String,
        position: usize,
    },

    #[error("unknown stop index {0}")]
    UnknownStop(StopIndex),

    #[error(transparent)]
    Time(#[from] TimeError),
}

/// Vehicle type of a route, used when printing paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TransitMode {
    #[default]
    Bus,
    Tram,
    Rail,
    Subway,
    Ferry,
}

impl fmt::Display for TransitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransitMode::Bus => "BUS",
            TransitMode::Tram => "TRAM",
            TransitMode::Rail => "RAIL",
            TransitMode::Subway => "SUBWAY",
            TransitMode::Ferry => "FERRY",
        };
        f.write_str(s)
    }
}

/// Scheduled times of one trip along its route's stop pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripSchedule {
    id: String,
    arrivals: Vec<Seconds>,
    departures: Vec<Seconds>,
}

impl TripSchedule {
    /// A trip with separate arrival and departure times per stop.
    pub fn new(id: impl Into<String>, arrivals: Vec<Seconds>, departures: Vec<Seconds>) -> Self {
        Self {
            id: id.into(),
            arrivals,
            departures,
        }
    }

    /// A trip that arrives and departs at the same time at each stop.
    pub fn with_times(id: impl Into<String>, times: Vec<Seconds>) -> Self {
        Self::new(id, times.clone(), times)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn arrival(&self, position: usize) -> Seconds {
        self.arrivals[position]
    }

    pub fn departure(&self, position: usize) -> Seconds {
        self.departures[position]
    }

    fn len(&self) -> usize {
        self.arrivals.len()
    }
}

/// A stop pattern with the trips running on it, ordered by departure.
#[derive(Debug, Clone)]
pub struct Route {
    name: String,
    mode: TransitMode,
    stops: Vec<StopIndex>,
    trips: Vec<TripSchedule>,
}

impl Route {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> TransitMode {
        self.mode
    }

    pub fn stops(&self) -> &[StopIndex] {
        &self.stops
    }

    pub fn stop_at(&self, position: usize) -> StopIndex {
        self.stops[position]
    }

    pub fn trips(&self) -> &[TripSchedule] {
        &self.trips
    }

    pub fn trip(&self, index: usize) -> &TripSchedule {
        &self.trips[index]
    }

    /// First trip departing `position` at or after `earliest`.
    pub fn first_departure_at_or_after(&self, position: usize, earliest: Seconds) -> Option<usize> {
        let index = self
            .trips
            .partition_point(|trip| trip.departure(position) < earliest);
        (index < self.trips.len()).then_some(index)
    }

    /// Last trip arriving at `position` at or before `latest`.
    pub fn last_arrival_at_or_before(&self, position: usize, latest: Seconds) -> Option<usize> {
        let index = self
            .trips
            .partition_point(|trip| trip.arrival(position) <= latest);
        index.checked_sub(1)
    }

    fn validate(&mut self) -> Result<(), NetworkError> {
        if self.stops.len() < 2 {
            return Err(NetworkError::RouteTooShort {
                route: self.name.clone(),
            });
        }
        for trip in &self.trips {
            if trip.len() != self.stops.len() || trip.departures.len() != self.stops.len() {
                return Err(NetworkError::TripLengthMismatch {
                    route: self.name.clone(),
                    trip: trip.id.clone(),
                    expected: self.stops.len(),
                    actual: trip.len().min(trip.departures.len()),
                });
            }
            for position in 0..trip.len() {
                let dwell_ok = trip.arrivals[position] <= trip.departures[position];
                let ride_ok =
                    position == 0 || trip.departures[position - 1] <= trip.arrivals[position];
                if !dwell_ok || !ride_ok {
                    return Err(NetworkError::TimesNotIncreasing {
                        route: self.name.clone(),
                        trip: trip.id.clone(),
                        position,
                    });
                }
            }
        }

        self.trips.sort_by_key(|trip| trip.departures[0]);
        for pair in self.trips.windows(2) {
            for position in 0..self.stops.len() {
                if pair[1].departures[position] < pair[0].departures[position]
                    || pair[1].arrivals[position] < pair[0].arrivals[position]
                {
                    return Err(NetworkError::OvertakingTrips {
                        route: self.name.clone(),
                        trip: pair[1].id.clone(),
                        position,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Read-only transit network shared by all searches.
#[derive(Debug, Clone)]
pub struct TransitData {
    stop_names: Vec<String>,
    routes: Vec<Route>,
    routes_by_stop: Vec<Vec<(RouteIndex, usize)>>,
    transfers: Transfers,
}

impl TransitData {
    pub fn num_stops(&self) -> usize {
        self.stop_names.len()
    }

    pub fn stop_name(&self, stop: StopIndex) -> &str {
        self.stop_names.get(stop).map(String::as_str).unwrap_or("?")
    }

    pub fn stop_by_name(&self, name: &str) -> Option<StopIndex> {
        self.stop_names.iter().position(|n| n == name)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn route(&self, index: RouteIndex) -> &Route {
        &self.routes[index]
    }

    /// Routes visiting `stop`, with the position of the stop in each.
    pub fn routes_serving(&self, stop: StopIndex) -> &[(RouteIndex, usize)] {
        self.routes_by_stop.get(stop).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn transfers_from(&self, stop: StopIndex) -> &[Transfer] {
        self.transfers.from_stop(stop)
    }

    pub fn transfers_to(&self, stop: StopIndex) -> &[Transfer] {
        self.transfers.to_stop(stop)
    }
}

/// Builder for [`TransitData`].
///
/// Stops are created on first mention by name.
///
/// # Examples
///
/// ```
/// use transit_router::transit::{TransitDataBuilder, TransitMode};
///
/// let data = TransitDataBuilder::new()
///     .route("R1", TransitMode::Bus, &["A", "B", "C"], &["0:10, 0:12, 0:14"])
///     .transfer("C", "D", 120, 240)
///     .build()
///     .unwrap();
///
/// assert_eq!(data.num_stops(), 4);
/// assert_eq!(data.routes().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct TransitDataBuilder {
    stop_names: Vec<String>,
    stop_lookup: HashMap<String, StopIndex>,
    routes: Vec<Route>,
    transfers: Transfers,
    error: Option<NetworkError>,
}

impl TransitDataBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare stops up front so their indices are predictable.
    pub fn stops(mut self, names: &[&str]) -> Self {
        for name in names {
            self.stop_index(name);
        }
        self
    }

    /// Add a route whose trips are given as comma separated schedules, one
    /// time per stop (arrival equals departure).
    pub fn route(mut self, name: &str, mode: TransitMode, stops: &[&str], schedules: &[&str]) -> Self {
        let mut trips = Vec::with_capacity(schedules.len());
        for (i, schedule) in schedules.iter().enumerate() {
            match parse_time_sequence(schedule) {
                Ok(times) => trips.push(TripSchedule::with_times(format!("{name}-{i}"), times)),
                Err(e) => {
                    self.error.get_or_insert(e.into());
                    return self;
                }
            }
        }
        self.route_with_trips(name, mode, stops, trips)
    }

    /// Add a route with pre-built trips.
    pub fn route_with_trips(
        mut self,
        name: &str,
        mode: TransitMode,
        stops: &[&str],
        trips: Vec<TripSchedule>,
    ) -> Self {
        let stops = stops.iter().map(|s| self.stop_index(s)).collect();
        self.routes.push(Route {
            name: name.to_string(),
            mode,
            stops,
            trips,
        });
        self
    }

    /// Add a one-way walking transfer.
    pub fn transfer(mut self, from: &str, to: &str, duration: Seconds, cost: i32) -> Self {
        let from = self.stop_index(from);
        let to = self.stop_index(to);
        self.transfers.add(from, to, duration, cost);
        self
    }

    pub fn build(self) -> Result<TransitData, NetworkError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let num_stops = self.stop_names.len();
        let mut routes = self.routes;
        let mut routes_by_stop = vec![Vec::new(); num_stops];
        for (route_index, route) in routes.iter_mut().enumerate() {
            route.validate()?;
            for (position, &stop) in route.stops.iter().enumerate() {
                routes_by_stop[stop].push((route_index, position));
            }
        }
        if let Some(stop) = self.transfers.max_stop().filter(|&s| s >= num_stops) {
            return Err(NetworkError::UnknownStop(stop));
        }

        Ok(TransitData {
            stop_names: self.stop_names,
            routes,
            routes_by_stop,
            transfers: self.transfers,
        })
    }

    fn stop_index(&mut self, name: &str) -> StopIndex {
        if let Some(&index) = self.stop_lookup.get(name) {
            return index;
        }
        let index = self.stop_names.len();
        self.stop_names.push(name.to_string());
        self.stop_lookup.insert(name.to_string(), index);
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_trip_network() -> TransitData {
        TransitDataBuilder::new()
            .route(
                "R1",
                TransitMode::Bus,
                &["A", "B", "C"],
                &["0:20, 0:25, 0:30", "0:10, 0:15, 0:20"],
            )
            .build()
            .unwrap()
    }

    #[test]
    fn trips_are_sorted_by_departure() {
        let data = two_trip_network();
        let route = data.route(0);

        assert_eq!(route.trip(0).departure(0), 600);
        assert_eq!(route.trip(1).departure(0), 1200);
    }

    #[test]
    fn trip_search_forward() {
        let data = two_trip_network();
        let route = data.route(0);

        assert_eq!(route.first_departure_at_or_after(1, 0), Some(0));
        assert_eq!(route.first_departure_at_or_after(1, 900), Some(0));
        assert_eq!(route.first_departure_at_or_after(1, 901), Some(1));
        assert_eq!(route.first_departure_at_or_after(1, 1501), None);
    }

    #[test]
    fn trip_search_reverse() {
        let data = two_trip_network();
        let route = data.route(0);

        assert_eq!(route.last_arrival_at_or_before(2, 5000), Some(1));
        assert_eq!(route.last_arrival_at_or_before(2, 1799), Some(0));
        assert_eq!(route.last_arrival_at_or_before(2, 1199), None);
    }

    #[test]
    fn routes_serving_stop() {
        let data = two_trip_network();
        let b = data.stop_by_name("B").unwrap();

        assert_eq!(data.routes_serving(b), &[(0, 1)]);
        assert_eq!(data.stop_name(b), "B");
        assert_eq!(data.stop_name(99), "?");
    }

    #[test]
    fn rejects_mismatched_trip_length() {
        let result = TransitDataBuilder::new()
            .route("R1", TransitMode::Bus, &["A", "B", "C"], &["0:10, 0:12"])
            .build();

        assert!(matches!(result, Err(NetworkError::TripLengthMismatch { .. })));
    }

    #[test]
    fn rejects_backwards_times() {
        let result = TransitDataBuilder::new()
            .route("R1", TransitMode::Bus, &["A", "B"], &["0:10, 0:05"])
            .build();

        assert!(matches!(result, Err(NetworkError::TimesNotIncreasing { .. })));
    }

    #[test]
    fn rejects_overtaking_trips() {
        let result = TransitDataBuilder::new()
            .route(
                "R1",
                TransitMode::Bus,
                &["A", "B"],
                &["0:10, 0:40", "0:15, 0:20"],
            )
            .build();

        assert!(matches!(result, Err(NetworkError::OvertakingTrips { .. })));
    }

    #[test]
    fn rejects_bad_schedule_text() {
        let result = TransitDataBuilder::new()
            .route("R1", TransitMode::Bus, &["A", "B"], &["0:10, soon"])
            .build();

        assert!(matches!(result, Err(NetworkError::Time(_))));
    }

    #[test]
    fn error_display() {
        let err = NetworkError::RouteTooShort { route: "R9".into() };
        assert_eq!(err.to_string(), "route R9: needs at least two stops");
    }
}
