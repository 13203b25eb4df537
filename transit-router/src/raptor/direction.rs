//! Search direction adapter.
//!
//! The round loop is written once against [`TimeCalculator`]. A forward
//! search moves from the origin towards the destination and prefers early
//! times; a reverse search starts at the destination, walks routes and
//! transfers backwards and prefers late times. Everything that differs
//! between the two lives in this module.

use serde::{Deserialize, Serialize};

use crate::domain::Seconds;
use crate::transit::{Route, Slack, StopIndex, Transfer, TransitData, TripSchedule};

/// Which way the engine searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SearchDirection {
    /// Depart at or after the earliest departure time.
    #[default]
    Forward,
    /// Arrive at or before the latest arrival time.
    Reverse,
}

/// Direction specific time arithmetic and network access.
pub trait TimeCalculator: Copy + Send + Sync + 'static {
    const DIRECTION: SearchDirection;

    /// Move `time` by `delta` in search direction.
    fn plus(time: Seconds, delta: Seconds) -> Seconds;

    /// Time elapsed in search direction from `from` to `to`.
    fn duration(from: Seconds, to: Seconds) -> Seconds;

    /// True when `a` is strictly better than `b`.
    fn is_better(a: Seconds, b: Seconds) -> bool;

    /// Departure (forward) or arrival (reverse) times the range search
    /// iterates over, in processing order.
    fn iterations(earliest_departure: Seconds, latest_arrival: Seconds, window: Seconds, step: Seconds) -> Vec<Seconds>;

    /// Route positions in travel order.
    fn positions(route: &Route) -> impl Iterator<Item = usize>;

    /// The trip to board at `position` no sooner (in search direction)
    /// than `time`.
    fn find_trip(route: &Route, position: usize, time: Seconds) -> Option<usize>;

    /// Time the traveller gets on the trip, in search direction.
    fn board_time(trip: &TripSchedule, position: usize) -> Seconds;

    /// Time the traveller gets off the trip, in search direction.
    fn alight_time(trip: &TripSchedule, position: usize) -> Seconds;

    /// Slack between reaching a stop and boarding, in search direction.
    fn boarding_slack(slack: &Slack, arrived_by_vehicle: bool) -> Seconds;

    /// Slack between leaving a vehicle and the stop label time.
    fn alighting_slack(slack: &Slack) -> Seconds;

    /// Transfers to relax out of `stop`, in search direction.
    fn transfers(data: &TransitData, stop: StopIndex) -> &[Transfer];

    /// Order two values produced in search order as (origin side,
    /// destination side).
    fn real_order<T>(search_first: T, search_second: T) -> (T, T);

    /// True when a destination time respects the opposite end's limit.
    fn within_limit(time: Seconds, earliest_departure: Option<Seconds>, latest_arrival: Option<Seconds>) -> bool;
}

fn iteration_count(window: Seconds, step: Seconds) -> i32 {
    if window <= 0 || step <= 0 {
        1
    } else {
        (window + step - 1) / step
    }
}

/// Forward search: origin to destination, earlier is better.
#[derive(Debug, Clone, Copy, Default)]
pub struct Forward;

impl TimeCalculator for Forward {
    const DIRECTION: SearchDirection = SearchDirection::Forward;

    fn plus(time: Seconds, delta: Seconds) -> Seconds {
        time + delta
    }

    fn duration(from: Seconds, to: Seconds) -> Seconds {
        to - from
    }

    fn is_better(a: Seconds, b: Seconds) -> bool {
        a < b
    }

    fn iterations(earliest_departure: Seconds, _latest_arrival: Seconds, window: Seconds, step: Seconds) -> Vec<Seconds> {
        let n = iteration_count(window, step);
        (0..n).rev().map(|i| earliest_departure + i * step).collect()
    }

    fn positions(route: &Route) -> impl Iterator<Item = usize> {
        0..route.stops().len()
    }

    fn find_trip(route: &Route, position: usize, time: Seconds) -> Option<usize> {
        route.first_departure_at_or_after(position, time)
    }

    fn board_time(trip: &TripSchedule, position: usize) -> Seconds {
        trip.departure(position)
    }

    fn alight_time(trip: &TripSchedule, position: usize) -> Seconds {
        trip.arrival(position)
    }

    fn boarding_slack(slack: &Slack, arrived_by_vehicle: bool) -> Seconds {
        slack.before_boarding(arrived_by_vehicle)
    }

    fn alighting_slack(slack: &Slack) -> Seconds {
        slack.alight
    }

    fn transfers(data: &TransitData, stop: StopIndex) -> &[Transfer] {
        data.transfers_from(stop)
    }

    fn real_order<T>(search_first: T, search_second: T) -> (T, T) {
        (search_first, search_second)
    }

    fn within_limit(time: Seconds, _earliest_departure: Option<Seconds>, latest_arrival: Option<Seconds>) -> bool {
        latest_arrival.is_none_or(|lat| time <= lat)
    }
}

/// Reverse search: destination to origin, later is better.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reverse;

impl TimeCalculator for Reverse {
    const DIRECTION: SearchDirection = SearchDirection::Reverse;

    fn plus(time: Seconds, delta: Seconds) -> Seconds {
        time - delta
    }

    fn duration(from: Seconds, to: Seconds) -> Seconds {
        from - to
    }

    fn is_better(a: Seconds, b: Seconds) -> bool {
        a > b
    }

    fn iterations(_earliest_departure: Seconds, latest_arrival: Seconds, window: Seconds, step: Seconds) -> Vec<Seconds> {
        let n = iteration_count(window, step);
        (0..n).rev().map(|i| latest_arrival - i * step).collect()
    }

    fn positions(route: &Route) -> impl Iterator<Item = usize> {
        (0..route.stops().len()).rev()
    }

    fn find_trip(route: &Route, position: usize, time: Seconds) -> Option<usize> {
        route.last_arrival_at_or_before(position, time)
    }

    fn board_time(trip: &TripSchedule, position: usize) -> Seconds {
        trip.arrival(position)
    }

    fn alight_time(trip: &TripSchedule, position: usize) -> Seconds {
        trip.departure(position)
    }

    fn boarding_slack(slack: &Slack, arrived_by_vehicle: bool) -> Seconds {
        if arrived_by_vehicle {
            slack.alight + slack.transfer
        } else {
            slack.alight
        }
    }

    fn alighting_slack(slack: &Slack) -> Seconds {
        slack.board
    }

    fn transfers(data: &TransitData, stop: StopIndex) -> &[Transfer] {
        data.transfers_to(stop)
    }

    fn real_order<T>(search_first: T, search_second: T) -> (T, T) {
        (search_second, search_first)
    }

    fn within_limit(time: Seconds, earliest_departure: Option<Seconds>, _latest_arrival: Option<Seconds>) -> bool {
        earliest_departure.is_none_or(|edt| time >= edt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transit::{TransitDataBuilder, TransitMode};

    #[test]
    fn forward_iterations_latest_first() {
        assert_eq!(Forward::iterations(0, 0, 180, 60), vec![120, 60, 0]);
        assert_eq!(Forward::iterations(600, 0, 0, 60), vec![600]);
        assert_eq!(Forward::iterations(0, 0, 90, 60), vec![60, 0]);
    }

    #[test]
    fn reverse_iterations_earliest_first() {
        assert_eq!(Reverse::iterations(0, 1800, 180, 60), vec![1680, 1740, 1800]);
        assert_eq!(Reverse::iterations(0, 1800, 0, 60), vec![1800]);
    }

    #[test]
    fn time_arithmetic_is_mirrored() {
        assert_eq!(Forward::plus(100, 30), 130);
        assert_eq!(Reverse::plus(100, 30), 70);
        assert_eq!(Forward::duration(100, 130), 30);
        assert_eq!(Reverse::duration(100, 70), 30);
        assert!(Forward::is_better(10, 20));
        assert!(Reverse::is_better(20, 10));
        assert!(!Forward::is_better(10, 10));
    }

    #[test]
    fn route_traversal_and_trip_search() {
        let data = TransitDataBuilder::new()
            .route("R1", TransitMode::Bus, &["A", "B", "C"], &["0:10, 0:12, 0:14"])
            .build()
            .unwrap();
        let route = data.route(0);

        assert_eq!(Forward::positions(route).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(Reverse::positions(route).collect::<Vec<_>>(), vec![2, 1, 0]);
        assert_eq!(Forward::find_trip(route, 1, 700), Some(0));
        assert_eq!(Forward::find_trip(route, 1, 721), None);
        assert_eq!(Reverse::find_trip(route, 1, 720), Some(0));
        assert_eq!(Reverse::find_trip(route, 1, 719), None);
    }

    #[test]
    fn slack_is_applied_on_the_vehicle_side() {
        let slack = Slack::new(10, 20, 60);
        assert_eq!(Forward::boarding_slack(&slack, true), 70);
        assert_eq!(Forward::alighting_slack(&slack), 20);
        assert_eq!(Reverse::boarding_slack(&slack, true), 80);
        assert_eq!(Reverse::alighting_slack(&slack), 10);
    }

    #[test]
    fn limits() {
        assert!(Forward::within_limit(1800, None, Some(1800)));
        assert!(!Forward::within_limit(1801, None, Some(1800)));
        assert!(Forward::within_limit(99_999, Some(0), None));
        assert!(Reverse::within_limit(0, Some(0), None));
        assert!(!Reverse::within_limit(-1, Some(0), Some(1800)));
        assert_eq!(Reverse::real_order(1, 2), (2, 1));
    }
}
