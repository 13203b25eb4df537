//! End-to-end tests for the range-RAPTOR engine.

use std::time::{Duration, Instant};

use super::*;
use crate::domain::{AccessEgressLeg, InputField, RoutingErrorCode, SearchError};
use crate::transit::{Slack, TransitData, TransitDataBuilder, TransitMode};

const MIN: i32 = 60;

/// One bus B-C-D-E-F leaving B at 0:10. B is a 10 minute walk from the
/// origin, C, D and E are reached by on-demand rides, F is a one minute walk
/// from the destination.
fn flex_network() -> TransitData {
    TransitDataBuilder::new()
        .stops(&["A", "B", "C", "D", "E", "F"])
        .route(
            "R1",
            TransitMode::Bus,
            &["B", "C", "D", "E", "F"],
            &["0:10, 0:12, 0:14, 0:16, 0:18"],
        )
        .build()
        .unwrap()
}

fn flex_request(profile: RaptorProfile, direction: SearchDirection) -> RaptorRequest {
    RaptorRequest::builder()
        .profile(profile)
        .direction(direction)
        .earliest_departure_time(0)
        .latest_arrival_time(30 * MIN)
        .search_window(30 * MIN)
        .slack(Slack::new(0, 0, MIN))
        .access(AccessEgressLeg::walk(1, 10 * MIN, 4.0))
        .access(AccessEgressLeg::new(2, 2 * MIN, 2, 480))
        .access(AccessEgressLeg::new(3, 3 * MIN, 2, 720))
        .access(AccessEgressLeg::new(4, 7 * MIN, 1, 1680))
        .egress(AccessEgressLeg::walk(5, MIN, 4.0))
        .build()
}

fn route(request: &RaptorRequest) -> RaptorResponse {
    RaptorService::default()
        .route(&flex_network(), request)
        .unwrap()
}

fn summaries(response: &RaptorResponse) -> Vec<String> {
    response.paths.iter().map(ToString::to_string).collect()
}

const BEST_FLEX: &str = "Flex 3m 2x ~ D ~ BUS R1 0:14 0:18 ~ F ~ Walk 1m [0:10 0:19 9m $1860]";

const ALL_OPTIONS: [&str; 4] = [
    BEST_FLEX,
    "Flex 2m 2x ~ C ~ BUS R1 0:12 0:18 ~ F ~ Walk 1m [0:09 0:19 10m $1740]",
    "Flex 7m 1x ~ E ~ BUS R1 0:16 0:18 ~ F ~ Walk 1m [0:08 0:19 11m $2700]",
    "Walk 10m ~ B ~ BUS R1 0:10 0:18 ~ F ~ Walk 1m [0:00 0:19 19m $3720]",
];

#[test]
fn standard_forward_finds_latest_departure() {
    let response = route(&flex_request(RaptorProfile::Standard, SearchDirection::Forward));
    assert_eq!(summaries(&response), vec![BEST_FLEX]);
}

#[test]
fn standard_reverse_finds_same_path() {
    let response = route(&flex_request(RaptorProfile::Standard, SearchDirection::Reverse));
    assert_eq!(summaries(&response), vec![BEST_FLEX]);
}

#[test]
fn multi_criteria_forward_keeps_all_trade_offs() {
    let response = route(&flex_request(RaptorProfile::MultiCriteria, SearchDirection::Forward));
    assert_eq!(summaries(&response), ALL_OPTIONS);
}

#[test]
fn multi_criteria_reverse_matches_forward() {
    let response = route(&flex_request(RaptorProfile::MultiCriteria, SearchDirection::Reverse));
    assert_eq!(summaries(&response), ALL_OPTIONS);
}

#[test]
fn standard_result_is_among_multi_criteria_results() {
    let standard = route(&flex_request(RaptorProfile::Standard, SearchDirection::Forward));
    let mc = route(&flex_request(RaptorProfile::MultiCriteria, SearchDirection::Forward));

    for path in &standard.paths {
        assert!(
            mc.paths
                .iter()
                .any(|p| p.start == path.start && p.end == path.end && p.rides() == path.rides()),
            "{path} missing from multi-criteria results"
        );
    }
}

#[test]
fn flex_penalty_keeps_walking_access_alive() {
    let response = route(&flex_request(RaptorProfile::MultiCriteria, SearchDirection::Forward));

    // One on-demand ride counts as one transfer, so the single-flex path and
    // the plain walking path do not dominate each other.
    let walk = response.paths.iter().find(|p| p.start == 0).unwrap();
    let flex = response.paths.iter().find(|p| p.start == 8 * MIN).unwrap();
    assert_eq!(walk.transfers, 0);
    assert_eq!(flex.transfers, 1);
    assert!(walk.cost > flex.cost);
}

#[test]
fn search_params_report_window() {
    let response = route(&flex_request(RaptorProfile::Standard, SearchDirection::Forward));
    assert_eq!(
        response.search_params,
        SearchParams {
            earliest_departure_time: 0,
            latest_arrival_time: Some(30 * MIN),
            search_window: 30 * MIN,
            search_window_set: true,
        }
    );
    assert_eq!(response.search_params.latest_departure_time(), 30 * MIN);
}

#[test]
fn window_is_sized_from_travel_time() {
    let mut request = flex_request(RaptorProfile::MultiCriteria, SearchDirection::Forward);
    request.latest_arrival_time = None;
    request.search_window = None;

    let response = route(&request);

    // Fastest trip is 19 minutes: 40m + 0.5 * 19m rounds up to 50m.
    assert_eq!(response.search_params.search_window, 50 * MIN);
    assert!(!response.search_params.search_window_set);
    assert_eq!(response.search_params.latest_arrival_time, None);
    assert_eq!(summaries(&response), ALL_OPTIONS);
}

#[test]
fn arrive_by_without_departure_limit() {
    let mut request = flex_request(RaptorProfile::Standard, SearchDirection::Reverse);
    request.earliest_departure_time = None;
    request.search_window = None;

    let response = route(&request);

    // Searching back from 0:30 the best trip takes 20 minutes including
    // the wait at the destination.
    assert_eq!(response.search_params.search_window, 50 * MIN);
    assert_eq!(
        response.search_params.earliest_departure_time,
        30 * MIN - 20 * MIN - 50 * MIN
    );
    assert_eq!(summaries(&response), vec![BEST_FLEX]);
}

#[test]
fn unreachable_destination_is_empty_not_error() {
    let mut request = flex_request(RaptorProfile::MultiCriteria, SearchDirection::Forward);
    // Stop A is not served by any route.
    request.egress = vec![AccessEgressLeg::walk(0, MIN, 4.0)];

    let response = route(&request);
    assert!(response.paths.is_empty());

    request.search_window = None;
    request.latest_arrival_time = None;
    assert!(route(&request).paths.is_empty());
}

#[test]
fn bus_leaving_before_window_is_ignored() {
    let mut request = flex_request(RaptorProfile::MultiCriteria, SearchDirection::Forward);
    request.earliest_departure_time = Some(11 * MIN);
    request.search_window = Some(20 * MIN);

    // D needs 3m of flex plus a minute of slack to make the 0:14 departure.
    let response = route(&request);
    assert!(response.paths.is_empty());
}

#[test]
fn latest_arrival_limits_forward_results() {
    let mut request = flex_request(RaptorProfile::MultiCriteria, SearchDirection::Forward);
    request.latest_arrival_time = Some(18 * MIN);

    assert!(route(&request).paths.is_empty());
}

#[test]
fn missing_times_are_invalid() {
    let mut request = flex_request(RaptorProfile::Standard, SearchDirection::Forward);
    request.earliest_departure_time = None;
    request.latest_arrival_time = None;

    let err = RaptorService::default()
        .route(&flex_network(), &request)
        .unwrap_err();
    assert_eq!(
        err,
        SearchError::validation(RoutingErrorCode::InvalidSearchTime, Some(InputField::DateTime))
    );
}

#[test]
fn empty_access_and_egress_are_reported_together() {
    let mut request = flex_request(RaptorProfile::Standard, SearchDirection::Forward);
    request.access.clear();
    request.egress.clear();

    let err = RaptorService::default()
        .route(&flex_network(), &request)
        .unwrap_err();
    let SearchError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    let fields: Vec<_> = errors
        .iter()
        .map(|e| (e.code, e.affected_locations.clone()))
        .collect();
    assert_eq!(
        fields,
        vec![
            (RoutingErrorCode::NoStopsInRange, vec![InputField::From]),
            (RoutingErrorCode::NoStopsInRange, vec![InputField::To]),
        ]
    );
}

#[test]
fn departure_after_arrival_is_invalid() {
    let mut request = flex_request(RaptorProfile::Standard, SearchDirection::Forward);
    request.earliest_departure_time = Some(40 * MIN);

    let err = RaptorService::default()
        .route(&flex_network(), &request)
        .unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn unknown_stop_is_a_system_error() {
    let mut request = flex_request(RaptorProfile::Standard, SearchDirection::Forward);
    request.access.push(AccessEgressLeg::walk(42, MIN, 4.0));

    let err = RaptorService::default()
        .route(&flex_network(), &request)
        .unwrap_err();
    assert!(matches!(err, SearchError::System(_)));
}

#[test]
fn expired_deadline_times_out() {
    let mut request = flex_request(RaptorProfile::MultiCriteria, SearchDirection::Forward);
    request.deadline = Instant::now().checked_sub(Duration::from_millis(1));

    let err = RaptorService::default()
        .route(&flex_network(), &request)
        .unwrap_err();
    assert_eq!(err, SearchError::Timeout);
}

/// R1 A-B, a two minute walk B to C, then R2 C-D.
fn transfer_network() -> TransitData {
    TransitDataBuilder::new()
        .route("R1", TransitMode::Bus, &["A", "B"], &["0:05, 0:10"])
        .route("R2", TransitMode::Tram, &["C", "D"], &["0:15, 0:25"])
        .transfer("B", "C", 2 * MIN, 240)
        .build()
        .unwrap()
}

fn transfer_request(direction: SearchDirection) -> RaptorRequest {
    let data = transfer_network();
    let a = data.stop_by_name("A").unwrap();
    let d = data.stop_by_name("D").unwrap();
    RaptorRequest::builder()
        .direction(direction)
        .earliest_departure_time(0)
        .latest_arrival_time(30 * MIN)
        .search_window(10 * MIN)
        .slack(Slack::new(0, 0, MIN))
        .access(AccessEgressLeg::walk(a, MIN, 4.0))
        .egress(AccessEgressLeg::walk(d, MIN, 4.0))
        .build()
}

#[test]
fn walking_transfer_between_routes() {
    let data = transfer_network();
    let expected = "Walk 1m ~ A ~ BUS R1 0:05 0:10 ~ B ~ Walk 2m ~ C ~ TRAM R2 0:15 0:25 ~ D ~ Walk 1m [0:04 0:26 22m $3000]";

    for direction in [SearchDirection::Forward, SearchDirection::Reverse] {
        let response = RaptorService::default()
            .route(&data, &transfer_request(direction))
            .unwrap();

        assert_eq!(response.paths.len(), 1, "{direction:?}");
        let path = &response.paths[0];
        assert_eq!(path.to_string(), expected, "{direction:?}");
        assert_eq!(path.transfers, 1);
        assert_eq!(path.rides(), 2);
    }
}

#[test]
fn max_transfers_limits_rounds() {
    let data = transfer_network();
    let mut request = transfer_request(SearchDirection::Forward);
    request.max_transfers = Some(0);

    let response = RaptorService::default().route(&data, &request).unwrap();
    assert!(response.paths.is_empty());
}

#[test]
fn tuning_is_exposed() {
    let tuning = RaptorTuning {
        max_transfers: 2,
        ..RaptorTuning::default()
    };
    let service = RaptorService::new(tuning);
    assert_eq!(service.tuning().max_transfers, 2);
}

#[test]
fn transfer_cost_is_added_to_walking_transfers() {
    let data = transfer_network();
    let cost = CostModel {
        transfer_cost: 300,
        ..CostModel::default()
    };

    for direction in [SearchDirection::Forward, SearchDirection::Reverse] {
        let mut request = transfer_request(direction);
        request.cost = cost;
        let response = RaptorService::default().route(&data, &request).unwrap();

        assert_eq!(response.paths.len(), 1, "{direction:?}");
        assert_eq!(response.paths[0].cost, 3300, "{direction:?}");
    }
}

/// R1 C-F leaving C at 0:10. X is a two minute walk before C and Y a two
/// minute walk after F.
fn flex_transfer_network() -> TransitData {
    TransitDataBuilder::new()
        .stops(&["X", "C", "F", "Y"])
        .route("R1", TransitMode::Bus, &["C", "F"], &["0:10, 0:20"])
        .transfer("X", "C", 2 * MIN, 480)
        .transfer("F", "Y", 2 * MIN, 480)
        .build()
        .unwrap()
}

fn flex_transfer_paths(
    access: AccessEgressLeg,
    egress: AccessEgressLeg,
    direction: SearchDirection,
) -> Vec<String> {
    let request = RaptorRequest::builder()
        .profile(RaptorProfile::MultiCriteria)
        .direction(direction)
        .earliest_departure_time(0)
        .latest_arrival_time(30 * MIN)
        .search_window(30 * MIN)
        .slack(Slack::new(0, 0, MIN))
        .access(access)
        .egress(egress)
        .build();
    let response = RaptorService::default()
        .route(&flex_transfer_network(), &request)
        .unwrap();
    summaries(&response)
}

#[test]
fn walking_transfer_after_flex_access() {
    let data = flex_transfer_network();
    let x = data.stop_by_name("X").unwrap();
    let f = data.stop_by_name("F").unwrap();
    let expected = "Flex 3m 1x ~ X ~ Walk 2m ~ C ~ BUS R1 0:10 0:20 ~ F ~ Walk 1m [0:04 0:21 17m $2700]";

    for direction in [SearchDirection::Forward, SearchDirection::Reverse] {
        let paths = flex_transfer_paths(
            AccessEgressLeg::new(x, 3 * MIN, 1, 720),
            AccessEgressLeg::walk(f, MIN, 4.0),
            direction,
        );
        assert_eq!(paths, vec![expected], "{direction:?}");
    }
}

#[test]
fn walking_transfer_before_flex_egress() {
    let data = flex_transfer_network();
    let c = data.stop_by_name("C").unwrap();
    let y = data.stop_by_name("Y").unwrap();
    let expected = "Walk 1m ~ C ~ BUS R1 0:10 0:20 ~ F ~ Walk 2m ~ Y ~ Flex 3m 1x [0:09 0:26 17m $2700]";

    for direction in [SearchDirection::Forward, SearchDirection::Reverse] {
        let paths = flex_transfer_paths(
            AccessEgressLeg::walk(c, MIN, 4.0),
            AccessEgressLeg::new(y, 3 * MIN, 1, 720),
            direction,
        );
        assert_eq!(paths, vec![expected], "{direction:?}");
    }
}

#[test]
fn flex_and_walk_without_a_ride_is_not_a_path() {
    let data = flex_transfer_network();
    let x = data.stop_by_name("X").unwrap();
    let c = data.stop_by_name("C").unwrap();

    for direction in [SearchDirection::Forward, SearchDirection::Reverse] {
        let paths = flex_transfer_paths(
            AccessEgressLeg::new(x, 3 * MIN, 1, 720),
            AccessEgressLeg::new(c, 3 * MIN, 1, 720),
            direction,
        );
        assert!(paths.is_empty(), "{direction:?}: {paths:?}");
    }
}

#[test]
fn slower_flex_access_never_dominates_walking() {
    let walk = "Walk 5m ~ B ~ BUS R1 0:10 0:18 ~ F ~ Walk 1m [0:05 0:19 14m $2520]";
    let comparator = DestinationComparator::new(RaptorProfile::MultiCriteria);

    // Same stop as the walk, two minutes slower, as expensive or worse.
    for flex_cost in [1200, 1500] {
        for direction in [SearchDirection::Forward, SearchDirection::Reverse] {
            let request = RaptorRequest::builder()
                .profile(RaptorProfile::MultiCriteria)
                .direction(direction)
                .earliest_departure_time(0)
                .latest_arrival_time(30 * MIN)
                .search_window(30 * MIN)
                .slack(Slack::new(0, 0, MIN))
                .access(AccessEgressLeg::walk(1, 5 * MIN, 4.0))
                .access(AccessEgressLeg::new(1, 7 * MIN, 1, flex_cost))
                .egress(AccessEgressLeg::walk(5, MIN, 4.0))
                .build();
            let response = route(&request);

            let walking = response
                .paths
                .iter()
                .find(|p| p.to_string() == walk)
                .unwrap_or_else(|| panic!("{direction:?}: {:?}", summaries(&response)));
            assert!(
                response.paths.iter().all(|p| !comparator.dominates(p, walking)),
                "{direction:?}"
            );
        }
    }
}
