//! The range-RAPTOR round loop.
//!
//! One worker runs one search in one direction. For each iteration time
//! (latest departure first in a forward search) it seeds the access legs,
//! then runs rounds: scan every route touching a stop marked in the previous
//! round, relax walking transfers out of stops reached by transit or by an
//! on-demand seed leg, and offer arrivals at egress stops to the destination
//! set. Stop frontiers are kept between iterations, so an earlier iteration
//! only adds arrivals that beat what a later departure already achieved.

use std::collections::{BTreeSet, HashMap};
use std::marker::PhantomData;
use std::time::Instant;

use tracing::trace;

use super::cost::CostModel;
use super::criteria::{Label, Labelled};
use super::direction::{SearchDirection, TimeCalculator};
use super::pareto::{LabelComparator, ParetoSet};
use super::path::{DestinationComparator, Path, PathLeg, sort_paths};
use super::request::RaptorRequest;
use super::state::{Arrival, ArrivalId, ArrivalKind, SearchState};
use crate::domain::{AccessEgressLeg, Seconds, SearchError};
use crate::transit::{Route, RouteIndex, Slack, StopIndex, TransitData};

/// Counters reported after a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub iterations: usize,
    pub rounds: usize,
    pub arrivals: usize,
    /// Highest round that added a path to the destination set.
    pub deepest_round: usize,
}

/// A trip being ridden along a route during a scan.
#[derive(Debug, Clone, Copy)]
struct Ride {
    /// Criteria at the scan's current position.
    label: Label,
    from: ArrivalId,
    trip: usize,
    board_position: usize,
    board_time: Seconds,
    board_cost: i32,
}

impl Labelled for Ride {
    fn label(&self) -> &Label {
        &self.label
    }
}

pub(crate) struct RangeRaptorWorker<'a, T: TimeCalculator> {
    data: &'a TransitData,
    slack: Slack,
    cost: CostModel,
    deadline: Option<Instant>,
    earliest_departure_limit: Option<Seconds>,
    latest_arrival_limit: Option<Seconds>,
    max_rounds: usize,
    /// Legs the search starts from: access forward, egress in reverse.
    seeds: &'a [AccessEgressLeg],
    /// Legs the search ends with, as indices per stop.
    targets: &'a [AccessEgressLeg],
    targets_by_stop: HashMap<StopIndex, Vec<usize>>,
    comparator: LabelComparator,
    state: SearchState,
    destination: ParetoSet<Path>,
    destination_comparator: DestinationComparator,
    stats: SearchStats,
    _direction: PhantomData<T>,
}

impl<'a, T: TimeCalculator> RangeRaptorWorker<'a, T> {
    pub fn new(data: &'a TransitData, request: &'a RaptorRequest, max_transfers: usize) -> Self {
        let (seeds, targets) = match T::DIRECTION {
            SearchDirection::Forward => (&request.access, &request.egress),
            SearchDirection::Reverse => (&request.egress, &request.access),
        };
        let mut targets_by_stop: HashMap<StopIndex, Vec<usize>> = HashMap::new();
        for (i, leg) in targets.iter().enumerate() {
            targets_by_stop.entry(leg.stop).or_default().push(i);
        }
        let comparator = LabelComparator::new(request.profile.dominance_model(), T::DIRECTION);

        Self {
            data,
            slack: request.slack,
            cost: request.cost,
            deadline: request.deadline,
            earliest_departure_limit: request.earliest_departure_time,
            latest_arrival_limit: request.latest_arrival_time,
            max_rounds: max_transfers + 1,
            seeds,
            targets,
            targets_by_stop,
            comparator,
            state: SearchState::new(data.num_stops(), comparator),
            destination: ParetoSet::new(),
            destination_comparator: DestinationComparator::new(request.profile),
            stats: SearchStats::default(),
            _direction: PhantomData,
        }
    }

    /// Run every iteration and return the paths in output order.
    pub fn run(mut self, iterations: &[Seconds]) -> Result<(Vec<Path>, SearchStats), SearchError> {
        for &iteration in iterations {
            self.stats.iterations += 1;
            self.run_iteration(iteration)?;
        }
        self.stats.arrivals = self.state.num_arrivals();

        let mut paths = self.destination.into_vec();
        sort_paths(&mut paths);
        Ok((paths, self.stats))
    }

    fn run_iteration(&mut self, iteration: Seconds) -> Result<(), SearchError> {
        let seeded = self.seed(iteration);
        // On-demand legs end like a ride, so the traveller may walk on
        // before boarding.
        let by_vehicle: Vec<ArrivalId> = seeded
            .iter()
            .copied()
            .filter(|&id| self.state.is_current(id) && self.state.arrival(id).arrived_by_vehicle)
            .collect();
        let walked = self.relax_transfers(&by_vehicle, 0);
        let mut marked: Vec<ArrivalId> = seeded
            .into_iter()
            .chain(walked)
            .filter(|&id| self.state.is_current(id))
            .collect();

        for round in 1..=self.max_rounds {
            if marked.is_empty() {
                break;
            }
            self.check_deadline()?;
            self.stats.rounds += 1;

            let reached_by_transit: Vec<ArrivalId> = self
                .scan_routes(&marked, round)
                .into_iter()
                .filter(|&id| self.state.is_current(id))
                .collect();
            let reached_by_transfer = self.relax_transfers(&reached_by_transit, round);

            marked = reached_by_transit
                .into_iter()
                .chain(reached_by_transfer)
                .filter(|&id| self.state.is_current(id))
                .collect();
            for &id in &marked {
                self.reach_targets(id, iteration);
            }
            trace!(iteration, round, marked = marked.len(), "round complete");
        }
        Ok(())
    }

    fn check_deadline(&self) -> Result<(), SearchError> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(SearchError::Timeout),
            _ => Ok(()),
        }
    }

    fn seed(&mut self, iteration: Seconds) -> Vec<ArrivalId> {
        let seeds = self.seeds;
        seeds
            .iter()
            .enumerate()
            .filter_map(|(i, leg)| {
                self.state.add(Arrival {
                    stop: leg.stop,
                    label: Label::new(
                        T::plus(iteration, leg.duration),
                        leg.transfer_penalty,
                        leg.generalized_cost,
                    ),
                    round: 0,
                    kind: ArrivalKind::Access { leg: i },
                    arrived_by_vehicle: leg.has_rides(),
                })
            })
            .collect()
    }

    fn scan_routes(&mut self, marked: &[ArrivalId], round: usize) -> Vec<ArrivalId> {
        let data = self.data;
        let mut marked_by_stop: HashMap<StopIndex, Vec<ArrivalId>> = HashMap::new();
        let mut routes = BTreeSet::new();
        for &id in marked {
            let stop = self.state.arrival(id).stop;
            marked_by_stop.entry(stop).or_default().push(id);
            routes.extend(data.routes_serving(stop).iter().map(|&(route, _)| route));
        }

        let mut reached = Vec::new();
        for route_index in routes {
            self.scan_route(route_index, data.route(route_index), &marked_by_stop, round, &mut reached);
        }
        reached
    }

    fn scan_route(
        &mut self,
        route_index: RouteIndex,
        route: &Route,
        marked_by_stop: &HashMap<StopIndex, Vec<ArrivalId>>,
        round: usize,
        reached: &mut Vec<ArrivalId>,
    ) {
        let mut rides: ParetoSet<Ride> = ParetoSet::new();
        let alight_slack = T::alighting_slack(&self.slack);

        for position in T::positions(route) {
            let stop = route.stop_at(position);

            for ride in rides.iter_mut() {
                ride.label = self.ride_label(route, ride, position);
            }
            for ride in rides.iter() {
                let label = Label::new(
                    T::plus(ride.label.time, alight_slack),
                    ride.label.transfers,
                    ride.label.cost + self.cost.waiting(alight_slack),
                );
                let arrival = Arrival {
                    stop,
                    label,
                    round,
                    kind: ArrivalKind::Transit {
                        previous: ride.from,
                        route: route_index,
                        trip: ride.trip,
                        board_position: ride.board_position,
                        alight_position: position,
                    },
                    arrived_by_vehicle: true,
                };
                if let Some(id) = self.state.add(arrival) {
                    reached.push(id);
                }
            }

            if let Some(ids) = marked_by_stop.get(&stop) {
                for &id in ids {
                    if let Some(ride) = self.board(route, position, id) {
                        rides.insert(&self.comparator, ride);
                    }
                }
            }
        }
    }

    /// Criteria of a ride as seen at `position`.
    fn ride_label(&self, route: &Route, ride: &Ride, position: usize) -> Label {
        let time = T::alight_time(route.trip(ride.trip), position);
        let riding = T::duration(ride.board_time, time);
        Label::new(time, ride.label.transfers, ride.board_cost + self.cost.riding(riding))
    }

    fn board(&self, route: &Route, position: usize, from: ArrivalId) -> Option<Ride> {
        let arrival = self.state.arrival(from);
        let ready = T::plus(
            arrival.label.time,
            T::boarding_slack(&self.slack, arrival.arrived_by_vehicle),
        );
        let trip_index = T::find_trip(route, position, ready)?;
        let trip = route.trip(trip_index);
        let board_time = T::board_time(trip, position);

        // Staying at the stop after a ride is a transfer; a walking transfer
        // was already counted when it was relaxed.
        let is_transfer = arrival.is_transit();
        let transfers = arrival.label.transfers + u32::from(is_transfer);
        let wait = T::duration(arrival.label.time, board_time);
        let board_cost = arrival.label.cost + self.cost.boarding(wait, is_transfer);

        let mut ride = Ride {
            label: Label::new(board_time, transfers, board_cost),
            from,
            trip: trip_index,
            board_position: position,
            board_time,
            board_cost,
        };
        ride.label = self.ride_label(route, &ride, position);
        Some(ride)
    }

    fn relax_transfers(&mut self, from: &[ArrivalId], round: usize) -> Vec<ArrivalId> {
        let data = self.data;
        let mut reached = Vec::new();
        for &id in from {
            let (stop, label) = {
                let arrival = self.state.arrival(id);
                (arrival.stop, arrival.label)
            };
            for transfer in T::transfers(data, stop) {
                let (walk_from, walk_to) = T::real_order(stop, transfer.stop);
                let arrival = Arrival {
                    stop: transfer.stop,
                    label: Label::new(
                        T::plus(label.time, transfer.duration),
                        label.transfers + 1,
                        label.cost + self.cost.transfer(transfer.generalized_cost),
                    ),
                    round,
                    kind: ArrivalKind::Transfer {
                        previous: id,
                        from: walk_from,
                        to: walk_to,
                        duration: transfer.duration,
                    },
                    arrived_by_vehicle: true,
                };
                if let Some(new_id) = self.state.add(arrival) {
                    reached.push(new_id);
                }
            }
        }
        reached
    }

    fn reach_targets(&mut self, id: ArrivalId, iteration: Seconds) {
        let Some(target_indices) = self.targets_by_stop.get(&self.state.arrival(id).stop) else {
            return;
        };

        let round = self.state.arrival(id).round;
        let mut candidates = Vec::new();
        for &index in target_indices {
            let leg = &self.targets[index];
            let arrival = self.state.arrival(id);
            let connects = match arrival.kind {
                ArrivalKind::Transit { .. } => true,
                // Only an on-demand leg may follow a walking transfer, and
                // only after a ride.
                ArrivalKind::Transfer { previous, .. } => {
                    leg.has_rides() && self.state.arrival(previous).is_transit()
                }
                ArrivalKind::Access { .. } => false,
            };
            if !connects {
                continue;
            }

            let slack = if leg.has_rides() { self.slack.transfer } else { 0 };
            let time = T::plus(T::plus(arrival.label.time, slack), leg.duration);
            if !T::within_limit(time, self.earliest_departure_limit, self.latest_arrival_limit) {
                continue;
            }
            let label = Label::new(
                time,
                arrival.label.transfers + leg.transfer_penalty,
                arrival.label.cost + self.cost.waiting(slack) + leg.generalized_cost,
            );
            candidates.push(self.build_path(id, leg, label, iteration));
        }

        for path in candidates {
            if self.destination.insert(&self.destination_comparator, path) {
                self.stats.deepest_round = self.stats.deepest_round.max(round);
                trace!(iteration, round, "destination reached");
            }
        }
    }

    /// Rebuild the path ending with `last` and the target leg, in travel
    /// order with real times.
    fn build_path(&self, last: ArrivalId, target: &AccessEgressLeg, label: Label, iteration: Seconds) -> Path {
        let mut chain = Vec::new();
        let mut current = Some(last);
        while let Some(id) = current {
            chain.push(id);
            current = self.state.arrival(id).previous();
        }

        // The last element of the chain is the seed.
        let seed = match chain.pop().map(|id| &self.state.arrival(id).kind) {
            Some(ArrivalKind::Access { leg }) => &self.seeds[*leg],
            _ => target,
        };
        if T::DIRECTION == SearchDirection::Forward {
            chain.reverse();
        }
        let (access, egress) = T::real_order(seed, target);
        let (start, end) = T::real_order(iteration, label.time);

        let data = self.data;
        let mut legs = Vec::with_capacity(chain.len() + 2);
        legs.push(PathLeg::Access {
            leg: access.clone(),
            stop_name: data.stop_name(access.stop).to_string(),
            start,
            end: start + access.duration,
        });

        let mut previous_end = start + access.duration;
        for id in chain {
            match self.state.arrival(id).kind {
                ArrivalKind::Transit {
                    route,
                    trip,
                    board_position,
                    alight_position,
                    ..
                } => {
                    let from_position = board_position.min(alight_position);
                    let to_position = board_position.max(alight_position);
                    let r = data.route(route);
                    let schedule = r.trip(trip);
                    let (from, to) = (r.stop_at(from_position), r.stop_at(to_position));
                    let board = schedule.departure(from_position);
                    let alight = schedule.arrival(to_position);
                    legs.push(PathLeg::Transit {
                        route,
                        route_name: r.name().to_string(),
                        mode: r.mode(),
                        trip_id: schedule.id().to_string(),
                        from,
                        from_name: data.stop_name(from).to_string(),
                        to,
                        to_name: data.stop_name(to).to_string(),
                        board,
                        alight,
                    });
                    previous_end = alight + self.slack.alight;
                }
                ArrivalKind::Transfer {
                    from, to, duration, ..
                } => {
                    legs.push(PathLeg::Transfer {
                        from_name: data.stop_name(from).to_string(),
                        to_name: data.stop_name(to).to_string(),
                        start: previous_end,
                        end: previous_end + duration,
                    });
                    previous_end += duration;
                }
                ArrivalKind::Access { .. } => {}
            }
        }

        legs.push(PathLeg::Egress {
            leg: egress.clone(),
            stop_name: data.stop_name(egress.stop).to_string(),
            start: end - egress.duration,
            end,
        });

        Path {
            start,
            end,
            transfers: label.transfers,
            cost: label.cost,
            legs,
        }
    }
}
