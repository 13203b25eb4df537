//! Itinerary filter chain.
//!
//! The worker hands every itinerary it collected to an
//! [`ItineraryFilterChain`]. Filters never drop an itinerary outright; they
//! mark it removed with a reason, so the worker can still count what was
//! found and see which itinerary the crop cut first.

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::domain::{
    CropSide, FilteredItinerary, Itinerary, RemovalReason, RoutingError, RoutingErrorCode,
};

/// What the chain needs to know about the request and the transit search.
#[derive(Debug, Clone)]
pub struct FilterContext {
    /// Drop itineraries that walk the whole way.
    pub remove_walk_all_the_way: bool,
    /// Transit itineraries departing after this are outside the search
    /// window. Only set for depart-after searches with a fixed window.
    pub latest_departure_time: Option<DateTime<FixedOffset>>,
    pub num_itineraries: usize,
    pub crop_side: CropSide,
}

/// Outcome of cropping to the requested number of itineraries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumItinerariesFilterResults {
    /// Best ranked itinerary that did not make the cut.
    pub first_removed: Itinerary,
    pub num_removed: usize,
}

/// Output of a filter chain.
#[derive(Debug, Clone, Default)]
pub struct FilterChainResult {
    /// Kept itineraries in rank order, followed by removed ones.
    pub itineraries: Vec<FilteredItinerary>,
    pub routing_errors: Vec<RoutingError>,
    /// Set when the crop to `num_itineraries` removed anything.
    pub num_itineraries: Option<NumItinerariesFilterResults>,
}

impl FilterChainResult {
    pub fn kept(&self) -> impl Iterator<Item = &Itinerary> + '_ {
        self.itineraries
            .iter()
            .filter(|f| f.is_kept())
            .map(FilteredItinerary::itinerary)
    }
}

/// Decides which itineraries to return and in what order.
pub trait ItineraryFilterChain: Send + Sync {
    fn filter(&self, itineraries: Vec<Itinerary>, ctx: &FilterContext) -> FilterChainResult;
}

/// Walk-all-the-way removal, search-window filter, ranking and crop.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFilterChain;

impl ItineraryFilterChain for DefaultFilterChain {
    fn filter(&self, itineraries: Vec<Itinerary>, ctx: &FilterContext) -> FilterChainResult {
        let total = itineraries.len();
        let mut items: Vec<FilteredItinerary> = itineraries
            .into_iter()
            .map(|it| flag(it, ctx))
            .collect();

        items.sort_by(|a, b| {
            b.is_kept()
                .cmp(&a.is_kept())
                .then_with(|| rank(a.itinerary(), b.itinerary(), ctx.crop_side))
        });

        let mut num_kept = 0;
        let mut num_removed = 0;
        let mut first_removed = None;
        let items: Vec<FilteredItinerary> = items
            .into_iter()
            .map(|item| {
                if !item.is_kept() {
                    return item;
                }
                if num_kept < ctx.num_itineraries {
                    num_kept += 1;
                    return item;
                }
                num_removed += 1;
                first_removed.get_or_insert_with(|| item.itinerary().clone());
                item.remove(RemovalReason::NumItinerariesLimit)
            })
            .collect();

        let mut routing_errors = Vec::new();
        let outside_window = items.iter().any(|item| {
            matches!(
                item,
                FilteredItinerary::Removed {
                    reason: RemovalReason::OutsideSearchWindow,
                    ..
                }
            )
        });
        if num_kept == 0 && outside_window {
            routing_errors.push(RoutingError::new(
                RoutingErrorCode::NoTransitConnectionInSearchWindow,
            ));
        }

        debug!(kept = num_kept, total, cropped = num_removed, "itinerary filter chain applied");

        FilterChainResult {
            itineraries: items,
            routing_errors,
            num_itineraries: first_removed.map(|first_removed| NumItinerariesFilterResults {
                first_removed,
                num_removed,
            }),
        }
    }
}

fn flag(itinerary: Itinerary, ctx: &FilterContext) -> FilteredItinerary {
    let item = FilteredItinerary::Kept(itinerary);
    let it = item.itinerary();
    if ctx.remove_walk_all_the_way && !it.has_transit() && it.is_walk_only() {
        return item.remove(RemovalReason::WalkAllTheWay);
    }
    if ctx
        .latest_departure_time
        .is_some_and(|ldt| it.has_transit() && it.start_time() > ldt)
    {
        return item.remove(RemovalReason::OutsideSearchWindow);
    }
    item
}

/// Rank itineraries best-first.
///
/// When the tail of the window is cropped (depart-after) itineraries are
/// ranked by:
/// 1. Arrival time (earlier is better)
/// 2. Number of transfers (fewer is better)
/// 3. Total duration (shorter is better)
/// 4. Generalized cost (lower is better)
///
/// When the head is cropped (arrive-by) departure time comes first, later
/// being better.
fn rank(a: &Itinerary, b: &Itinerary, crop: CropSide) -> Ordering {
    let primary = match crop {
        CropSide::Tail => a.end_time().cmp(&b.end_time()),
        CropSide::Head => b.start_time().cmp(&a.start_time()),
    };
    primary
        .then_with(|| a.num_transfers().cmp(&b.num_transfers()))
        .then_with(|| a.duration().cmp(&b.duration()))
        .then_with(|| a.generalized_cost().cmp(&b.generalized_cost()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Leg, LegKind, StreetMode};
    use crate::transit::TransitMode;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 15, h, m, 0)
            .unwrap()
    }

    fn walk(from: (u32, u32), to: (u32, u32)) -> Itinerary {
        Itinerary::new(
            vec![Leg::new(
                LegKind::Street(StreetMode::Walk),
                "origin",
                "destination",
                at(from.0, from.1),
                at(to.0, to.1),
            )],
            1000,
        )
        .unwrap()
    }

    fn bus(board: (u32, u32), alight: (u32, u32), cost: i32) -> Itinerary {
        Itinerary::new(
            vec![Leg::new(
                LegKind::Transit {
                    route: "R1".into(),
                    mode: TransitMode::Bus,
                    trip: "R1-0".into(),
                },
                "B",
                "F",
                at(board.0, board.1),
                at(alight.0, alight.1),
            )],
            cost,
        )
        .unwrap()
    }

    fn ctx() -> FilterContext {
        FilterContext {
            remove_walk_all_the_way: false,
            latest_departure_time: None,
            num_itineraries: 10,
            crop_side: CropSide::Tail,
        }
    }

    #[test]
    fn ranks_by_arrival_then_duration() {
        let result = DefaultFilterChain.filter(
            vec![
                bus((10, 0), (10, 30), 100),
                bus((10, 10), (10, 20), 100),
                bus((10, 5), (10, 20), 100),
            ],
            &ctx(),
        );

        let starts: Vec<_> = result.kept().map(Itinerary::start_time).collect();
        assert_eq!(starts, vec![at(10, 10), at(10, 5), at(10, 0)]);
        assert!(result.num_itineraries.is_none());
        assert!(result.routing_errors.is_empty());
    }

    #[test]
    fn arrive_by_ranks_latest_departure_first() {
        let ctx = FilterContext {
            crop_side: CropSide::Head,
            ..ctx()
        };
        let result = DefaultFilterChain.filter(
            vec![bus((10, 0), (10, 20), 100), bus((10, 10), (10, 40), 100)],
            &ctx,
        );

        let starts: Vec<_> = result.kept().map(Itinerary::start_time).collect();
        assert_eq!(starts, vec![at(10, 10), at(10, 0)]);
    }

    #[test]
    fn walk_all_the_way_removed_when_flagged() {
        let ctx = FilterContext {
            remove_walk_all_the_way: true,
            ..ctx()
        };
        let result = DefaultFilterChain.filter(
            vec![walk((10, 0), (10, 25)), bus((10, 5), (10, 20), 100)],
            &ctx,
        );

        assert_eq!(result.kept().count(), 1);
        assert!(matches!(
            result.itineraries[1],
            FilteredItinerary::Removed {
                reason: RemovalReason::WalkAllTheWay,
                ..
            }
        ));
    }

    #[test]
    fn crop_reports_first_removed() {
        let ctx = FilterContext {
            num_itineraries: 2,
            ..ctx()
        };
        let result = DefaultFilterChain.filter(
            vec![
                bus((10, 40), (11, 0), 100),
                bus((10, 0), (10, 20), 100),
                bus((10, 20), (10, 40), 100),
                bus((10, 30), (10, 50), 100),
            ],
            &ctx,
        );

        assert_eq!(result.kept().count(), 2);
        let crop = result.num_itineraries.unwrap();
        assert_eq!(crop.first_removed.start_time(), at(10, 30));
        assert_eq!(crop.num_removed, 2);
    }

    #[test]
    fn departures_after_window_are_removed() {
        let ctx = FilterContext {
            latest_departure_time: Some(at(10, 30)),
            ..ctx()
        };
        let result = DefaultFilterChain.filter(vec![bus((10, 45), (11, 0), 100)], &ctx);

        assert_eq!(result.kept().count(), 0);
        assert_eq!(
            result.routing_errors,
            vec![RoutingError::new(RoutingErrorCode::NoTransitConnectionInSearchWindow)]
        );
    }

    #[test]
    fn direct_results_ignore_window() {
        let ctx = FilterContext {
            latest_departure_time: Some(at(10, 30)),
            ..ctx()
        };
        let result = DefaultFilterChain.filter(
            vec![walk((10, 45), (11, 10)), bus((10, 45), (11, 0), 100)],
            &ctx,
        );

        assert_eq!(result.kept().count(), 1);
        // Something was kept, so the window error is not reported.
        assert!(result.routing_errors.is_empty());
    }
}
