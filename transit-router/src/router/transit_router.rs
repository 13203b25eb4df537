//! The transit sub-search.
//!
//! Fetches access and egress legs, runs the range-RAPTOR engine on a
//! blocking thread and turns its paths into itineraries with real instants.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use futures::future::try_join;
use tracing::debug;

use super::RouterServices;
use crate::domain::{
    AccessEgressKind, AccessEgressLeg, Itinerary, Leg, LegKind, RouteRequest, SearchError,
    SearchProfile, StreetMode, duration_to_seconds, from_instant, to_instant,
};
use crate::raptor::{Path, PathLeg, RaptorProfile, RaptorRequest, SearchDirection, SearchParams};

/// Itineraries found by the transit search and the window it covered.
#[derive(Debug, Clone)]
pub struct TransitRouterResult {
    pub itineraries: Vec<Itinerary>,
    pub search_params: SearchParams,
}

/// Engine profile and direction for a request profile.
///
/// The multi-criteria search runs backwards for arrive-by requests so the
/// fixed time is where the search starts.
pub fn raptor_profile(profile: SearchProfile, arrive_by: bool) -> (RaptorProfile, SearchDirection) {
    match profile {
        SearchProfile::Standard => (RaptorProfile::Standard, SearchDirection::Forward),
        SearchProfile::StandardReverse => (RaptorProfile::Standard, SearchDirection::Reverse),
        SearchProfile::MultiCriteria if arrive_by => {
            (RaptorProfile::MultiCriteria, SearchDirection::Reverse)
        }
        SearchProfile::MultiCriteria => (RaptorProfile::MultiCriteria, SearchDirection::Forward),
    }
}

pub async fn route(
    services: &RouterServices,
    request: &RouteRequest,
    zero: DateTime<FixedOffset>,
) -> Result<TransitRouterResult, SearchError> {
    let provider = &services.access_egress;
    let (access, egress) = try_join(
        provider.find_legs(&request.from, request.access_mode, AccessEgressKind::Access),
        provider.find_legs(&request.to, request.egress_mode, AccessEgressKind::Egress),
    )
    .await?;
    debug!(access = access.len(), egress = egress.len(), "access/egress legs found");

    let raptor_request = raptor_request(services, request, zero, access, egress);
    let data = Arc::clone(&services.transit_data);
    let raptor = services.raptor.clone();
    let response = tokio::task::spawn_blocking(move || raptor.route(&data, &raptor_request))
        .await
        .map_err(|e| SearchError::System(format!("transit search task failed: {e}")))??;

    let itineraries = response
        .paths
        .into_iter()
        .map(|path| to_itinerary(path, request, zero))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TransitRouterResult {
        itineraries,
        search_params: response.search_params,
    })
}

fn raptor_request(
    services: &RouterServices,
    request: &RouteRequest,
    zero: DateTime<FixedOffset>,
    access: Vec<AccessEgressLeg>,
    egress: Vec<AccessEgressLeg>,
) -> RaptorRequest {
    let (profile, direction) = raptor_profile(request.search_profile, request.arrive_by);
    let time = from_instant(zero, request.date_time);

    let mut builder = RaptorRequest::builder()
        .profile(profile)
        .direction(direction)
        .access_legs(access)
        .egress_legs(egress)
        .slack(services.config.slack)
        .cost(services.config.cost)
        .deadline(request.deadline);
    builder = if request.arrive_by {
        builder.latest_arrival_time(time)
    } else {
        builder.earliest_departure_time(time)
    };
    if let Some(window) = request.search_window {
        builder = builder.search_window(duration_to_seconds(window));
    }
    builder.build()
}

fn street_kind(leg: &AccessEgressLeg, mode: StreetMode) -> LegKind {
    if leg.has_rides() {
        return LegKind::Flex {
            rides: leg.transfer_penalty,
        };
    }
    match mode {
        StreetMode::NotSet | StreetMode::Flexible => LegKind::Street(StreetMode::Walk),
        mode => LegKind::Street(mode),
    }
}

fn to_itinerary(
    path: Path,
    request: &RouteRequest,
    zero: DateTime<FixedOffset>,
) -> Result<Itinerary, SearchError> {
    let at = |t| to_instant(zero, t);
    let legs = path
        .legs
        .into_iter()
        .map(|leg| match leg {
            PathLeg::Access {
                leg,
                stop_name,
                start,
                end,
            } => Leg::new(
                street_kind(&leg, request.access_mode),
                request.from.id.clone(),
                stop_name,
                at(start),
                at(end),
            ),
            PathLeg::Transit {
                route_name,
                mode,
                trip_id,
                from_name,
                to_name,
                board,
                alight,
                ..
            } => Leg::new(
                LegKind::Transit {
                    route: route_name,
                    mode,
                    trip: trip_id,
                },
                from_name,
                to_name,
                at(board),
                at(alight),
            ),
            PathLeg::Transfer {
                from_name,
                to_name,
                start,
                end,
            } => Leg::new(LegKind::Transfer, from_name, to_name, at(start), at(end)),
            PathLeg::Egress {
                leg,
                stop_name,
                start,
                end,
            } => Leg::new(
                street_kind(&leg, request.egress_mode),
                stop_name,
                request.to.id.clone(),
                at(start),
                at(end),
            ),
        })
        .collect();

    Itinerary::new(legs, path.cost).map_err(|e| SearchError::System(format!("invalid transit path: {e}")))
}
