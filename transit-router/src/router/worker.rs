//! The routing worker.
//!
//! One worker answers one request: it runs the direct street, direct flex
//! and transit sub-searches, merges their results and errors, filters and
//! ranks the itineraries, and works out the search window and cursors for
//! the neighbouring pages.
//!
//! A sub-search failure is handled by kind:
//! - validation errors are collected and the other results still returned
//! - a timeout is reported as a processing-timeout error for that
//!   sub-search only
//! - a system error aborts the whole request

use std::collections::HashSet;
use std::future::Future;
use std::time::{Duration as StdDuration, Instant};

use chrono::{DateTime, Duration, FixedOffset};
use tracing::{debug, error, warn};

use super::filter::{FilterChainResult, FilterContext};
use super::timing::{Phase, RoutingTimer, TimingReport};
use super::transit_router::{self, TransitRouterResult};
use super::RouterServices;
use crate::domain::{
    CropSide, Itinerary, PageCursor, PageKind, RouteRequest, RoutingError, RoutingErrorCode,
    SearchError, StreetMode, first_routing_error, time_zero, to_instant,
};
use crate::raptor::SearchParams;

/// A sub-search outcome and how long it took.
type Timed<T> = (Result<T, SearchError>, StdDuration);

/// Answer to a routing request.
#[derive(Debug, Clone)]
pub struct RoutingResponse {
    /// Kept itineraries, best first.
    pub itineraries: Vec<Itinerary>,
    /// Window the transit search covered. `None` when it did not run to
    /// completion.
    pub search_params_used: Option<SearchParams>,
    /// Suggested window for the neighbouring pages.
    pub next_search_window: Option<Duration>,
    /// At most one error: the highest priority one collected.
    pub routing_errors: Vec<RoutingError>,
    pub next_page_cursor: Option<PageCursor>,
    pub previous_page_cursor: Option<PageCursor>,
    pub timing: TimingReport,
}

/// Routes a single request against shared services.
pub struct RoutingWorker<'a> {
    services: &'a RouterServices,
    request: RouteRequest,
}

impl<'a> RoutingWorker<'a> {
    /// Prepare `request`: apply its page cursor, check it and fill in the
    /// configured deadline when it has none.
    pub fn new(services: &'a RouterServices, mut request: RouteRequest) -> Result<Self, SearchError> {
        request.apply_page_cursor();
        request.validate()?;
        if request.deadline.is_none()
            && let Some(timeout) = services.config.request_timeout()
        {
            request.deadline = Some(Instant::now() + timeout);
        }
        Ok(Self { services, request })
    }

    pub fn request(&self) -> &RouteRequest {
        &self.request
    }

    /// Run all sub-searches and build the response.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Timeout`] if the deadline passed before any work
    ///   started
    /// - [`SearchError::System`] if any sub-search failed unexpectedly
    pub async fn route(&mut self) -> Result<RoutingResponse, SearchError> {
        let mut timer = RoutingTimer::start();
        if self.request.deadline_passed() {
            return Err(SearchError::Timeout);
        }

        let zero = time_zero(self.request.date_time);
        let original_direct_mode = self.request.direct_mode;
        let remove_walk_all_the_way =
            matches!(original_direct_mode, StreetMode::NotSet | StreetMode::Flexible);
        if original_direct_mode == StreetMode::NotSet {
            self.request.direct_mode = StreetMode::Walk;
        }
        debug!(
            from = %self.request.from,
            to = %self.request.to,
            arrive_by = self.request.arrive_by,
            direct_mode = %self.request.direct_mode,
            "routing request started"
        );
        timer.record(Phase::Precalculation, timer.elapsed());

        let (street, flex, transit) = self.search(zero).await;
        self.request.direct_mode = original_direct_mode;

        timer.record(Phase::DirectStreet, street.1);
        timer.record(Phase::DirectFlex, flex.1);
        timer.record(Phase::Transit, transit.1);

        let mut errors = HashSet::new();
        let mut itineraries = Vec::new();
        if let Some(found) = absorb(street.0, &mut errors, Phase::DirectStreet)? {
            itineraries.extend(found);
        }
        if let Some(found) = absorb(flex.0, &mut errors, Phase::DirectFlex)? {
            itineraries.extend(found);
        }
        let search_params = match absorb(transit.0, &mut errors, Phase::Transit)? {
            Some(TransitRouterResult {
                itineraries: found,
                search_params,
            }) => {
                itineraries.extend(found);
                Some(search_params)
            }
            None => None,
        };

        let filtering = Instant::now();
        let ctx = FilterContext {
            remove_walk_all_the_way,
            latest_departure_time: search_params
                .filter(|sp| !self.request.arrive_by && sp.search_window_set)
                .map(|sp| to_instant(zero, sp.latest_departure_time())),
            num_itineraries: self.request.num_itineraries,
            crop_side: self.request.crop_side(),
        };
        let filtered = self.services.filter_chain.filter(itineraries, &ctx);
        errors.extend(filtered.routing_errors.iter().cloned());
        timer.finished(Phase::Filtering, filtering);

        let next_search_window = search_params.map(|sp| self.next_search_window(&sp, zero, &filtered, ctx.crop_side));
        let (next_page_cursor, previous_page_cursor) = match (search_params, next_search_window) {
            (Some(sp), Some(next_sw)) => {
                let (next, previous) = self.page_cursors(&sp, zero, next_sw);
                (Some(next), Some(previous))
            }
            _ => (None, None),
        };

        let itineraries: Vec<Itinerary> = filtered.kept().cloned().collect();
        let routing_errors: Vec<RoutingError> = first_routing_error(&errors).cloned().into_iter().collect();
        debug!(
            itineraries = itineraries.len(),
            errors = errors.len(),
            next_search_window = ?next_search_window,
            "routing request answered"
        );

        Ok(RoutingResponse {
            itineraries,
            search_params_used: search_params,
            next_search_window,
            routing_errors,
            next_page_cursor,
            previous_page_cursor,
            timing: timer.finish(),
        })
    }

    async fn search(
        &self,
        zero: DateTime<FixedOffset>,
    ) -> (Timed<Vec<Itinerary>>, Timed<Vec<Itinerary>>, Timed<TransitRouterResult>) {
        let services = self.services;
        let request = &self.request;

        let street = timed(services.street_router.route(request));
        let flex = timed(async {
            if services.config.flex_routing {
                services.flex_router.route(request).await
            } else {
                Ok(Vec::new())
            }
        });
        let transit = timed(transit_router::route(services, request, zero));

        if services.config.parallel_routing {
            tokio::join!(street, flex, transit)
        } else {
            (street.await, flex.await, transit.await)
        }
    }

    fn next_search_window(
        &self,
        sp: &SearchParams,
        zero: DateTime<FixedOffset>,
        filtered: &FilterChainResult,
        crop: CropSide,
    ) -> Duration {
        let paging = &self.services.paging;
        let search_window = Duration::seconds(i64::from(sp.search_window));
        match &filtered.num_itineraries {
            Some(cropped) => paging.decrease_search_window(
                search_window,
                to_instant(zero, sp.earliest_departure_time),
                cropped.first_removed.start_time(),
                crop,
            ),
            None => {
                let found = filtered.kept().filter(|it| it.has_transit()).count();
                paging.increase_or_keep_search_window(search_window, self.request.num_itineraries, found)
            }
        }
    }

    /// Cursors for the pages after and before this one. The next page starts
    /// where this window ended; the previous page ends where it started.
    fn page_cursors(
        &self,
        sp: &SearchParams,
        zero: DateTime<FixedOffset>,
        next_search_window: Duration,
    ) -> (PageCursor, PageCursor) {
        let search_window = Duration::seconds(i64::from(sp.search_window));
        let edt = to_instant(zero, sp.earliest_departure_time);
        let lat = sp
            .latest_arrival_time
            .filter(|_| self.request.arrive_by)
            .map(|lat| to_instant(zero, lat));

        let next = PageCursor::new(PageKind::Next, edt + search_window, None, next_search_window);
        let previous = PageCursor::new(
            PageKind::Previous,
            edt - next_search_window,
            lat.map(|lat| lat - search_window),
            next_search_window,
        );
        (next, previous)
    }
}

async fn timed<F: Future>(future: F) -> (F::Output, StdDuration) {
    let start = Instant::now();
    let output = future.await;
    (output, start.elapsed())
}

/// Fold a sub-search outcome into the collected errors. Only system errors
/// are passed on.
fn absorb<T>(
    result: Result<T, SearchError>,
    errors: &mut HashSet<RoutingError>,
    phase: Phase,
) -> Result<Option<T>, SearchError> {
    match result {
        Ok(found) => Ok(Some(found)),
        Err(SearchError::Validation(found)) => {
            debug!(%phase, errors = found.len(), "sub-search rejected the request");
            errors.extend(found);
            Ok(None)
        }
        Err(SearchError::Timeout) => {
            warn!(%phase, "sub-search timed out");
            errors.insert(RoutingError::new(RoutingErrorCode::ProcessingTimeout));
            Ok(None)
        }
        Err(e @ SearchError::System(_)) => {
            error!(%phase, error = %e, "sub-search failed");
            Err(e)
        }
    }
}
