//! Request orchestration around the transit search.
//!
//! The [`RoutingWorker`] answers a [`RouteRequest`](crate::domain::RouteRequest)
//! by combining direct street and flex searches with the range-RAPTOR
//! transit search, then filtering, ranking and paging the results.
//! [`RouterServices`] holds everything that outlives a single request.

mod direct;
mod filter;
mod paging;
mod timing;
mod transit_router;
mod worker;

use std::sync::Arc;

pub use direct::{AccessEgressProvider, DirectRouter};
pub use filter::{
    DefaultFilterChain, FilterChainResult, FilterContext, ItineraryFilterChain,
    NumItinerariesFilterResults,
};
pub use paging::{PagingError, PagingSearchWindowAdjuster};
pub use timing::{Phase, RoutingTimer, TimingReport};
pub use transit_router::{TransitRouterResult, raptor_profile};
pub use worker::{RoutingResponse, RoutingWorker};

use crate::config::{ConfigError, RouterConfig};
use crate::raptor::RaptorService;
use crate::transit::TransitData;

/// Shared, read-only services used by every routing worker.
#[derive(Clone)]
pub struct RouterServices {
    pub transit_data: Arc<TransitData>,
    pub raptor: RaptorService,
    pub access_egress: Arc<dyn AccessEgressProvider>,
    pub street_router: Arc<dyn DirectRouter>,
    pub flex_router: Arc<dyn DirectRouter>,
    pub filter_chain: Arc<dyn ItineraryFilterChain>,
    pub paging: PagingSearchWindowAdjuster,
    pub config: RouterConfig,
}

impl RouterServices {
    /// Build services from validated configuration, using the default
    /// filter chain.
    pub fn new(
        config: RouterConfig,
        transit_data: Arc<TransitData>,
        access_egress: Arc<dyn AccessEgressProvider>,
        street_router: Arc<dyn DirectRouter>,
        flex_router: Arc<dyn DirectRouter>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let dsw = &config.raptor.dynamic_search_window;
        let paging = PagingSearchWindowAdjuster::new(
            dsw.min_window(),
            dsw.max_window(),
            config.paging.search_window_adjustments(),
        )
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(Self {
            transit_data,
            raptor: RaptorService::new(config.raptor),
            access_egress,
            street_router,
            flex_router,
            filter_chain: Arc::new(DefaultFilterChain),
            paging,
            config,
        })
    }

    pub fn with_filter_chain(mut self, filter_chain: Arc<dyn ItineraryFilterChain>) -> Self {
        self.filter_chain = filter_chain;
        self
    }
}
