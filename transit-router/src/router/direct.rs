//! Collaborators the routing worker calls but does not implement.
//!
//! Street routing (walk, bike, car and on-demand flex) lives outside this
//! crate. The worker only needs two things from it: complete direct
//! itineraries, and candidate legs connecting a location to transit stops.

use async_trait::async_trait;

use crate::domain::{AccessEgressKind, AccessEgressLeg, Itinerary, Location, RouteRequest, SearchError, StreetMode};

/// Routes a request without transit.
///
/// Used for both the direct street search and the direct flex search. A
/// flex router should return nothing unless the request's direct mode is
/// [`StreetMode::Flexible`].
#[async_trait]
pub trait DirectRouter: Send + Sync {
    async fn route(&self, request: &RouteRequest) -> Result<Vec<Itinerary>, SearchError>;
}

/// Finds access legs (from the origin) or egress legs (to the destination).
#[async_trait]
pub trait AccessEgressProvider: Send + Sync {
    /// Legs connecting `location` to transit stops using `mode`.
    ///
    /// # Errors
    ///
    /// A location the provider cannot match should be reported as a
    /// validation error so the other sub-searches still run.
    async fn find_legs(
        &self,
        location: &Location,
        mode: StreetMode,
        kind: AccessEgressKind,
    ) -> Result<Vec<AccessEgressLeg>, SearchError>;
}
