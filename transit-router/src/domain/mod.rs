//! Domain types for the journey router.
//!
//! Requests, itineraries, access/egress legs, routing errors and the
//! transit clock. Types that carry invariants check them at construction.

mod access_egress;
mod cursor;
mod error;
mod itinerary;
mod request;
mod time;

pub use access_egress::{AccessEgressKind, AccessEgressLeg};
pub use cursor::{CursorError, PageCursor, PageKind};
pub use error::{InputField, RoutingError, RoutingErrorCode, SearchError, first_routing_error};
pub use itinerary::{FilteredItinerary, Itinerary, ItineraryError, Leg, LegKind, RemovalReason};
pub use request::{CropSide, Location, RouteRequest, SearchProfile, StreetMode};
pub use time::{
    Seconds, TimeError, duration_to_seconds, format_duration, format_time, from_instant,
    parse_time, parse_time_sequence, time_zero, to_instant,
};
