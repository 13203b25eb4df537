//! The read-only transit network: stops, routes, trips and transfers.

mod slack;
mod timetable;
mod transfers;

pub use slack::Slack;
pub use timetable::{
    NetworkError, Route, RouteIndex, StopIndex, TransitData, TransitDataBuilder, TransitMode,
    TripSchedule,
};
pub use transfers::{Transfer, Transfers};
