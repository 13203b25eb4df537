//! Transit journey router.
//!
//! Answers "how do I get from here to there around this time?" with a
//! multi-criteria range-RAPTOR search over a timetable, combined with direct
//! street and on-demand searches and paged through resumable cursors.

pub mod cache;
pub mod config;
pub mod domain;
pub mod raptor;
pub mod router;
pub mod transit;
