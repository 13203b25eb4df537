//! Search window for the next page.
//!
//! After a transit search the worker suggests how wide the next page's
//! window should be. Too many results means the window was too wide: shrink
//! it so the first itinerary the filter chain cut away sits right at its
//! edge. Too few means grow it, by an amount that shrinks as more results
//! are found.
//!
//! Every suggestion is rounded up to whole minutes and clamped to
//! `[min_window, max_window]`.

use chrono::{DateTime, Duration, FixedOffset};

use crate::domain::CropSide;

/// Error building a [`PagingSearchWindowAdjuster`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PagingError {
    #[error("search window adjustments must not be empty")]
    NoAdjustments,

    #[error("search window adjustment {index} is negative or larger than the one before it")]
    InvalidAdjustment { index: usize },

    #[error("minimum search window {min} exceeds maximum {max}")]
    InvertedBounds { min: Duration, max: Duration },
}

/// Computes the next page's search window. Built once from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingSearchWindowAdjuster {
    min_window: Duration,
    max_window: Duration,
    adjustments: Vec<Duration>,
}

impl PagingSearchWindowAdjuster {
    /// `adjustments[n]` is added when `n` itineraries were found; counts past
    /// the end use the last entry.
    pub fn new(
        min_window: Duration,
        max_window: Duration,
        adjustments: Vec<Duration>,
    ) -> Result<Self, PagingError> {
        if min_window > max_window {
            return Err(PagingError::InvertedBounds {
                min: min_window,
                max: max_window,
            });
        }
        if adjustments.is_empty() {
            return Err(PagingError::NoAdjustments);
        }
        for (index, adjustment) in adjustments.iter().enumerate() {
            let increases = index > 0 && *adjustment > adjustments[index - 1];
            if *adjustment < Duration::zero() || increases {
                return Err(PagingError::InvalidAdjustment { index });
            }
        }
        Ok(Self {
            min_window,
            max_window,
            adjustments,
        })
    }

    pub fn min_window(&self) -> Duration {
        self.min_window
    }

    pub fn max_window(&self) -> Duration {
        self.max_window
    }

    /// Window for the next page after the filter chain cropped results.
    ///
    /// `removed_start` is the departure of the first itinerary removed by
    /// the crop. Cropping the tail keeps the start of the window, so the new
    /// window ends at `removed_start`; cropping the head keeps the end, so
    /// the new window starts there.
    pub fn decrease_search_window(
        &self,
        search_window: Duration,
        window_start: DateTime<FixedOffset>,
        removed_start: DateTime<FixedOffset>,
        crop: CropSide,
    ) -> Duration {
        let used = match crop {
            CropSide::Tail => removed_start - window_start,
            CropSide::Head => (window_start + search_window) - removed_start,
        };
        self.normalize(used)
    }

    /// Window for the next page when nothing was cropped.
    pub fn increase_or_keep_search_window(
        &self,
        search_window: Duration,
        n_requested: usize,
        n_found: usize,
    ) -> Duration {
        if n_found >= n_requested {
            return self.normalize(search_window);
        }
        let index = n_found.min(self.adjustments.len() - 1);
        self.normalize(search_window + self.adjustments[index])
    }

    fn normalize(&self, window: Duration) -> Duration {
        let seconds = window.num_seconds();
        let minutes = seconds.div_euclid(60) + i64::from(seconds.rem_euclid(60) != 0);
        Duration::minutes(minutes).clamp(self.min_window, self.max_window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn adjuster() -> PagingSearchWindowAdjuster {
        PagingSearchWindowAdjuster::new(
            Duration::minutes(40),
            Duration::hours(3),
            [240, 120, 60, 30, 20, 10]
                .into_iter()
                .map(Duration::minutes)
                .collect(),
        )
        .unwrap()
    }

    fn at(h: u32, m: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 15, h, m, 0)
            .unwrap()
    }

    #[test]
    fn increasing_adjustments_are_rejected() {
        let err = PagingSearchWindowAdjuster::new(
            Duration::minutes(40),
            Duration::hours(3),
            vec![Duration::minutes(10), Duration::minutes(20)],
        )
        .unwrap_err();
        assert_eq!(err, PagingError::InvalidAdjustment { index: 1 });
    }

    #[test]
    fn bad_bounds_are_rejected() {
        assert!(matches!(
            PagingSearchWindowAdjuster::new(Duration::hours(4), Duration::hours(3), vec![Duration::zero()]),
            Err(PagingError::InvertedBounds { .. })
        ));
        assert_eq!(
            PagingSearchWindowAdjuster::new(Duration::zero(), Duration::hours(3), vec![]),
            Err(PagingError::NoAdjustments)
        );
    }

    #[test]
    fn keep_when_enough_found() {
        let adj = adjuster();
        assert_eq!(
            adj.increase_or_keep_search_window(Duration::minutes(60), 5, 5),
            Duration::minutes(60)
        );
        assert_eq!(
            adj.increase_or_keep_search_window(Duration::minutes(60), 5, 9),
            Duration::minutes(60)
        );
    }

    #[test]
    fn grow_by_number_found() {
        let adj = adjuster();
        // Nothing found: add 4 hours, capped at 3.
        assert_eq!(
            adj.increase_or_keep_search_window(Duration::minutes(60), 5, 0),
            Duration::hours(3)
        );
        assert_eq!(
            adj.increase_or_keep_search_window(Duration::minutes(60), 5, 2),
            Duration::minutes(120)
        );
        // Past the end of the table the last entry applies.
        assert_eq!(
            adj.increase_or_keep_search_window(Duration::minutes(60), 50, 30),
            Duration::minutes(70)
        );
    }

    #[test]
    fn crop_tail_ends_window_at_removed_itinerary() {
        let adj = adjuster();
        let next = adj.decrease_search_window(Duration::hours(2), at(10, 0), at(11, 15), CropSide::Tail);
        assert_eq!(next, Duration::minutes(75));
    }

    #[test]
    fn crop_head_starts_window_at_removed_itinerary() {
        let adj = adjuster();
        let next = adj.decrease_search_window(Duration::hours(2), at(10, 0), at(10, 30), CropSide::Head);
        assert_eq!(next, Duration::minutes(90));
    }

    #[test]
    fn results_are_whole_minutes_within_bounds() {
        let adj = adjuster();
        let start = at(10, 0);

        let next = adj.decrease_search_window(
            Duration::hours(2),
            start,
            start + Duration::seconds(50 * 60 + 1),
            CropSide::Tail,
        );
        assert_eq!(next, Duration::minutes(51));

        let next = adj.decrease_search_window(Duration::hours(2), start, at(10, 5), CropSide::Tail);
        assert_eq!(next, Duration::minutes(40));
    }
}
