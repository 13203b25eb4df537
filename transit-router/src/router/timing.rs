//! Per-phase timing of a routing request.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::debug;

/// Phases of a routing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Precalculation,
    DirectStreet,
    DirectFlex,
    Transit,
    Filtering,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Precalculation => "precalculation",
            Phase::DirectStreet => "direct street",
            Phase::DirectFlex => "direct flex",
            Phase::Transit => "transit",
            Phase::Filtering => "filtering",
        };
        f.write_str(s)
    }
}

/// How long each phase took. Sub-searches that ran concurrently overlap,
/// so phase durations may add up to more than `total`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimingReport {
    pub phases: Vec<(Phase, Duration)>,
    pub total: Duration,
}

impl TimingReport {
    pub fn phase(&self, phase: Phase) -> Option<Duration> {
        self.phases
            .iter()
            .find(|(p, _)| *p == phase)
            .map(|(_, d)| *d)
    }
}

/// Collects phase durations for one request.
#[derive(Debug)]
pub struct RoutingTimer {
    started: Instant,
    phases: Vec<(Phase, Duration)>,
}

impl RoutingTimer {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            phases: Vec::new(),
        }
    }

    /// Time since the request started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn record(&mut self, phase: Phase, elapsed: Duration) {
        self.phases.push((phase, elapsed));
    }

    /// Record `phase` as running from `since` until now.
    pub fn finished(&mut self, phase: Phase, since: Instant) {
        self.record(phase, since.elapsed());
    }

    pub fn finish(self) -> TimingReport {
        let report = TimingReport {
            phases: self.phases,
            total: self.started.elapsed(),
        };
        for (phase, elapsed) in &report.phases {
            debug!(phase = %phase, elapsed_ms = elapsed.as_millis() as u64, "routing phase finished");
        }
        debug!(total_ms = report.total.as_millis() as u64, "routing request finished");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_keeps_recorded_phases() {
        let mut timer = RoutingTimer::start();
        timer.record(Phase::Transit, Duration::from_millis(12));
        timer.finished(Phase::Filtering, Instant::now());

        let report = timer.finish();
        assert_eq!(report.phase(Phase::Transit), Some(Duration::from_millis(12)));
        assert!(report.phase(Phase::Filtering).is_some());
        assert_eq!(report.phase(Phase::DirectFlex), None);
    }

    #[test]
    fn phase_display() {
        assert_eq!(Phase::DirectStreet.to_string(), "direct street");
        assert_eq!(Phase::Transit.to_string(), "transit");
    }
}
