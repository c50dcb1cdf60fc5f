//! Named phase durations for a suite run

use std::time::{Duration, Instant};

/// Accumulates how long each phase of a run took
#[derive(Debug, Clone, Default)]
pub struct PhaseTimer {
    phases: Vec<(String, Duration)>,
}

impl PhaseTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` and record its duration under `phase`
    pub fn time<T>(&mut self, phase: &str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = f();
        self.record(phase, start.elapsed());
        result
    }

    /// Add `elapsed` to `phase`; repeated phases accumulate
    pub fn record(&mut self, phase: &str, elapsed: Duration) {
        tracing::debug!("Time spent {}: {} ms", phase, elapsed.as_millis());
        match self.phases.iter_mut().find(|(name, _)| name == phase) {
            Some((_, total)) => *total += elapsed,
            None => self.phases.push((phase.to_string(), elapsed)),
        }
    }

    pub fn get(&self, phase: &str) -> Option<Duration> {
        self.phases
            .iter()
            .find(|(name, _)| name == phase)
            .map(|(_, d)| *d)
    }

    /// Recorded phases in first-seen order
    pub fn phases(&self) -> &[(String, Duration)] {
        &self.phases
    }

    pub fn total(&self) -> Duration {
        self.phases.iter().map(|(_, d)| *d).sum()
    }
}
