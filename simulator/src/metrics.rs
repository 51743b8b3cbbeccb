//! Simulation metrics.

use std::collections::VecDeque;
use std::time::Duration;

use serde::Serialize;

/// Simulation metrics.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationMetrics {
    /// Steps executed, including interactive commands.
    pub steps_executed: u64,
    /// Keys pressed.
    pub keys_pressed: u64,
    /// Keys that produced a value.
    pub results_produced: u64,
    /// Assertions that held.
    pub assertions_passed: u64,
    /// Assertions that failed.
    pub assertions_failed: u64,
    /// Time spent waiting for fetches to settle (ms).
    #[serde(skip)]
    settle_samples: VecDeque<u64>,
    /// Maximum samples to keep.
    #[serde(skip)]
    max_samples: usize,
}

impl SimulationMetrics {
    /// Create new metrics.
    pub fn new() -> Self {
        Self {
            steps_executed: 0,
            keys_pressed: 0,
            results_produced: 0,
            assertions_passed: 0,
            assertions_failed: 0,
            settle_samples: VecDeque::with_capacity(1024),
            max_samples: 1024,
        }
    }

    pub fn record_step(&mut self) {
        self.steps_executed += 1;
    }

    /// Record a key press and whether it produced a value.
    pub fn record_key(&mut self, produced_result: bool) {
        self.keys_pressed += 1;
        if produced_result {
            self.results_produced += 1;
        }
    }

    pub fn record_assertion(&mut self, passed: bool) {
        if passed {
            self.assertions_passed += 1;
        } else {
            self.assertions_failed += 1;
        }
    }

    /// Record how long a settle wait took.
    pub fn record_settle(&mut self, waited: Duration) {
        if self.settle_samples.len() >= self.max_samples {
            self.settle_samples.pop_front();
        }
        self.settle_samples.push_back(waited.as_millis() as u64);
    }

    /// Get average settle wait in ms.
    pub fn average_settle_ms(&self) -> u64 {
        if self.settle_samples.is_empty() {
            return 0;
        }

        let sum: u64 = self.settle_samples.iter().sum();
        sum / self.settle_samples.len() as u64
    }

    /// Get the longest settle wait in ms.
    pub fn max_settle_ms(&self) -> u64 {
        self.settle_samples.iter().copied().max().unwrap_or(0)
    }
}

impl Default for SimulationMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics() {
        let mut metrics = SimulationMetrics::new();

        metrics.record_key(true);
        metrics.record_key(false);
        metrics.record_assertion(true);
        metrics.record_assertion(false);
        metrics.record_settle(Duration::from_millis(200));
        metrics.record_settle(Duration::from_millis(400));
        metrics.record_settle(Duration::from_millis(300));

        assert_eq!(metrics.keys_pressed, 2);
        assert_eq!(metrics.results_produced, 1);
        assert_eq!(metrics.assertions_passed, 1);
        assert_eq!(metrics.assertions_failed, 1);
        assert_eq!(metrics.average_settle_ms(), 300);
        assert_eq!(metrics.max_settle_ms(), 400);
    }

    #[test]
    fn test_settle_samples_are_bounded() {
        let mut metrics = SimulationMetrics::new();
        for _ in 0..2000 {
            metrics.record_settle(Duration::from_millis(1));
        }
        metrics.record_settle(Duration::from_millis(1025));

        assert_eq!(metrics.settle_samples.len(), 1024);
        assert_eq!(metrics.average_settle_ms(), 2);
    }
}
