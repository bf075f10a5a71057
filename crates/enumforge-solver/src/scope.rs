//! Enumeration-level scope.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::statistics::EnumerationStatistics;

/// Counters and timing for one enumeration run.
///
/// Terminations read the scope between iterations; the driver is the only
/// writer.
#[derive(Debug, Default)]
pub struct EnumerationScope {
    start_time: Option<Instant>,
    end_time: Option<Instant>,
    solve_count: u64,
    solution_count: u64,
    cut_count: u64,
    oracle_duration: Duration,
    terminate_early_flag: Option<Arc<AtomicBool>>,
}

impl EnumerationScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_terminate_early_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.terminate_early_flag = Some(flag);
        self
    }

    pub fn start_enumeration(&mut self) {
        self.start_time = Some(Instant::now());
        self.end_time = None;
    }

    pub fn end_enumeration(&mut self) {
        if self.end_time.is_none() {
            self.end_time = Some(Instant::now());
        }
    }

    /// Time since the run started, frozen once it ended.
    pub fn elapsed(&self) -> Option<Duration> {
        let start = self.start_time?;
        Some(match self.end_time {
            Some(end) => end.duration_since(start),
            None => start.elapsed(),
        })
    }

    pub fn solve_count(&self) -> u64 {
        self.solve_count
    }

    pub fn solution_count(&self) -> u64 {
        self.solution_count
    }

    pub fn cut_count(&self) -> u64 {
        self.cut_count
    }

    pub fn oracle_duration(&self) -> Duration {
        self.oracle_duration
    }

    pub fn record_solve(&mut self, duration: Duration) {
        self.solve_count += 1;
        self.oracle_duration += duration;
    }

    pub fn record_solution(&mut self) {
        self.solution_count += 1;
    }

    pub fn record_cut(&mut self) {
        self.cut_count += 1;
    }

    pub fn is_terminate_early(&self) -> bool {
        self.terminate_early_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Snapshot of the counters.
    pub fn statistics(&self) -> EnumerationStatistics {
        EnumerationStatistics {
            solve_count: self.solve_count,
            solution_count: self.solution_count,
            cut_count: self.cut_count,
            oracle_duration: self.oracle_duration,
            total_duration: self.elapsed().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut scope = EnumerationScope::new();
        assert_eq!(scope.elapsed(), None);

        scope.start_enumeration();
        scope.record_solve(Duration::from_millis(5));
        scope.record_solution();
        scope.record_cut();
        scope.record_solve(Duration::from_millis(7));
        scope.end_enumeration();

        let stats = scope.statistics();
        assert_eq!(stats.solve_count, 2);
        assert_eq!(stats.solution_count, 1);
        assert_eq!(stats.cut_count, 1);
        assert_eq!(stats.oracle_duration, Duration::from_millis(12));
        assert_eq!(scope.elapsed(), Some(stats.total_duration));
    }

    #[test]
    fn test_terminate_early_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        let scope = EnumerationScope::new().with_terminate_early_flag(flag.clone());
        assert!(!scope.is_terminate_early());
        flag.store(true, Ordering::SeqCst);
        assert!(scope.is_terminate_early());
        assert!(!EnumerationScope::new().is_terminate_early());
    }
}
