//! Enumeration statistics.

use std::fmt;
use std::time::Duration;

/// Counters of a finished (or abandoned) enumeration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnumerationStatistics {
    /// Oracle calls made.
    pub solve_count: u64,
    /// Assignments reported to the consumer.
    pub solution_count: u64,
    /// Cuts appended to the model.
    pub cut_count: u64,
    /// Time spent inside the oracle.
    pub oracle_duration: Duration,
    /// Wall-clock time of the whole run.
    pub total_duration: Duration,
}

impl EnumerationStatistics {
    /// Average time per oracle call.
    pub fn avg_solve_time(&self) -> Duration {
        if self.solve_count == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(self.oracle_duration.as_secs_f64() / self.solve_count as f64)
        }
    }

    /// Oracle calls per second of wall-clock time.
    pub fn solves_per_second(&self) -> f64 {
        let secs = self.total_duration.as_secs_f64();
        if secs > 0.0 {
            self.solve_count as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for EnumerationStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} solutions, {} solves, {} cuts in {:.3}s (oracle {:.3}s)",
            self.solution_count,
            self.solve_count,
            self.cut_count,
            self.total_duration.as_secs_f64(),
            self.oracle_duration.as_secs_f64()
        )
    }
}
