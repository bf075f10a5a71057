//! Enumeration entry points that hide all internal wiring.

use tokio::sync::mpsc;
use tracing::warn;

use enumforge_config::{EnumeratorConfig, DEFAULT_CONFIG_FILE};
use enumforge_core::{Assignment, Model, VariableKey};
use enumforge_solver::{AnyOracle, ConfiguredTermination, EnumerationReport, Enumerator};

/// Enumerates every solution of `model`, configured from `enumerator.toml`
/// in the working directory when it exists.
///
/// Each solution is passed to `consumer` in discovery order. Cuts appended
/// during the run stay on `model`.
pub fn enumerate_all<K, F>(model: &mut Model<K>, consumer: F) -> EnumerationReport
where
    K: VariableKey,
    F: FnMut(&Assignment),
{
    let config = EnumeratorConfig::load(DEFAULT_CONFIG_FILE).unwrap_or_default();
    enumerate_with_config(model, &config, consumer)
}

/// Enumerates every solution of `model` with an explicit configuration.
///
/// An invalid configuration is logged and replaced by the defaults.
pub fn enumerate_with_config<K, F>(
    model: &mut Model<K>,
    config: &EnumeratorConfig,
    consumer: F,
) -> EnumerationReport
where
    K: VariableKey,
    F: FnMut(&Assignment),
{
    init_console();
    let mut enumerator = build_enumerator(config);
    enumerator.enumerate(model, consumer)
}

/// Enumerates every solution of `model`, streaming them through `sender`.
///
/// The report is returned once the run has ended. Dropping the receiver does
/// not stop the run.
pub fn enumerate_to_channel<K: VariableKey>(
    model: &mut Model<K>,
    config: &EnumeratorConfig,
    sender: mpsc::UnboundedSender<Assignment>,
) -> EnumerationReport {
    init_console();
    let mut enumerator = build_enumerator(config);
    enumerator.enumerate_with_channel(model, sender)
}

fn build_enumerator(config: &EnumeratorConfig) -> Enumerator<AnyOracle, ConfiguredTermination> {
    match config.validate() {
        Ok(()) => Enumerator::from_config(config),
        Err(e) => {
            warn!(event = "invalid_config", error = %e);
            Enumerator::from_config(&EnumeratorConfig::default())
        }
    }
}

fn init_console() {
    #[cfg(feature = "console")]
    enumforge_console::init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use enumforge_test::{count_feasible, latin_square, mini_sudoku};

    #[test]
    fn test_enumerate_with_default_config() {
        let mut model = mini_sudoku();
        let mut found = Vec::new();
        let report =
            enumerate_with_config(&mut model, &EnumeratorConfig::default(), |a| {
                found.push(a.clone())
            });

        assert!(report.is_done());
        assert_eq!(found.len(), 2);
        assert_ne!(found[0], found[1]);
        assert_eq!(model.cuts().len(), 2);
    }

    #[test]
    fn test_enumerate_with_solution_limit() {
        let mut model = latin_square(3);
        let config = EnumeratorConfig::new().with_solution_limit(4);
        let mut count = 0;
        let report = enumerate_with_config(&mut model, &config, |_| count += 1);

        assert!(report.is_terminated());
        assert_eq!(count, 4);
        assert_eq!(report.solution_count(), 4);
    }

    #[test]
    fn test_enumerate_all_finds_every_solution() {
        let mut model = latin_square(3);
        let expected = count_feasible(&model) as u64;
        let report = enumerate_all(&mut model, |a| assert_eq!(a.len(), 27));
        assert_eq!(report.solution_count(), expected);
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let mut model = mini_sudoku();
        let config = EnumeratorConfig::new().with_solution_limit(0);
        let report = enumerate_with_config(&mut model, &config, |_| {});

        assert!(report.is_done());
        assert_eq!(report.solution_count(), 2);
    }

    #[test]
    fn test_enumerate_to_channel() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let mut model = mini_sudoku();
        let report = enumerate_to_channel(&mut model, &EnumeratorConfig::default(), sender);

        let mut received = Vec::new();
        while let Ok(assignment) = receiver.try_recv() {
            received.push(assignment);
        }
        assert!(report.is_done());
        assert_eq!(received.len(), 2);
    }
}
