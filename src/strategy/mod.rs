//! Processing strategy module for simulation runs
//!
//! This module defines the Strategy pattern for complete simulation pipelines,
//! covering input parsing, worker launch and the balance report. This allows
//! different worker runtimes (scoped OS threads, tokio blocking pool) to be
//! selected at runtime.

use crate::cli::StrategyType;
use crate::config::SimulationConfig;
use crate::core::RunReport;
use crate::io::write_balances;
use crate::types::SimulationError;
use std::io::Write;
use std::path::Path;

pub mod r#async;
pub mod threaded;

pub use self::r#async::{AsyncStrategy, RuntimeConfig};
pub use threaded::ThreadedStrategy;

/// Processing strategy trait for complete simulation pipelines
///
/// Each strategy reads account and transaction lines from a file, launches one
/// worker per transaction as soon as its line is read, and waits for every
/// worker before reporting.
pub trait ProcessingStrategy: Send + Sync {
    /// Run the simulation described by `input_path`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input file cannot be opened or read
    /// - A transaction references an unknown account
    /// - An account is defined twice, or after the first transaction
    /// - The worker runtime cannot be created
    ///
    /// Malformed lines are logged and skipped. Rejected jobs are part of the
    /// report, not errors.
    fn simulate(&self, input_path: &Path) -> Result<RunReport, SimulationError>;

    /// Run the simulation and write final balances to `output`
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the run completed and the report was written
    /// * `Err(String)` if a fatal error occurred
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let report = self.simulate(input_path).map_err(|e| e.to_string())?;
        write_balances(&report.accounts, output)
    }
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The worker runtime to use
/// * `config` - Simulation rules shared by every strategy
/// * `runtime` - Optional tokio runtime sizing (ignored for threaded)
pub fn create_strategy(
    strategy_type: StrategyType,
    config: SimulationConfig,
    runtime: Option<RuntimeConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Threaded => Box::new(ThreadedStrategy::new(config)),
        StrategyType::Async => Box::new(AsyncStrategy::new(config, runtime.unwrap_or_default())),
    }
}
