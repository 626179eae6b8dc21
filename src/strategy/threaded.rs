//! Threaded processing strategy
//!
//! Runs every transaction on its own scoped OS thread, named after the
//! transaction. Orchestration only:
//! - input parsing goes to `SyncReader` (iterator interface)
//! - admission, launch and join go to `Scheduler::run`
//! - the report goes to `line_format::write_balances`

use crate::config::SimulationConfig;
use crate::core::{RunReport, Scheduler};
use crate::io::sync_reader::SyncReader;
use crate::strategy::ProcessingStrategy;
use crate::types::SimulationError;
use std::path::Path;
use tracing::info;

/// Threaded processing strategy
///
/// # Examples
///
/// ```no_run
/// use bank_simulator::config::SimulationConfig;
/// use bank_simulator::strategy::{ProcessingStrategy, ThreadedStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = ThreadedStrategy::new(SimulationConfig::default());
/// let mut output = io::stdout();
///
/// strategy.process(Path::new("input.txt"), &mut output)
///     .expect("Simulation failed");
/// ```
#[derive(Debug, Clone)]
pub struct ThreadedStrategy {
    config: SimulationConfig,
}

impl ThreadedStrategy {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for ThreadedStrategy {
    fn simulate(&self, input_path: &Path) -> Result<RunReport, SimulationError> {
        info!(input = %input_path.display(), "starting threaded simulation");

        let reader = SyncReader::new(input_path)?;
        Scheduler::new(self.config.clone()).run(reader)
    }
}
