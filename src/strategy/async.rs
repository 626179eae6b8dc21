//! Asynchronous processing strategy
//!
//! Reads input with csv-async on a tokio multi-threaded runtime and runs every
//! transaction on the tokio blocking pool.
//!
//! # Architecture
//!
//! ```text
//! AsyncStrategy
//!     ├── RuntimeConfig (worker_threads, max_blocking_threads)
//!     ├── AsyncReader (one record at a time)
//!     ├── Scheduler (admission, shared context)
//!     └── spawn_blocking per transaction, joined with join_all
//! ```
//!
//! # Blocking Pool Sizing
//!
//! Workers block on account locks and on the deposit barrier, so they run as
//! blocking tasks, never on the async worker threads. The blocking pool runs
//! queued tasks in spawn order. A client is admitted with the count of
//! depositors registered before it and waits for those alone, so every
//! depositor a blocked client depends on is already running or ahead of it in
//! the queue. `max_blocking_threads` bounds how many transactions are live at
//! once; the rest wait in the queue.

use crate::config::SimulationConfig;
use crate::core::{RunReport, Scheduler};
use crate::io::async_reader::AsyncReader;
use crate::strategy::ProcessingStrategy;
use crate::types::SimulationError;
use futures::future::join_all;
use std::io::ErrorKind;
use std::path::Path;
use tokio_util::compat::TokioAsyncReadCompatExt;
use tracing::{error, info, warn};

/// Sizing of the tokio runtime used by the async strategy
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Number of async worker threads driving input
    pub worker_threads: usize,
    /// Upper bound on concurrently running transactions
    pub max_blocking_threads: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: num_cpus::get(),
            max_blocking_threads: 512,
        }
    }
}

impl RuntimeConfig {
    /// Create a new RuntimeConfig, replacing zero values with defaults
    pub fn new(worker_threads: usize, max_blocking_threads: usize) -> Self {
        let default = Self::default();

        let worker_threads = if worker_threads == 0 {
            warn!(
                "Invalid worker_threads ({}), using default ({})",
                worker_threads, default.worker_threads
            );
            default.worker_threads
        } else {
            worker_threads
        };

        let max_blocking_threads = if max_blocking_threads == 0 {
            warn!(
                "Invalid max_blocking_threads ({}), using default ({})",
                max_blocking_threads, default.max_blocking_threads
            );
            default.max_blocking_threads
        } else {
            max_blocking_threads
        };

        Self {
            worker_threads,
            max_blocking_threads,
        }
    }
}

/// Asynchronous processing strategy
#[derive(Debug, Clone)]
pub struct AsyncStrategy {
    config: SimulationConfig,
    runtime: RuntimeConfig,
}

impl AsyncStrategy {
    pub fn new(config: SimulationConfig, runtime: RuntimeConfig) -> Self {
        Self { config, runtime }
    }
}

impl ProcessingStrategy for AsyncStrategy {
    fn simulate(&self, input_path: &Path) -> Result<RunReport, SimulationError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.runtime.worker_threads)
            .max_blocking_threads(self.runtime.max_blocking_threads)
            .thread_name("simulator-runtime")
            .build()
            .map_err(|e| SimulationError::runtime(format!("Failed to create tokio runtime: {}", e)))?;

        info!(
            input = %input_path.display(),
            worker_threads = self.runtime.worker_threads,
            max_blocking_threads = self.runtime.max_blocking_threads,
            "starting async simulation"
        );

        runtime.block_on(async {
            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| match e.kind() {
                    ErrorKind::NotFound => SimulationError::FileNotFound {
                        path: input_path.display().to_string(),
                    },
                    _ => SimulationError::IoError {
                        message: format!("Failed to open file '{}': {}", input_path.display(), e),
                    },
                })?;

            // Wrap tokio file in a compatibility layer for csv-async
            let mut reader = AsyncReader::new(file.compat());
            let mut scheduler = Scheduler::new(self.config.clone());
            let mut handles = Vec::new();
            let mut fatal = None;

            while let Some(record) = reader.next_record().await {
                match scheduler.accept(record) {
                    Ok(Some(worker)) => {
                        handles.push(tokio::task::spawn_blocking(move || worker.run()));
                    }
                    Ok(None) => {}
                    Err(e) => {
                        fatal = Some(e);
                        break;
                    }
                }
            }

            let reports = join_all(handles)
                .await
                .into_iter()
                .filter_map(|joined| match joined {
                    Ok(report) => Some(report),
                    Err(e) => {
                        error!(error = %e, "worker task panicked");
                        None
                    }
                })
                .collect();

            match fatal {
                Some(e) => Err(e),
                None => Ok(scheduler.finish(reports)),
            }
        })
    }
}
