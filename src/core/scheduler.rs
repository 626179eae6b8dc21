//! Admission of input records and one worker per transaction
//!
//! This module provides the `Scheduler`, which turns the stream of parsed input
//! records into running workers.
//!
//! # Phases
//!
//! ```text
//! Setup(AccountStore) ──first transaction──▶ Running(Arc<SimulationContext>)
//! ```
//!
//! Account records are only accepted during setup. The first transaction
//! record freezes the store into a shared `SimulationContext`; from then on an
//! account record is a fatal error, because workers may already be reading
//! the store.
//!
//! # Launching
//!
//! Every transaction becomes a `Worker` the moment its line is admitted, so
//! workers race while later lines are still being read. `Scheduler::run`
//! spawns each worker on its own scoped thread and joins all of them before
//! returning; the async strategy drives `accept` itself and spawns workers on
//! the tokio blocking pool. Workers are never cancelled: even when a fatal
//! input error stops admission, the workers already running are joined first.

use super::account_store::AccountStore;
use super::context::SimulationContext;
use super::runner::{Transaction, TransactionReport, TransactionRunner};
use crate::config::SimulationConfig;
use crate::types::{AccountSnapshot, InputRecord, SimulationError};
use std::sync::Arc;
use std::thread;
use tracing::{error, info, warn};

#[derive(Debug)]
enum Phase {
    Setup(AccountStore),
    Running(Arc<SimulationContext>),
}

/// A prepared transaction bound to the context it runs against
#[derive(Debug)]
pub struct Worker {
    runner: TransactionRunner,
    transaction: Transaction,
}

impl Worker {
    /// Transaction identifier, used as the worker's thread name
    pub fn name(&self) -> &str {
        self.transaction.id()
    }

    pub fn run(self) -> TransactionReport {
        self.runner.run(self.transaction)
    }
}

/// Outcome of a complete run, after every worker joined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Final account states in registration order
    pub accounts: Vec<AccountSnapshot>,

    /// One report per joined worker, in launch order
    pub transactions: Vec<TransactionReport>,
}

impl RunReport {
    pub fn applied(&self) -> usize {
        self.transactions.iter().map(|t| t.applied).sum()
    }

    pub fn rejected(&self) -> usize {
        self.transactions.iter().map(|t| t.rejections.len()).sum()
    }

    pub fn account(&self, id: &str) -> Option<&AccountSnapshot> {
        self.accounts.iter().find(|account| account.id == id)
    }
}

#[derive(Debug)]
pub struct Scheduler {
    phase: Phase,
    config: SimulationConfig,
}

impl Scheduler {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            phase: Phase::Setup(AccountStore::new()),
            config,
        }
    }

    /// Admit one parsed record
    ///
    /// Returns the worker to launch for a transaction record, `None` for an
    /// account record.
    ///
    /// # Errors
    ///
    /// - `DuplicateAccount` for an account id seen before
    /// - `AccountAfterLaunch` for an account record once workers are running
    /// - `UnknownAccount` for a transaction naming an unregistered account
    pub fn admit(&mut self, record: InputRecord) -> Result<Option<Worker>, SimulationError> {
        match record {
            InputRecord::Account(spec) => match &mut self.phase {
                Phase::Setup(store) => {
                    store.register(spec)?;
                    Ok(None)
                }
                Phase::Running(_) => Err(SimulationError::AccountAfterLaunch { id: spec.id }),
            },
            InputRecord::Transaction(spec) => {
                let context = self.context();
                let transaction = context.prepare(spec)?;
                Ok(Some(Worker {
                    runner: TransactionRunner::new(context),
                    transaction,
                }))
            }
        }
    }

    /// Admit the next reader item, skipping malformed lines
    ///
    /// Recoverable reader errors are logged and yield `Ok(None)`; every other
    /// error is returned for the caller to stop on.
    pub fn accept(
        &mut self,
        record: Result<InputRecord, SimulationError>,
    ) -> Result<Option<Worker>, SimulationError> {
        match record.and_then(|record| self.admit(record)) {
            Err(error) if error.is_recoverable() => {
                warn!(%error, "skipping malformed input line");
                Ok(None)
            }
            other => other,
        }
    }

    /// Freeze the store on first use and hand out the shared context
    fn context(&mut self) -> Arc<SimulationContext> {
        let context = match &mut self.phase {
            Phase::Running(context) => return Arc::clone(context),
            Phase::Setup(store) => Arc::new(SimulationContext::new(
                std::mem::take(store),
                self.config.clone(),
            )),
        };

        info!(accounts = context.store().len(), "account setup complete");
        self.phase = Phase::Running(Arc::clone(&context));
        context
    }

    /// Launch one scoped thread per transaction and join them all
    ///
    /// # Errors
    ///
    /// Returns the first fatal error from `records` (or from spawning a
    /// thread) after every worker launched so far has been joined.
    pub fn run<I>(mut self, records: I) -> Result<RunReport, SimulationError>
    where
        I: IntoIterator<Item = Result<InputRecord, SimulationError>>,
    {
        let (reports, fatal) = thread::scope(|scope| {
            let mut handles = Vec::new();
            let mut fatal = None;

            for record in records {
                let worker = match self.accept(record) {
                    Ok(Some(worker)) => worker,
                    Ok(None) => continue,
                    Err(error) => {
                        fatal = Some(error);
                        break;
                    }
                };

                let spawned = thread::Builder::new()
                    .name(worker.name().to_string())
                    .spawn_scoped(scope, move || worker.run());
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        fatal = Some(SimulationError::runtime(format!(
                            "failed to spawn worker thread: {}",
                            e
                        )));
                        break;
                    }
                }
            }

            let reports = handles
                .into_iter()
                .filter_map(|handle| match handle.join() {
                    Ok(report) => Some(report),
                    Err(_) => {
                        error!("worker thread panicked");
                        None
                    }
                })
                .collect::<Vec<_>>();

            (reports, fatal)
        });

        if let Some(error) = fatal {
            return Err(error);
        }
        Ok(self.finish(reports))
    }

    /// Collect final account states once every worker has been joined
    pub fn finish(self, transactions: Vec<TransactionReport>) -> RunReport {
        let accounts = match &self.phase {
            Phase::Setup(store) => store.snapshots(),
            Phase::Running(context) => context.store().snapshots(),
        };

        let report = RunReport {
            accounts,
            transactions,
        };
        info!(
            transactions = report.transactions.len(),
            applied = report.applied(),
            rejected = report.rejected(),
            "all workers joined"
        );
        report
    }
}
