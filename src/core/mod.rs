//! Core simulation logic
//!
//! This module contains the concurrent banking components:
//! - `account_store` - Registered accounts, each behind its own lock
//! - `coordinator` - Global lock ordering for two-account operations
//! - `barrier` - Depositor/client gate
//! - `context` - Shared state handed to every worker
//! - `runner` - Job execution, fees and overdraft rules
//! - `scheduler` - Record admission and one worker per transaction

pub mod account_store;
pub mod barrier;
pub mod context;
pub mod coordinator;
pub mod runner;
pub mod scheduler;

pub use account_store::{Account, AccountId, AccountState, AccountStore};
pub use barrier::{DepositBarrier, DepositorTicket};
pub use context::SimulationContext;
pub use coordinator::TransferCoordinator;
pub use runner::{Job, Transaction, TransactionReport, TransactionRunner};
pub use scheduler::{RunReport, Scheduler, Worker};
