//! Bank Simulator Library
//! # Overview
//!
//! This library simulates a bank whose customers run transactions
//! concurrently against shared accounts, with a threaded and an async strategy
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (account and transaction specs, errors)
//! - [`cli`] - CLI arguments parsing
//! - [`config`] - Simulation rules loaded from YAML
//! - [`core`] - Simulation components:
//!   - [`core::account_store`] - Accounts, each behind its own lock
//!   - [`core::coordinator`] - Lock ordering for transfers
//!   - [`core::barrier`] - Clients wait for depositors
//!   - [`core::runner`] - Job execution with fees and overdraft
//!   - [`core::scheduler`] - One worker per transaction
//! - [`io`] - Input parsing and the balance report
//! - [`strategy`] - Threaded and async worker runtimes
//!
//! # Jobs
//!
//! A transaction is an ordered list of jobs:
//!
//! - **Deposit**: Credit an account, minus its deposit fee for fee-paying roles
//! - **Withdraw**: Debit an account plus its withdrawal fee
//! - **Transfer**: Move funds between two accounts atomically
//!
//! Past an account's transaction threshold every job pays an extra fee.
//! Overdraft-protected accounts may go negative down to the configured floor
//! and pay a surcharge per started overdraft unit.
//!
//! # Roles
//!
//! The first character of a transaction id picks its role: `d` depositors run
//! first, `c` clients wait until every earlier depositor has finished, and
//! anything else runs unconstrained.

// Module declarations
pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod logging;
pub mod strategy;
pub mod types;

pub use config::{FeePolicy, SimulationConfig};
pub use core::{RunReport, Scheduler};
pub use io::write_balances;
pub use types::{
    AccountSnapshot, AccountSpec, Amount, FeeSchedule, InputRecord, JobSpec, OverdraftPolicy,
    Rejection, SimulationError, TransactionRole, TransactionSpec,
};
