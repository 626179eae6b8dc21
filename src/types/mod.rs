//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account definitions, fee schedules and snapshots
//! - `transaction`: Transaction definitions, roles and parsed input records
//! - `error`: Error and business rejection types for the simulator

pub mod account;
pub mod error;
pub mod transaction;

pub use account::{AccountSnapshot, AccountSpec, Amount, FeeSchedule, OverdraftPolicy};
pub use error::{Rejection, SimulationError};
pub use transaction::{InputRecord, JobSpec, TransactionRole, TransactionSpec};
