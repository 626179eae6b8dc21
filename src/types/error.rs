//! Error types for the bank simulator
//!
//! This module defines everything that can go wrong while reading input and
//! driving the simulation, plus the business rejections a job can end in.
//!
//! # Error Categories
//!
//! - **File I/O Errors**: File not found, permission denied, etc.
//! - **Input Errors**: Malformed lines (recoverable) and broken references (fatal)
//! - **Setup Errors**: Configuration and runtime construction failures
//! - **Rejections**: Insufficient funds or overdraft limit; never errors of the run

use super::account::Amount;
use thiserror::Error;

/// Main error type for the simulator
///
/// Recoverable variants describe a single malformed input line: the line is
/// logged and skipped. Every other variant stops the run once the workers that
/// are already running have been joined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// Input line could not be tokenized or is structurally incomplete
    #[error("Parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// Amount is not a non-negative integer
    #[error("Invalid amount '{amount}' at line {line}")]
    InvalidAmount {
        /// The invalid amount string
        amount: String,
        line: u64,
    },

    /// Job token is none of `d`, `w`, `t`
    #[error("Unknown job kind '{kind}' at line {line}")]
    UnknownJobKind { kind: String, line: u64 },

    /// Job token is not followed by all of its operands
    #[error("Incomplete '{kind}' job at line {line}")]
    IncompleteJob { kind: String, line: u64 },

    /// Transaction references an account that was never registered
    #[error("Transaction {transaction} references unknown account {account}")]
    UnknownAccount {
        transaction: String,
        account: String,
    },

    /// Two account lines share one identifier
    #[error("Account {id} is already registered")]
    DuplicateAccount { id: String },

    /// Account line appeared after workers started running
    #[error("Account {id} defined after transactions were launched")]
    AccountAfterLaunch { id: String },

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Worker runtime could not be created or a worker panicked
    #[error("Runtime error: {message}")]
    RuntimeError { message: String },
}

impl SimulationError {
    /// Whether the run may skip the offending line and carry on
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SimulationError::ParseError { .. }
                | SimulationError::InvalidAmount { .. }
                | SimulationError::UnknownJobKind { .. }
                | SimulationError::IncompleteJob { .. }
        )
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: &str, line: u64) -> Self {
        SimulationError::InvalidAmount {
            amount: amount.to_string(),
            line,
        }
    }

    /// Create an UnknownJobKind error
    pub fn unknown_job_kind(kind: &str, line: u64) -> Self {
        SimulationError::UnknownJobKind {
            kind: kind.to_string(),
            line,
        }
    }

    /// Create an IncompleteJob error
    pub fn incomplete_job(kind: &str, line: u64) -> Self {
        SimulationError::IncompleteJob {
            kind: kind.to_string(),
            line,
        }
    }

    /// Create an UnknownAccount error
    pub fn unknown_account(transaction: &str, account: &str) -> Self {
        SimulationError::UnknownAccount {
            transaction: transaction.to_string(),
            account: account.to_string(),
        }
    }

    /// Create a ParseError error
    pub fn parse(line: Option<u64>, message: impl Into<String>) -> Self {
        SimulationError::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create a RuntimeError error
    pub fn runtime(message: impl Into<String>) -> Self {
        SimulationError::RuntimeError {
            message: message.into(),
        }
    }
}

// Conversion from io::Error to SimulationError
impl From<std::io::Error> for SimulationError {
    fn from(error: std::io::Error) -> Self {
        SimulationError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to SimulationError
impl From<csv::Error> for SimulationError {
    fn from(error: csv::Error) -> Self {
        if let csv::ErrorKind::Io(io_error) = error.kind() {
            return SimulationError::IoError {
                message: io_error.to_string(),
            };
        }

        SimulationError::ParseError {
            line: error.position().map(|pos| pos.line()),
            message: error.to_string(),
        }
    }
}

impl From<csv_async::Error> for SimulationError {
    fn from(error: csv_async::Error) -> Self {
        if let csv_async::ErrorKind::Io(io_error) = error.kind() {
            return SimulationError::IoError {
                message: io_error.to_string(),
            };
        }

        SimulationError::ParseError {
            line: None,
            message: error.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for SimulationError {
    fn from(error: serde_yaml::Error) -> Self {
        SimulationError::ConfigError {
            message: error.to_string(),
        }
    }
}

/// Why a job left its accounts untouched
///
/// Rejections are outcomes, not failures: the worker logs them and moves on
/// to its next job.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Balance does not cover the amount plus fees and the account has no overdraft protection
    #[error("Insufficient funds in account {account}: balance {balance}, required {required}")]
    InsufficientFunds {
        account: String,
        balance: Amount,
        required: Amount,
    },

    /// Covering the shortfall would push the balance below the overdraft floor
    #[error("Overdraft limit exceeded for account {account}: balance {balance}, required {required}, floor {floor}")]
    OverdraftLimitExceeded {
        account: String,
        balance: Amount,
        required: Amount,
        floor: Amount,
    },

    /// Source and destination of a transfer are the same account
    #[error("Account {account} cannot transfer to itself")]
    SelfTransfer { account: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::file_not_found(
        SimulationError::FileNotFound { path: "input.txt".to_string() },
        "File not found: input.txt"
    )]
    #[case::parse_error_with_line(
        SimulationError::parse(Some(4), "missing account type"),
        "Parse error at line 4: missing account type"
    )]
    #[case::parse_error_without_line(
        SimulationError::parse(None, "unterminated quote"),
        "Parse error: unterminated quote"
    )]
    #[case::invalid_amount(
        SimulationError::invalid_amount("12x", 3),
        "Invalid amount '12x' at line 3"
    )]
    #[case::unknown_account(
        SimulationError::unknown_account("c1", "a9"),
        "Transaction c1 references unknown account a9"
    )]
    #[case::account_after_launch(
        SimulationError::AccountAfterLaunch { id: "a3".to_string() },
        "Account a3 defined after transactions were launched"
    )]
    fn test_error_display(#[case] error: SimulationError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::parse(SimulationError::parse(Some(1), "bad"), true)]
    #[case::invalid_amount(SimulationError::invalid_amount("-5", 1), true)]
    #[case::unknown_job(SimulationError::unknown_job_kind("x", 1), true)]
    #[case::incomplete_job(SimulationError::incomplete_job("t", 1), true)]
    #[case::unknown_account(SimulationError::unknown_account("c1", "a9"), false)]
    #[case::duplicate(SimulationError::DuplicateAccount { id: "a1".to_string() }, false)]
    #[case::runtime(SimulationError::runtime("worker panicked"), false)]
    fn test_is_recoverable(#[case] error: SimulationError, #[case] expected: bool) {
        assert_eq!(error.is_recoverable(), expected);
    }

    #[rstest]
    #[case::insufficient(
        Rejection::InsufficientFunds { account: "a1".to_string(), balance: 100, required: 150 },
        "Insufficient funds in account a1: balance 100, required 150"
    )]
    #[case::overdraft(
        Rejection::OverdraftLimitExceeded { account: "a2".to_string(), balance: -4900, required: 300, floor: -5000 },
        "Overdraft limit exceeded for account a2: balance -4900, required 300, floor -5000"
    )]
    #[case::self_transfer(
        Rejection::SelfTransfer { account: "a3".to_string() },
        "Account a3 cannot transfer to itself"
    )]
    fn test_rejection_display(#[case] rejection: Rejection, #[case] expected: &str) {
        assert_eq!(rejection.to_string(), expected);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: SimulationError = io_error.into();
        assert!(matches!(error, SimulationError::IoError { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }
}
