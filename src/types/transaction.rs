//! Transaction-related types for the bank simulator
//!
//! This module defines the records the input collaborator produces for each
//! transaction line. Account references are still plain identifiers here; the
//! core resolves them against the account store before a worker is launched.

use super::account::{AccountSpec, Amount};
use std::fmt;

/// Role of a transaction, taken from the first character of its identifier
///
/// The role decides whether a transaction is gated by the deposit barrier and
/// which deposit fee rule applies to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionRole {
    /// Must finish before any client starts its jobs (`d…`)
    Depositor,

    /// Waits for every launched depositor before running (`c…`)
    Client,

    /// Neither gated nor gating
    Generic,
}

impl TransactionRole {
    /// Derive the role from a transaction identifier
    pub fn from_id(id: &str) -> Self {
        match id.chars().next() {
            Some('d') => TransactionRole::Depositor,
            Some('c') => TransactionRole::Client,
            _ => TransactionRole::Generic,
        }
    }
}

impl fmt::Display for TransactionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionRole::Depositor => "depositor",
            TransactionRole::Client => "client",
            TransactionRole::Generic => "generic",
        };
        f.write_str(name)
    }
}

/// One operation inside a transaction, with unresolved account identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSpec {
    /// Credit `amount` to `account`
    Deposit { account: String, amount: Amount },

    /// Debit `amount` (plus fees) from `account`
    Withdraw { account: String, amount: Amount },

    /// Move `amount` from `from` to `to`
    Transfer {
        from: String,
        to: String,
        amount: Amount,
    },
}

/// Transaction definition as produced by the input collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSpec {
    pub id: String,
    pub role: TransactionRole,

    /// Jobs in the order they must execute
    pub jobs: Vec<JobSpec>,
}

impl TransactionSpec {
    /// Create a transaction whose role is derived from its identifier
    pub fn new(id: impl Into<String>, jobs: Vec<JobSpec>) -> Self {
        let id = id.into();
        let role = TransactionRole::from_id(&id);
        Self { id, role, jobs }
    }
}

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputRecord {
    Account(AccountSpec),
    Transaction(TransactionSpec),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::depositor("d1", TransactionRole::Depositor)]
    #[case::client("c12", TransactionRole::Client)]
    #[case::generic("x7", TransactionRole::Generic)]
    #[case::empty("", TransactionRole::Generic)]
    fn test_role_from_id(#[case] id: &str, #[case] expected: TransactionRole) {
        assert_eq!(TransactionRole::from_id(id), expected);
    }

    #[test]
    fn test_transaction_spec_derives_role() {
        let spec = TransactionSpec::new(
            "c1",
            vec![JobSpec::Withdraw {
                account: "a1".to_string(),
                amount: 200,
            }],
        );

        assert_eq!(spec.role, TransactionRole::Client);
        assert_eq!(spec.jobs.len(), 1);
    }
}
