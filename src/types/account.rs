//! Account-related types for the bank simulator
//!
//! This module defines the records the input collaborator produces for each
//! account line and the snapshot handed back for reporting after the run.

/// Monetary amount in the smallest currency unit
///
/// Balances are signed (overdraft-protected accounts may go negative down to
/// the configured floor); job amounts are always non-negative.
pub type Amount = i64;

/// Fees charged by an account
///
/// Every field defaults to zero when the input line omits it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeSchedule {
    /// Flat fee taken from every fee-bearing deposit
    pub deposit: Amount,

    /// Flat fee added to the cost of every withdrawal
    pub withdrawal: Amount,

    /// Flat fee charged to both the sending and the receiving side of a transfer
    pub transfer: Amount,

    /// Number of transactions an account may make before `transaction` fees apply
    ///
    /// The extra fee applies once the counter is strictly greater than this value.
    pub threshold: u32,

    /// Extra fee charged per operation once the threshold has been exceeded
    pub transaction: Amount,
}

impl FeeSchedule {
    /// Extra per-operation fee owed by an account that has made `transactions` operations
    pub fn transaction_fee(&self, transactions: u32) -> Amount {
        if transactions > self.threshold {
            self.transaction
        } else {
            0
        }
    }
}

/// Whether an account may go negative, and at what price
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverdraftPolicy {
    /// Withdrawals and transfers are rejected on insufficient funds
    #[default]
    Unprotected,

    /// Shortfalls are covered down to the overdraft floor
    Protected {
        /// Fee per started overdraft unit of the withdrawn amount
        fee_per_unit: Amount,
    },
}

/// Account definition as produced by the input collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSpec {
    /// Short unique identifier, e.g. `a1`
    pub id: String,

    /// Free-form type label, e.g. `business`
    pub kind: String,

    pub fees: FeeSchedule,

    pub overdraft: OverdraftPolicy,
}

impl AccountSpec {
    /// Account with no fees and no overdraft protection
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            fees: FeeSchedule::default(),
            overdraft: OverdraftPolicy::Unprotected,
        }
    }

    pub fn with_fees(mut self, fees: FeeSchedule) -> Self {
        self.fees = fees;
        self
    }

    pub fn with_overdraft(mut self, fee_per_unit: Amount) -> Self {
        self.overdraft = OverdraftPolicy::Protected { fee_per_unit };
        self
    }
}

/// Final state of one account, in registration order, for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    pub id: String,
    pub kind: String,
    pub balance: Amount,
    pub transactions: u32,
}
