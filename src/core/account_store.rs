//! Account registry with one lock per account
//!
//! This module provides the `AccountStore`, which owns every account of a run.
//!
//! # Design
//!
//! The store is populated during single-threaded setup (`register` takes
//! `&mut self`) and is then shared read-only by all workers. Structural
//! mutation is therefore impossible once workers run; only the balance and
//! transaction counter of an account change, and only while that account's
//! own mutex is held.
//!
//! Accounts live in a `Vec` in registration order, with a `HashMap` index from
//! identifier to position. An `AccountId` is that position, so lookups on the
//! hot path are plain slice indexing.

use crate::types::{AccountSnapshot, AccountSpec, Amount, FeeSchedule, OverdraftPolicy, SimulationError};
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashMap;

/// Handle to an account registered in an `AccountStore`
///
/// Only valid for the store that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(usize);

/// Mutable part of an account, guarded by the account lock
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AccountState {
    pub balance: Amount,

    /// Number of operations that posted against this account
    pub transactions: u32,
}

/// One account: immutable terms plus lock-protected state
#[derive(Debug)]
pub struct Account {
    id: String,
    kind: String,
    fees: FeeSchedule,
    overdraft: OverdraftPolicy,
    state: Mutex<AccountState>,
}

impl Account {
    fn new(spec: AccountSpec) -> Self {
        Self {
            id: spec.id,
            kind: spec.kind,
            fees: spec.fees,
            overdraft: spec.overdraft,
            state: Mutex::new(AccountState::default()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn fees(&self) -> &FeeSchedule {
        &self.fees
    }

    pub fn overdraft(&self) -> OverdraftPolicy {
        self.overdraft
    }

    /// Block until this account's lock is acquired
    ///
    /// The lock is released when the guard is dropped.
    pub fn lock(&self) -> MutexGuard<'_, AccountState> {
        self.state.lock()
    }

    /// Copy of the current state, taken under the lock
    pub fn snapshot(&self) -> AccountSnapshot {
        let state = self.lock();
        AccountSnapshot {
            id: self.id.clone(),
            kind: self.kind.clone(),
            balance: state.balance,
            transactions: state.transactions,
        }
    }
}

/// Registry of all accounts for one run
#[derive(Debug, Default)]
pub struct AccountStore {
    accounts: Vec<Account>,
    index: HashMap<String, AccountId>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account during setup
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::DuplicateAccount` if the identifier is taken.
    pub fn register(&mut self, spec: AccountSpec) -> Result<AccountId, SimulationError> {
        if self.index.contains_key(&spec.id) {
            return Err(SimulationError::DuplicateAccount { id: spec.id });
        }

        let id = AccountId(self.accounts.len());
        self.index.insert(spec.id.clone(), id);
        self.accounts.push(Account::new(spec));
        Ok(id)
    }

    pub fn lookup(&self, id: &str) -> Option<AccountId> {
        self.index.get(id).copied()
    }

    /// Account behind a handle issued by this store
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different store.
    pub fn get(&self, id: AccountId) -> &Account {
        &self.accounts[id.0]
    }

    /// Run `f` with the account's lock held
    ///
    /// The guard is dropped when `f` returns, whichever way it returns.
    pub fn with_lock<R>(&self, id: AccountId, f: impl FnOnce(&Account, &mut AccountState) -> R) -> R {
        let account = self.get(id);
        let mut state = account.lock();
        f(account, &mut state)
    }

    /// Visit every account in registration order
    pub fn for_each(&self, mut visitor: impl FnMut(&Account)) {
        for account in &self.accounts {
            visitor(account);
        }
    }

    /// Snapshot every account in registration order
    pub fn snapshots(&self) -> Vec<AccountSnapshot> {
        let mut snapshots = Vec::with_capacity(self.accounts.len());
        self.for_each(|account| snapshots.push(account.snapshot()));
        snapshots
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
