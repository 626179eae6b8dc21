//! Global ordering for operations that lock two accounts
//!
//! Two workers transferring A→B and B→A would each hold one account lock and
//! wait for the other forever. The `TransferCoordinator` rules this out with a
//! single lock that must be held for the whole of any two-account critical
//! section, acquired before either account lock:
//!
//! ```text
//! coordinator → source account → destination account
//! ```
//!
//! Guards are released in the reverse order. At most one worker can ever be
//! waiting for a second account lock, so no cycle can form. All transfers are
//! serialized against each other; deposits and withdrawals never touch the
//! coordinator and keep running in parallel.

use super::account_store::{Account, AccountState};
use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct TransferCoordinator {
    lock: Mutex<()>,
}

impl TransferCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with the coordinator, `source` and `destination` locks held
    ///
    /// `source` and `destination` must be different accounts: account locks
    /// are not reentrant.
    pub fn lock_pair<R>(
        &self,
        source: &Account,
        destination: &Account,
        f: impl FnOnce(&mut AccountState, &mut AccountState) -> R,
    ) -> R {
        debug_assert!(
            !std::ptr::eq(source, destination),
            "lock_pair called with the same account twice"
        );

        let serial = self.lock.lock();
        let mut source_state = source.lock();
        let mut destination_state = destination.lock();

        let outcome = f(&mut source_state, &mut destination_state);

        drop(destination_state);
        drop(source_state);
        drop(serial);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::account_store::AccountStore;
    use crate::types::AccountSpec;
    use std::sync::Arc;
    use std::thread;

    fn two_accounts() -> Arc<AccountStore> {
        let mut store = AccountStore::new();
        store.register(AccountSpec::new("a1", "personal")).unwrap();
        store.register(AccountSpec::new("a2", "personal")).unwrap();
        Arc::new(store)
    }

    #[test]
    fn test_lock_pair_passes_states_in_order() {
        let store = two_accounts();
        let coordinator = TransferCoordinator::new();
        let a1 = store.get(store.lookup("a1").unwrap());
        let a2 = store.get(store.lookup("a2").unwrap());

        coordinator.lock_pair(a1, a2, |source, destination| {
            source.balance -= 10;
            destination.balance += 10;
        });

        assert_eq!(a1.snapshot().balance, -10);
        assert_eq!(a2.snapshot().balance, 10);
    }

    #[test]
    fn test_lock_pair_releases_all_locks() {
        let store = two_accounts();
        let coordinator = TransferCoordinator::new();
        let a1 = store.get(store.lookup("a1").unwrap());
        let a2 = store.get(store.lookup("a2").unwrap());

        coordinator.lock_pair(a1, a2, |_, _| ());

        assert!(coordinator.lock.try_lock().is_some());
        drop(a1.lock());
        drop(a2.lock());
    }

    #[test]
    fn test_opposite_directions_do_not_deadlock() {
        let store = two_accounts();
        let coordinator = Arc::new(TransferCoordinator::new());
        let a1 = store.lookup("a1").unwrap();
        let a2 = store.lookup("a2").unwrap();

        let workers: Vec<_> = [(a1, a2), (a2, a1)]
            .into_iter()
            .map(|(from, to)| {
                let store = Arc::clone(&store);
                let coordinator = Arc::clone(&coordinator);
                thread::spawn(move || {
                    for _ in 0..2000 {
                        coordinator.lock_pair(store.get(from), store.get(to), |source, destination| {
                            source.balance -= 1;
                            destination.balance += 1;
                        });
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(store.get(a1).snapshot().balance, 0);
        assert_eq!(store.get(a2).snapshot().balance, 0);
    }
}
