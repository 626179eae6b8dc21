//! Shared state of one simulation run
//!
//! `SimulationContext` owns everything workers share: the account store, the
//! transfer coordinator, the deposit barrier and the rules in force. It is
//! built once setup is complete and handed to workers behind an `Arc`.

use super::account_store::AccountStore;
use super::barrier::DepositBarrier;
use super::coordinator::TransferCoordinator;
use super::runner::{Job, Transaction};
use crate::config::SimulationConfig;
use crate::types::{JobSpec, SimulationError, TransactionRole, TransactionSpec};
use std::sync::Arc;

#[derive(Debug)]
pub struct SimulationContext {
    store: AccountStore,
    coordinator: TransferCoordinator,
    barrier: Arc<DepositBarrier>,
    config: SimulationConfig,
}

impl SimulationContext {
    pub fn new(store: AccountStore, config: SimulationConfig) -> Self {
        Self {
            store,
            coordinator: TransferCoordinator::new(),
            barrier: Arc::new(DepositBarrier::new()),
            config,
        }
    }

    pub fn store(&self) -> &AccountStore {
        &self.store
    }

    pub fn coordinator(&self) -> &TransferCoordinator {
        &self.coordinator
    }

    pub fn barrier(&self) -> &DepositBarrier {
        &self.barrier
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Resolve a transaction's account references and ready it for launch
    ///
    /// A depositor is registered with the barrier here, so clients prepared
    /// afterwards will wait for it. The registration is released when the
    /// returned transaction finishes running, or when it is dropped. A client
    /// records how many depositors were registered at this point and waits
    /// for exactly those.
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::UnknownAccount` for the first job that names
    /// an account missing from the store. Nothing is registered in that case.
    pub fn prepare(&self, spec: TransactionSpec) -> Result<Transaction, SimulationError> {
        let resolve = |account: &str| {
            self.store
                .lookup(account)
                .ok_or_else(|| SimulationError::unknown_account(&spec.id, account))
        };

        let jobs = spec
            .jobs
            .iter()
            .map(|job| -> Result<Job, SimulationError> {
                Ok(match job {
                    JobSpec::Deposit { account, amount } => Job::Deposit {
                        account: resolve(account)?,
                        amount: *amount,
                    },
                    JobSpec::Withdraw { account, amount } => Job::Withdraw {
                        account: resolve(account)?,
                        amount: *amount,
                    },
                    JobSpec::Transfer { from, to, amount } => Job::Transfer {
                        from: resolve(from)?,
                        to: resolve(to)?,
                        amount: *amount,
                    },
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (ticket, depositors_ahead) = match spec.role {
            TransactionRole::Depositor => (Some(self.barrier.ticket()), None),
            TransactionRole::Client => (None, Some(self.barrier.launched())),
            TransactionRole::Generic => (None, None),
        };

        Ok(Transaction::new(spec.id, spec.role, jobs, ticket, depositors_ahead))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AccountSpec;

    fn context() -> SimulationContext {
        let mut store = AccountStore::new();
        store.register(AccountSpec::new("a1", "personal")).unwrap();
        store.register(AccountSpec::new("a2", "business")).unwrap();
        SimulationContext::new(store, SimulationConfig::default())
    }

    #[test]
    fn test_prepare_resolves_jobs_in_order() {
        let context = context();
        let spec = TransactionSpec::new(
            "c1",
            vec![
                JobSpec::Deposit {
                    account: "a1".to_string(),
                    amount: 10,
                },
                JobSpec::Transfer {
                    from: "a1".to_string(),
                    to: "a2".to_string(),
                    amount: 5,
                },
            ],
        );

        let transaction = context.prepare(spec).unwrap();
        let a1 = context.store().lookup("a1").unwrap();
        let a2 = context.store().lookup("a2").unwrap();

        assert_eq!(transaction.id(), "c1");
        assert_eq!(
            transaction.jobs(),
            &[
                Job::Deposit {
                    account: a1,
                    amount: 10
                },
                Job::Transfer {
                    from: a1,
                    to: a2,
                    amount: 5
                },
            ]
        );
    }

    #[test]
    fn test_prepare_fails_on_unknown_account() {
        let context = context();
        let spec = TransactionSpec::new(
            "d1",
            vec![JobSpec::Deposit {
                account: "a9".to_string(),
                amount: 10,
            }],
        );

        let result = context.prepare(spec);

        assert_eq!(
            result.unwrap_err(),
            SimulationError::unknown_account("d1", "a9")
        );
        assert_eq!(context.barrier().launched(), 0);
    }

    #[test]
    fn test_prepare_registers_only_depositors() {
        let context = context();

        let depositor = context.prepare(TransactionSpec::new("d1", vec![])).unwrap();
        let _client = context.prepare(TransactionSpec::new("c1", vec![])).unwrap();
        let _generic = context.prepare(TransactionSpec::new("x1", vec![])).unwrap();

        assert_eq!(context.barrier().launched(), 1);
        drop(depositor);
        assert!(context.barrier().is_released());
    }

    #[test]
    fn test_prepare_snapshots_depositors_ahead_of_client() {
        let context = context();

        let early = context.prepare(TransactionSpec::new("c0", vec![])).unwrap();
        let _d1 = context.prepare(TransactionSpec::new("d1", vec![])).unwrap();
        let late = context.prepare(TransactionSpec::new("c1", vec![])).unwrap();
        let _d2 = context.prepare(TransactionSpec::new("d2", vec![])).unwrap();
        let generic = context.prepare(TransactionSpec::new("x1", vec![])).unwrap();

        assert_eq!(early.depositors_ahead(), Some(0));
        assert_eq!(late.depositors_ahead(), Some(1));
        assert_eq!(generic.depositors_ahead(), None);
    }
}
