//! Execution of one transaction's job queue
//!
//! This module provides the `TransactionRunner`, which executes a prepared
//! `Transaction` against the shared `SimulationContext`.
//!
//! # Execution Order
//!
//! 1. A client waits on the deposit barrier.
//! 2. Jobs run strictly in order on the calling thread:
//!    - **Deposit**: account lock only; never rejected
//!    - **Withdraw**: account lock only; may be covered by overdraft
//!    - **Transfer**: coordinator, then source, then destination lock
//! 3. A depositor arrives at the barrier.
//!
//! # Fees
//!
//! Fees are evaluated on the transaction counter as it stands before the job
//! posts. The per-transaction fee applies once the counter is strictly above
//! the account's threshold. Deposit fees are charged only to roles enabled in
//! the `FeePolicy`; withdrawal and transfer fees apply to every role.
//!
//! # Overdraft
//!
//! When the balance does not cover `amount + fees`, an overdraft-protected
//! account pays a surcharge of `(amount / unit + 1) * fee_per_unit` and the job
//! posts only if the resulting balance stays at or above the floor. A rejected
//! job leaves balance and counter untouched.

use super::account_store::{Account, AccountId, AccountState};
use super::barrier::DepositorTicket;
use super::context::SimulationContext;
use crate::config::SimulationConfig;
use crate::types::{Amount, OverdraftPolicy, Rejection, TransactionRole};
use std::sync::Arc;
use tracing::{debug, info, info_span, warn};

/// One operation with resolved account handles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    Deposit {
        account: AccountId,
        amount: Amount,
    },
    Withdraw {
        account: AccountId,
        amount: Amount,
    },
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: Amount,
    },
}

/// A transaction ready to run on a single worker
///
/// Built by `SimulationContext::prepare`. A depositor carries the ticket it
/// must hand back to the deposit barrier when it is done. A client carries
/// the number of depositors registered ahead of it.
#[derive(Debug)]
pub struct Transaction {
    id: String,
    role: TransactionRole,
    jobs: Vec<Job>,
    ticket: Option<DepositorTicket>,
    depositors_ahead: Option<usize>,
}

impl Transaction {
    pub(crate) fn new(
        id: String,
        role: TransactionRole,
        jobs: Vec<Job>,
        ticket: Option<DepositorTicket>,
        depositors_ahead: Option<usize>,
    ) -> Self {
        Self {
            id,
            role,
            jobs,
            ticket,
            depositors_ahead,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Depositors this transaction waits for, set for clients only
    pub fn depositors_ahead(&self) -> Option<usize> {
        self.depositors_ahead
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }
}

/// What happened to the jobs of one transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReport {
    pub id: String,
    pub role: TransactionRole,

    /// Number of jobs that posted
    pub applied: usize,

    /// Jobs that left their accounts untouched, in execution order
    pub rejections: Vec<Rejection>,
}

/// How a debit is funded
enum Coverage {
    /// The balance covers the full cost
    Funded { debit: Amount },

    /// The overdraft covers the shortfall; `debit` includes the surcharge
    Overdrawn { debit: Amount },
}

impl Coverage {
    fn debit(&self) -> Amount {
        match self {
            Coverage::Funded { debit } | Coverage::Overdrawn { debit } => *debit,
        }
    }
}

/// Decide whether `account` can pay `amount` plus `fees` from its current state
fn cover(
    account: &Account,
    state: &AccountState,
    amount: Amount,
    fees: Amount,
    config: &SimulationConfig,
) -> Result<Coverage, Rejection> {
    let cost = amount + fees;
    if state.balance >= cost {
        return Ok(Coverage::Funded { debit: cost });
    }

    match account.overdraft() {
        OverdraftPolicy::Protected { fee_per_unit } => {
            let units = config.overdraft_units(amount);
            let required = cost + units * fee_per_unit;
            debug!(
                account = account.id(),
                units,
                surcharge = units * fee_per_unit,
                "overdraft surcharge"
            );

            if state.balance - required >= config.overdraft_floor {
                Ok(Coverage::Overdrawn { debit: required })
            } else {
                Err(Rejection::OverdraftLimitExceeded {
                    account: account.id().to_string(),
                    balance: state.balance,
                    required,
                    floor: config.overdraft_floor,
                })
            }
        }
        OverdraftPolicy::Unprotected => Err(Rejection::InsufficientFunds {
            account: account.id().to_string(),
            balance: state.balance,
            required: cost,
        }),
    }
}

/// Post a deposit; fees only when `charge_fees` is set
fn apply_deposit(
    account: &Account,
    state: &mut AccountState,
    amount: Amount,
    charge_fees: bool,
) {
    let fees = if charge_fees {
        account.fees().deposit + account.fees().transaction_fee(state.transactions)
    } else {
        0
    };

    state.balance += amount - fees;
    state.transactions += 1;
}

/// Post a withdrawal, or reject it without touching `state`
fn apply_withdrawal(
    account: &Account,
    state: &mut AccountState,
    amount: Amount,
    config: &SimulationConfig,
) -> Result<(), Rejection> {
    let fees = account.fees().withdrawal + account.fees().transaction_fee(state.transactions);
    let coverage = cover(account, state, amount, fees, config)?;

    state.balance -= coverage.debit();
    state.transactions += 1;
    Ok(())
}

/// Post a transfer, or reject it without touching either state
///
/// Both sides' fees are computed from the counters as they were before the
/// transfer. On the overdraft path only the sender is debited unless
/// `credit_receiver_on_overdraft` is set.
fn apply_transfer(
    sender: &Account,
    sender_state: &mut AccountState,
    receiver: &Account,
    receiver_state: &mut AccountState,
    amount: Amount,
    config: &SimulationConfig,
) -> Result<(), Rejection> {
    let sender_fees =
        sender.fees().transfer + sender.fees().transaction_fee(sender_state.transactions);
    let receiver_fees =
        receiver.fees().transfer + receiver.fees().transaction_fee(receiver_state.transactions);

    let coverage = cover(sender, sender_state, amount, sender_fees, config)?;
    let credit_receiver = match coverage {
        Coverage::Funded { .. } => true,
        Coverage::Overdrawn { .. } => config.credit_receiver_on_overdraft,
    };

    sender_state.balance -= coverage.debit();
    sender_state.transactions += 1;

    if credit_receiver {
        receiver_state.balance += amount - receiver_fees;
        receiver_state.transactions += 1;
    }
    Ok(())
}

/// Executes transactions against a shared context
#[derive(Debug, Clone)]
pub struct TransactionRunner {
    context: Arc<SimulationContext>,
}

impl TransactionRunner {
    pub fn new(context: Arc<SimulationContext>) -> Self {
        Self { context }
    }

    /// Run every job of `transaction` in order, honouring the barrier
    ///
    /// Rejected jobs are logged and recorded in the report; the remaining
    /// jobs still run.
    pub fn run(&self, mut transaction: Transaction) -> TransactionReport {
        let span = info_span!("transaction", id = %transaction.id, role = %transaction.role);
        let _entered = span.enter();

        if let Some(depositors) = transaction.depositors_ahead {
            self.context.barrier().wait_for_depositors(depositors);
        }
        debug!("running");

        let mut report = TransactionReport {
            id: transaction.id.clone(),
            role: transaction.role,
            applied: 0,
            rejections: Vec::new(),
        };

        for job in &transaction.jobs {
            match self.execute(transaction.role, job) {
                Ok(()) => report.applied += 1,
                Err(rejection) => {
                    warn!(%rejection, "job rejected");
                    report.rejections.push(rejection);
                }
            }
        }

        if let Some(ticket) = transaction.ticket.take() {
            ticket.arrive();
        }
        debug!(
            applied = report.applied,
            rejected = report.rejections.len(),
            "finished"
        );

        report
    }

    /// Execute a single job for a transaction of the given role
    pub fn execute(&self, role: TransactionRole, job: &Job) -> Result<(), Rejection> {
        match *job {
            Job::Deposit { account, amount } => {
                self.deposit(account, amount, role);
                Ok(())
            }
            Job::Withdraw { account, amount } => self.withdraw(account, amount),
            Job::Transfer { from, to, amount } => self.transfer(from, to, amount),
        }
    }

    fn deposit(&self, id: AccountId, amount: Amount, role: TransactionRole) {
        let charge_fees = self.context.config().fee_policy.charges_deposit_fees(role);

        self.context.store().with_lock(id, |account, state| {
            let starting = state.balance;
            apply_deposit(account, state, amount, charge_fees);
            info!(
                account = account.id(),
                amount,
                starting,
                ending = state.balance,
                "deposit"
            );
        });
    }

    fn withdraw(&self, id: AccountId, amount: Amount) -> Result<(), Rejection> {
        let config = self.context.config();

        self.context
            .store()
            .with_lock(id, |account, state| -> Result<(), Rejection> {
                let starting = state.balance;
                apply_withdrawal(account, state, amount, config)?;
                info!(
                    account = account.id(),
                    amount,
                    starting,
                    ending = state.balance,
                    "withdrawal"
                );
                Ok(())
            })
    }

    fn transfer(&self, from: AccountId, to: AccountId, amount: Amount) -> Result<(), Rejection> {
        let store = self.context.store();
        let sender = store.get(from);
        let receiver = store.get(to);

        if from == to {
            return Err(Rejection::SelfTransfer {
                account: sender.id().to_string(),
            });
        }

        let config = self.context.config();
        self.context.coordinator().lock_pair(
            sender,
            receiver,
            |sender_state, receiver_state| -> Result<(), Rejection> {
                let (sender_starting, receiver_starting) =
                    (sender_state.balance, receiver_state.balance);
                apply_transfer(
                    sender,
                    sender_state,
                    receiver,
                    receiver_state,
                    amount,
                    config,
                )?;
                info!(
                    from = sender.id(),
                    to = receiver.id(),
                    amount,
                    sender_starting,
                    sender_ending = sender_state.balance,
                    receiver_starting,
                    receiver_ending = receiver_state.balance,
                    "transfer"
                );
                Ok(())
            },
        )
    }
}
