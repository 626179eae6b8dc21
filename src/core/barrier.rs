//! One-shot gate that holds clients back until earlier depositors have finished
//!
//! # Protocol
//!
//! - The scheduler registers each depositor before its worker starts
//!   (`register_depositor`, or `ticket` for an RAII handle). Registration
//!   hands out the depositor's sequence number.
//! - A depositor worker arrives once, after its last job (`arrive_as_depositor`).
//! - A client is admitted with the number of depositors registered so far
//!   (`launched`) and calls `wait_for_depositors` with it before its first job.
//!   It blocks until every depositor with a lower sequence number has arrived.
//!
//! Depositors registered after a client never hold it back, so a client's
//! progress only depends on workers started before it. The barrier mutex only
//! guards the counters. It is taken briefly for the handshake and never held
//! while jobs execute. With zero depositors the gate is open from the start.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct Counters {
    launched: usize,
    finished: usize,
    /// Length of the longest prefix of depositors that have all arrived
    settled: usize,
    arrived: Vec<bool>,
}

impl Counters {
    fn arrive(&mut self, seq: usize) {
        if self.arrived.get(seq).copied().unwrap_or(true) {
            warn!(seq, "depositor arrived twice or was never registered");
            return;
        }
        self.arrived[seq] = true;
        self.finished += 1;
        while self.arrived.get(self.settled).copied().unwrap_or(false) {
            self.settled += 1;
        }
    }
}

#[derive(Debug, Default)]
pub struct DepositBarrier {
    counters: Mutex<Counters>,
    released: Condvar,
}

impl DepositBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more depositor and return its sequence number
    pub fn register_depositor(&self) -> usize {
        let mut counters = self.counters.lock();
        let seq = counters.launched;
        counters.launched += 1;
        counters.arrived.push(false);
        debug!(seq, launched = counters.launched, "depositor registered");
        seq
    }

    /// Register a depositor and hand back the handle it arrives with
    ///
    /// Dropping the ticket without calling `arrive` still arrives, so a
    /// depositor that panics cannot strand the clients behind it.
    pub fn ticket(self: &Arc<Self>) -> DepositorTicket {
        let seq = self.register_depositor();
        DepositorTicket {
            barrier: Some(Arc::clone(self)),
            seq,
        }
    }

    /// Signal that depositor `seq` has finished all of its jobs
    pub fn arrive_as_depositor(&self, seq: usize) {
        let mut counters = self.counters.lock();
        counters.arrive(seq);
        debug!(
            seq,
            finished = counters.finished,
            launched = counters.launched,
            "depositor finished"
        );
        self.released.notify_all();
    }

    /// Block until the first `depositors` registered depositors have arrived
    pub fn wait_for_depositors(&self, depositors: usize) {
        let mut counters = self.counters.lock();
        while counters.settled < depositors {
            debug!(
                settled = counters.settled,
                waiting_for = depositors,
                "client waiting for depositors"
            );
            self.released.wait(&mut counters);
        }
    }

    /// Block until every depositor registered so far has arrived
    pub fn wait_for_all_depositors(&self) {
        let depositors = self.launched();
        self.wait_for_depositors(depositors);
    }

    /// Whether a client admitted now would pass without blocking
    pub fn is_released(&self) -> bool {
        let counters = self.counters.lock();
        counters.settled >= counters.launched
    }

    pub fn launched(&self) -> usize {
        self.counters.lock().launched
    }

    pub fn finished(&self) -> usize {
        self.counters.lock().finished
    }
}

/// Proof of a registered depositor that has not arrived yet
#[derive(Debug)]
pub struct DepositorTicket {
    barrier: Option<Arc<DepositBarrier>>,
    seq: usize,
}

impl DepositorTicket {
    pub fn seq(&self) -> usize {
        self.seq
    }

    pub fn arrive(mut self) {
        if let Some(barrier) = self.barrier.take() {
            barrier.arrive_as_depositor(self.seq);
        }
    }
}

impl Drop for DepositorTicket {
    fn drop(&mut self) {
        if let Some(barrier) = self.barrier.take() {
            warn!(seq = self.seq, "depositor released the barrier without completing its jobs");
            barrier.arrive_as_depositor(self.seq);
        }
    }
}
