//! Benchmark suite for comparing processing strategies
//!
//! This benchmark compares the threaded and async strategies using the divan
//! benchmarking framework.
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench
//! ```
//!
//! # Generated Input
//!
//! Each run generates an input file with 16 accounts and the requested number
//! of transactions, mixing:
//! - Depositors funding every account
//! - Clients withdrawing and transferring in both directions
//! - Generic transactions with deposits

use bank_simulator::cli::StrategyType;
use bank_simulator::config::SimulationConfig;
use bank_simulator::strategy::{create_strategy, RuntimeConfig};
use divan::Bencher;
use std::io::Write;
use tempfile::NamedTempFile;

const ACCOUNTS: usize = 16;

fn main() {
    divan::main();
}

fn generate_input(transactions: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");

    for a in 0..ACCOUNTS {
        writeln!(file, "a{} type personal w 1 t 1 transactions 10 2 overdraft Y 5", a)
            .expect("Failed to write account");
    }
    for t in 0..transactions {
        let from = t % ACCOUNTS;
        let to = (t + 1) % ACCOUNTS;
        let line = match t % 4 {
            0 => format!("d{} d a{} 1000 d a{} 1000", t, from, to),
            1 => format!("c{} w a{} 120 t a{} a{} 75", t, from, from, to),
            2 => format!("c{} t a{} a{} 50", t, to, from),
            _ => format!("x{} d a{} 10", t, from),
        };
        writeln!(file, "{}", line).expect("Failed to write transaction");
    }

    file.flush().expect("Failed to flush temp file");
    file
}

/// Threaded strategy, one OS thread per transaction
#[divan::bench(args = [100, 1_000])]
fn threaded_strategy(bencher: Bencher, transactions: usize) {
    let input = generate_input(transactions);
    let strategy = create_strategy(StrategyType::Threaded, SimulationConfig::default(), None);

    bencher.bench(|| {
        let mut output = Vec::new();
        strategy
            .process(input.path(), &mut output)
            .expect("Simulation failed");
        output
    });
}

/// Async strategy with the default blocking pool
#[divan::bench(args = [100, 1_000])]
fn async_strategy(bencher: Bencher, transactions: usize) {
    let input = generate_input(transactions);
    let strategy = create_strategy(
        StrategyType::Async,
        SimulationConfig::default(),
        Some(RuntimeConfig::default()),
    );

    bencher.bench(|| {
        let mut output = Vec::new();
        strategy
            .process(input.path(), &mut output)
            .expect("Simulation failed");
        output
    });
}

/// Async strategy with a blocking pool much smaller than the transaction count
#[divan::bench(args = [100, 1_000])]
fn async_strategy_small_pool(bencher: Bencher, transactions: usize) {
    let input = generate_input(transactions);
    let strategy = create_strategy(
        StrategyType::Async,
        SimulationConfig::default(),
        Some(RuntimeConfig::new(2, 8)),
    );

    bencher.bench(|| {
        let mut output = Vec::new();
        strategy
            .process(input.path(), &mut output)
            .expect("Simulation failed");
        output
    });
}
