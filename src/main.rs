//! Bank Simulator CLI
//!
//! Command-line interface for simulating concurrent bank transactions.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- input.txt
//! cargo run -- --strategy threaded input.txt
//! cargo run -- --strategy async --max-blocking-threads 64 input.txt
//! cargo run -- --config rules.yaml --output balances.txt input.txt
//! RUST_LOG=debug cargo run -- --json-logs input.txt 2> log.jsonl
//! ```
//!
//! The program reads account and transaction lines from the input file, runs
//! every transaction concurrently under the selected strategy, and prints the
//! final balance of every account to stdout. Logs go to stderr.
//!
//! # Processing Strategies
//!
//! - **threaded**: One scoped OS thread per transaction
//! - **async**: Input read with tokio, transactions on the blocking pool (default)
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, unreadable input or config, unknown account, etc.)

use bank_simulator::cli::{self, CliArgs, StrategyType};
use bank_simulator::config::SimulationConfig;
use bank_simulator::logging;
use bank_simulator::strategy;
use std::io::Write;
use std::process;
use tracing::error;

fn main() {
    let args = cli::parse_args();
    logging::init_logging(&args.log_level, args.json_logs);

    if let Err(e) = run(&args) {
        error!(error = %e, "simulation failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<(), String> {
    let config = match &args.config {
        Some(path) => SimulationConfig::load(path).map_err(|e| e.to_string())?,
        None => SimulationConfig::default(),
    };

    let runtime = match args.strategy {
        StrategyType::Async => Some(args.to_runtime_config()),
        StrategyType::Threaded => None,
    };
    let strategy = strategy::create_strategy(args.strategy, config, runtime);

    // Buffer the report so a failed run prints nothing
    let mut report = Vec::new();
    strategy.process(&args.input_file, &mut report)?;

    std::io::stdout()
        .write_all(&report)
        .map_err(|e| format!("Failed to write report to stdout: {}", e))?;

    if let Some(path) = &args.output {
        std::fs::write(path, &report)
            .map_err(|e| format!("Failed to write report to '{}': {}", path.display(), e))?;
    }

    Ok(())
}
