use crate::strategy::RuntimeConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Simulate concurrent bank transactions
#[derive(Parser, Debug)]
#[command(name = "bank-simulator")]
#[command(about = "Simulate concurrent bank transactions over shared accounts", long_about = None)]
pub struct CliArgs {
    /// Input file with account and transaction lines
    #[arg(value_name = "INPUT", help = "Path to the input file")]
    pub input_file: PathBuf,

    /// Worker runtime used to run transactions
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Worker runtime: 'threaded' for one OS thread per transaction or 'async' for the tokio blocking pool"
    )]
    pub strategy: StrategyType,

    /// YAML file with simulation rules
    #[arg(long = "config", value_name = "FILE", help = "Path to a YAML configuration file")]
    pub config: Option<PathBuf>,

    /// Also write the balance report to this file
    #[arg(long = "output", value_name = "FILE", help = "Write the report to FILE as well as stdout")]
    pub output: Option<PathBuf>,

    /// Number of async worker threads (async mode only)
    #[arg(
        long = "worker-threads",
        value_name = "COUNT",
        help = "Number of tokio worker threads (default: CPU cores)"
    )]
    pub worker_threads: Option<usize>,

    /// Maximum number of concurrently running transactions (async mode only)
    #[arg(
        long = "max-blocking-threads",
        value_name = "COUNT",
        help = "Maximum number of transactions running at once (default: 512)"
    )]
    pub max_blocking_threads: Option<usize>,

    #[arg(
        long = "log-level",
        value_name = "LEVEL",
        default_value = "info",
        help = "Log level filter, overridden by RUST_LOG"
    )]
    pub log_level: String,

    #[arg(long = "json-logs", help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

/// Available worker runtimes
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Threaded,
    Async,
}

impl CliArgs {
    /// Create a RuntimeConfig from CLI arguments
    ///
    /// Missing values fall back to defaults; zero values are replaced with
    /// defaults and logged as warnings.
    pub fn to_runtime_config(&self) -> RuntimeConfig {
        if self.worker_threads.is_some() || self.max_blocking_threads.is_some() {
            let default = RuntimeConfig::default();
            RuntimeConfig::new(
                self.worker_threads.unwrap_or(default.worker_threads),
                self.max_blocking_threads
                    .unwrap_or(default.max_blocking_threads),
            )
        } else {
            RuntimeConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::default_strategy(&["program", "input.txt"], StrategyType::Async)]
    #[case::explicit_threaded(&["program", "--strategy", "threaded", "input.txt"], StrategyType::Threaded)]
    #[case::explicit_async(&["program", "--strategy", "async", "input.txt"], StrategyType::Async)]
    fn test_strategy_parsing(#[case] args: &[&str], #[case] expected: StrategyType) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.strategy, expected);
    }

    #[rstest]
    #[case::worker_threads(&["program", "--worker-threads", "3", "input.txt"], Some(3), None)]
    #[case::max_blocking(&["program", "--max-blocking-threads", "64", "input.txt"], None, Some(64))]
    #[case::no_options(&["program", "input.txt"], None, None)]
    #[case::all_options(
        &["program", "--strategy", "async", "--worker-threads", "3", "--max-blocking-threads", "64", "input.txt"],
        Some(3),
        Some(64)
    )]
    fn test_runtime_options(
        #[case] args: &[&str],
        #[case] worker_threads: Option<usize>,
        #[case] max_blocking_threads: Option<usize>,
    ) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.worker_threads, worker_threads);
        assert_eq!(parsed.max_blocking_threads, max_blocking_threads);
    }

    #[rstest]
    #[case::all_defaults(&["program", "input.txt"], num_cpus::get(), 512)]
    #[case::custom_workers(&["program", "--worker-threads", "3", "input.txt"], 3, 512)]
    #[case::custom_blocking(&["program", "--max-blocking-threads", "64", "input.txt"], num_cpus::get(), 64)]
    #[case::zero_workers(&["program", "--worker-threads", "0", "input.txt"], num_cpus::get(), 512)]
    #[case::zero_blocking(&["program", "--max-blocking-threads", "0", "input.txt"], num_cpus::get(), 512)]
    fn test_runtime_config_conversion(
        #[case] args: &[&str],
        #[case] expected_workers: usize,
        #[case] expected_blocking: usize,
    ) {
        let config = CliArgs::try_parse_from(args).unwrap().to_runtime_config();

        assert_eq!(config.worker_threads, expected_workers);
        assert_eq!(config.max_blocking_threads, expected_blocking);
    }

    #[test]
    fn test_ambient_options() {
        let parsed = CliArgs::try_parse_from([
            "program",
            "--config",
            "rules.yaml",
            "--output",
            "out.txt",
            "--log-level",
            "debug",
            "--json-logs",
            "input.txt",
        ])
        .unwrap();

        assert_eq!(parsed.config, Some(PathBuf::from("rules.yaml")));
        assert_eq!(parsed.output, Some(PathBuf::from("out.txt")));
        assert_eq!(parsed.log_level, "debug");
        assert!(parsed.json_logs);
    }

    #[test]
    fn test_ambient_defaults() {
        let parsed = CliArgs::try_parse_from(["program", "input.txt"]).unwrap();

        assert_eq!(parsed.config, None);
        assert_eq!(parsed.output, None);
        assert_eq!(parsed.log_level, "info");
        assert!(!parsed.json_logs);
    }

    #[rstest]
    #[case::missing_input(&["program"])]
    #[case::invalid_strategy(&["program", "--strategy", "sync", "input.txt"])]
    #[case::negative_threads(&["program", "--worker-threads", "-1", "input.txt"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        assert!(CliArgs::try_parse_from(args).is_err());
    }
}
