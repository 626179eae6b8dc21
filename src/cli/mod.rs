// CLI module
// Command-line interface and argument parsing

mod args;

pub use args::{CliArgs, StrategyType};

use clap::Parser;

/// Parse command-line arguments using clap
///
/// If parsing fails (invalid arguments, missing input path, or `--help`),
/// clap prints an error or the help text and exits the process.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}
