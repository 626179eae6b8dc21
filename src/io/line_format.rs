//! Line format handling for input records and the balance report
//!
//! This module centralizes all format concerns, providing:
//! - Conversion from the whitespace-separated fields of one input line to an `InputRecord`
//! - Balance report serialization
//!
//! All functions are pure (no I/O) for easy testing.
//!
//! # Input
//!
//! ```text
//! a1 type business d 10 w 10 t 10 transactions 2 5 overdraft Y 20
//! c1 d a1 100 w a1 50 t a1 a2 25
//! ```
//!
//! A line whose first field starts with `a` defines an account; any other
//! non-blank line is a transaction.

use crate::types::{
    AccountSnapshot, AccountSpec, Amount, FeeSchedule, InputRecord, JobSpec, OverdraftPolicy,
    SimulationError, TransactionSpec,
};
use csv::{QuoteStyle, WriterBuilder};
use std::io::Write;
use tracing::warn;

/// Convert the fields of one input line to an `InputRecord`
///
/// Empty fields (runs of spaces) are ignored. Returns `Ok(None)` for a blank
/// line.
///
/// # Arguments
///
/// * `fields` - Raw fields of the line
/// * `line` - 1-based line number, used in error messages
///
/// # Errors
///
/// Every error returned here is recoverable: it describes this line only.
pub fn convert_fields<'a, I>(fields: I, line: u64) -> Result<Option<InputRecord>, SimulationError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut tokens = fields.into_iter().filter(|field| !field.is_empty());

    let id = match tokens.next() {
        Some(id) => id,
        None => return Ok(None),
    };

    let record = if id.starts_with('a') {
        InputRecord::Account(parse_account(id, tokens, line)?)
    } else {
        InputRecord::Transaction(parse_transaction(id, tokens, line)?)
    };
    Ok(Some(record))
}

fn parse_account<'a>(
    id: &str,
    mut tokens: impl Iterator<Item = &'a str>,
    line: u64,
) -> Result<AccountSpec, SimulationError> {
    let mut kind = None;
    let mut fees = FeeSchedule::default();
    let mut overdraft = OverdraftPolicy::Unprotected;

    while let Some(key) = tokens.next() {
        let mut value = || {
            tokens.next().ok_or_else(|| {
                SimulationError::parse(Some(line), format!("missing value for '{}'", key))
            })
        };

        match key {
            "type" => kind = Some(value()?.to_string()),
            "d" => fees.deposit = parse_amount(value()?, line)?,
            "w" => fees.withdrawal = parse_amount(value()?, line)?,
            "t" => fees.transfer = parse_amount(value()?, line)?,
            "transactions" => {
                let threshold = value()?;
                fees.threshold = threshold.parse().map_err(|_| {
                    SimulationError::parse(
                        Some(line),
                        format!("invalid transaction threshold '{}'", threshold),
                    )
                })?;
                fees.transaction = parse_amount(value()?, line)?;
            }
            "overdraft" => {
                overdraft = match value()? {
                    "Y" => OverdraftPolicy::Protected {
                        fee_per_unit: parse_amount(value()?, line)?,
                    },
                    "N" => OverdraftPolicy::Unprotected,
                    other => {
                        return Err(SimulationError::parse(
                            Some(line),
                            format!("overdraft flag must be Y or N, got '{}'", other),
                        ))
                    }
                }
            }
            other => warn!(line, account = id, attribute = other, "ignoring unknown account attribute"),
        }
    }

    let kind = kind.ok_or_else(|| {
        SimulationError::parse(Some(line), format!("account {} has no type", id))
    })?;

    Ok(AccountSpec {
        id: id.to_string(),
        kind,
        fees,
        overdraft,
    })
}

fn parse_transaction<'a>(
    id: &str,
    mut tokens: impl Iterator<Item = &'a str>,
    line: u64,
) -> Result<TransactionSpec, SimulationError> {
    let mut jobs = Vec::new();

    while let Some(kind) = tokens.next() {
        let mut operand =
            || tokens.next().ok_or_else(|| SimulationError::incomplete_job(kind, line));

        let job = match kind {
            "d" => JobSpec::Deposit {
                account: operand()?.to_string(),
                amount: parse_amount(operand()?, line)?,
            },
            "w" => JobSpec::Withdraw {
                account: operand()?.to_string(),
                amount: parse_amount(operand()?, line)?,
            },
            "t" => JobSpec::Transfer {
                from: operand()?.to_string(),
                to: operand()?.to_string(),
                amount: parse_amount(operand()?, line)?,
            },
            other => return Err(SimulationError::unknown_job_kind(other, line)),
        };
        jobs.push(job);
    }

    Ok(TransactionSpec::new(id, jobs))
}

/// Parse a non-negative integer amount
fn parse_amount(token: &str, line: u64) -> Result<Amount, SimulationError> {
    token
        .parse::<u32>()
        .map(Amount::from)
        .map_err(|_| SimulationError::invalid_amount(token, line))
}

/// Write the final balance report
///
/// Writes one line per account, in the order given:
/// `<id> type <label> <balance>`.
///
/// # Arguments
///
/// * `accounts` - Final account states, in registration order
/// * `output` - Mutable reference to a writer for the report
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_balances(accounts: &[AccountSnapshot], output: &mut dyn Write) -> Result<(), String> {
    let mut writer = WriterBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .from_writer(output);

    for account in accounts {
        writer
            .write_record([
                account.id.as_str(),
                "type",
                account.kind.as_str(),
                account.balance.to_string().as_str(),
            ])
            .map_err(|e| format!("Failed to write balance of account {}: {}", account.id, e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
