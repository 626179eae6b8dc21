//! Simulation rules that are policy rather than account data
//!
//! Every field has a default, so an empty YAML document (or no `--config` at
//! all) yields the standard bank rules.

use crate::types::{Amount, SimulationError, TransactionRole};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Which transaction roles pay deposit fees
///
/// Withdrawal and transfer fees are charged regardless of role; only deposits
/// consult this table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeePolicy {
    pub depositor: bool,
    pub client: bool,
    pub generic: bool,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            depositor: false,
            client: true,
            generic: true,
        }
    }
}

impl FeePolicy {
    pub fn charges_deposit_fees(&self, role: TransactionRole) -> bool {
        match role {
            TransactionRole::Depositor => self.depositor,
            TransactionRole::Client => self.client,
            TransactionRole::Generic => self.generic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub fee_policy: FeePolicy,

    /// Size of one overdraft surcharge unit
    pub overdraft_unit: Amount,

    /// Lowest balance an overdraft-protected account may reach
    pub overdraft_floor: Amount,

    /// Credit the receiver when a transfer is covered by the sender's overdraft
    ///
    /// Off by default, in which case only the sender is debited on that path.
    pub credit_receiver_on_overdraft: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fee_policy: FeePolicy::default(),
            overdraft_unit: 500,
            overdraft_floor: -5000,
            credit_receiver_on_overdraft: false,
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, SimulationError> {
        let content = fs::read_to_string(path).map_err(|e| SimulationError::ConfigError {
            message: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, SimulationError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), SimulationError> {
        if self.overdraft_unit <= 0 {
            return Err(SimulationError::ConfigError {
                message: format!(
                    "overdraft_unit must be positive, got {}",
                    self.overdraft_unit
                ),
            });
        }
        Ok(())
    }

    /// Number of surcharge units for an overdraft-covered `amount`
    ///
    /// One unit is always added on top of the whole units, so an exact
    /// multiple of the unit size still pays for an extra started unit.
    pub fn overdraft_units(&self, amount: Amount) -> Amount {
        amount / self.overdraft_unit + 1
    }
}
