use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::ledger::{AccountId, Amount};

pub const DEFAULT_NAME: &str = "VCoin";
pub const DEFAULT_SYMBOL: &str = "VC";
pub const DEFAULT_DECIMALS: u8 = 8;
pub const DEFAULT_TOTAL_SUPPLY: Amount = 1_000_000;
pub const DEFAULT_GENESIS_ACCOUNT: &str = "genesis";

/// Largest precision accepted; 10^18 still fits in a u64 display scale.
pub const MAX_DECIMALS: u8 = 18;

/// Everything fixed at genesis. Missing fields fall back to the reference
/// VCoin token.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GenesisConfig {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: Amount,
    /// Receives the entire supply at construction.
    pub genesis_account: AccountId,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            symbol: DEFAULT_SYMBOL.to_string(),
            decimals: DEFAULT_DECIMALS,
            total_supply: DEFAULT_TOTAL_SUPPLY,
            genesis_account: DEFAULT_GENESIS_ACCOUNT.to_string(),
        }
    }
}

impl GenesisConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: GenesisConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::EmptySymbol);
        }
        if self.genesis_account.is_empty() {
            return Err(ConfigError::EmptyGenesisAccount);
        }
        if self.decimals > MAX_DECIMALS {
            return Err(ConfigError::DecimalsTooHigh(self.decimals));
        }
        Ok(())
    }
}
