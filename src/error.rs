use thiserror::Error;

use crate::ledger::{AccountId, Amount};

/// Unrecoverable ledger failure. Returning one of these means the operation
/// aborted and nothing was applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Debit larger than the account's balance.
    #[error("insufficient balance in account {account}: has {balance}, needs {requested}")]
    InsufficientBalance {
        account: AccountId,
        balance: Amount,
        requested: Amount,
    },

    /// Allowance consumption larger than what the owner granted.
    #[error("insufficient allowance from {owner} to {spender}: has {allowance}, needs {requested}")]
    InsufficientAllowance {
        owner: AccountId,
        spender: AccountId,
        allowance: Amount,
        requested: Amount,
    },

    /// Sum of balances drifted away from the fixed total supply.
    #[error("supply mismatch: balances sum to {circulating}, total supply is {total_supply}")]
    SupplyMismatch {
        circulating: u128,
        total_supply: Amount,
    },
}

/// Failure to load or validate a genesis configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("token name must not be empty")]
    EmptyName,

    #[error("token symbol must not be empty")]
    EmptySymbol,

    #[error("genesis account must not be empty")]
    EmptyGenesisAccount,

    #[error("decimals {0} exceeds the maximum of {}", crate::config::MAX_DECIMALS)]
    DecimalsTooHigh(u8),
}
