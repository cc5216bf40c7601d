//! Ledger state: metadata fixed at genesis, the balance and allowance
//! stores, and the event log. All mutation goes through the engine
//! operations in [`crate::engine`].

mod allowances;
mod balances;
mod events;
mod snapshot;

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::GenesisConfig;
use crate::error::{ConfigError, LedgerError};

pub use allowances::{AllowanceEntry, AllowanceStore};
pub use balances::BalanceStore;
pub use events::{EventLog, EventRecord, LedgerEvent};
pub use snapshot::LedgerSnapshot;

pub type AccountId = String;
pub type Amount = u64;

/// Constants fixed at construction. No mutation path exists.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Metadata {
    name: String,
    symbol: String,
    decimals: u8,
    total_supply: Amount,
}

impl Metadata {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, decimals: u8, total_supply: Amount) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals,
            total_supply,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }
}

impl From<&GenesisConfig> for Metadata {
    fn from(config: &GenesisConfig) -> Self {
        Self::new(
            config.name.clone(),
            config.symbol.clone(),
            config.decimals,
            config.total_supply,
        )
    }
}

/// A single token ledger. Owns its stores outright; independent instances
/// share nothing.
#[derive(Clone, Debug)]
pub struct Ledger {
    pub(crate) meta: Metadata,
    pub(crate) balances: BalanceStore,
    pub(crate) allowances: AllowanceStore,
    pub(crate) events: EventLog,
}

impl Ledger {
    /// Mints the whole supply to `genesis_account`. Genesis is not an
    /// engine operation and records no event.
    pub fn new(meta: Metadata, genesis_account: impl Into<AccountId>) -> Self {
        let genesis_account = genesis_account.into();
        let mut balances = BalanceStore::default();
        balances.credit(&genesis_account, meta.total_supply);
        info!(
            "genesis: {} {} ({} decimals) minted to {}",
            meta.total_supply, meta.symbol, meta.decimals, genesis_account
        );
        Self {
            meta,
            balances,
            allowances: AllowanceStore::default(),
            events: EventLog::default(),
        }
    }

    pub fn genesis(config: &GenesisConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(Metadata::from(config), config.genesis_account.clone()))
    }

    pub fn metadata(&self) -> &Metadata {
        &self.meta
    }

    pub fn name(&self) -> &str {
        self.meta.name()
    }

    pub fn symbol(&self) -> &str {
        self.meta.symbol()
    }

    pub fn decimals(&self) -> u8 {
        self.meta.decimals()
    }

    pub fn total_supply(&self) -> Amount {
        self.meta.total_supply()
    }

    pub fn balance_of(&self, account: &str) -> Amount {
        self.balances.balance_of(account)
    }

    pub fn allowance(&self, owner: &str, spender: &str) -> Amount {
        self.allowances.allowance(owner, spender)
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Every account referenced so far, including zero balances.
    pub fn accounts(&self) -> impl Iterator<Item = (&AccountId, Amount)> {
        self.balances.iter()
    }

    pub fn circulating(&self) -> u128 {
        self.balances.circulating()
    }

    pub fn check_conservation(&self) -> Result<(), LedgerError> {
        let circulating = self.circulating();
        if circulating != self.total_supply() as u128 {
            return Err(LedgerError::SupplyMismatch {
                circulating,
                total_supply: self.total_supply(),
            });
        }
        Ok(())
    }

    pub fn state_root(&self) -> [u8; 32] {
        snapshot::compute_state_root(&self.balances, &self.allowances)
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            metadata: self.meta.clone(),
            balances: self.balances.to_map(),
            allowances: self.allowances.entries(),
            event_count: self.events.len() as u64,
            state_root: self.state_root(),
        }
    }
}

impl Default for Ledger {
    /// The reference VCoin token.
    fn default() -> Self {
        let config = GenesisConfig::default();
        Self::new(Metadata::from(&config), config.genesis_account)
    }
}
