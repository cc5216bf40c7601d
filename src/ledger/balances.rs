use std::collections::BTreeMap;

use log::trace;

use super::{AccountId, Amount};
use crate::error::LedgerError;

/// Account → units held. A zero entry is a real, persistent state: accounts
/// are created on first reference and never removed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BalanceStore {
    balances: BTreeMap<AccountId, Amount>,
}

impl BalanceStore {
    pub fn balance_of(&self, account: &str) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn contains(&self, account: &str) -> bool {
        self.balances.contains_key(account)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, Amount)> {
        self.balances.iter().map(|(account, amount)| (account, *amount))
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Sum over every account, widened so a corrupted store cannot wrap.
    pub fn circulating(&self) -> u128 {
        self.balances.values().map(|v| *v as u128).sum()
    }

    pub(crate) fn to_map(&self) -> BTreeMap<AccountId, Amount> {
        self.balances.clone()
    }

    /// Registers the account with a zero balance if it has never been seen.
    pub(crate) fn touch(&mut self, account: &str) {
        if !self.balances.contains_key(account) {
            self.balances.insert(account.to_string(), 0);
        }
    }

    /// Only ever called paired with a `debit` of the same amount (or once at
    /// genesis), so the total stays within the u64 supply.
    pub(crate) fn credit(&mut self, account: &str, amount: Amount) {
        let balance = self.balances.entry(account.to_string()).or_insert(0);
        *balance += amount;
        trace!("credit {account} +{amount} -> {balance}");
    }

    pub(crate) fn debit(&mut self, account: &str, amount: Amount) -> Result<(), LedgerError> {
        let balance = self.balance_of(account);
        if balance < amount {
            return Err(LedgerError::InsufficientBalance {
                account: account.to_string(),
                balance,
                requested: amount,
            });
        }
        let entry = self.balances.entry(account.to_string()).or_insert(0);
        *entry -= amount;
        trace!("debit {account} -{amount} -> {entry}");
        Ok(())
    }
}
