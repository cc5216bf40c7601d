use std::collections::BTreeMap;

use log::trace;
use serde::{Deserialize, Serialize};

use super::{AccountId, Amount};
use crate::error::LedgerError;

/// One (owner, spender) grant, as exposed in snapshots.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllowanceEntry {
    pub owner: AccountId,
    pub spender: AccountId,
    pub amount: Amount,
}

/// (owner, spender) → remaining amount the spender may move. A missing entry
/// reads as zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AllowanceStore {
    grants: BTreeMap<(AccountId, AccountId), Amount>,
}

impl AllowanceStore {
    pub fn allowance(&self, owner: &str, spender: &str) -> Amount {
        // BTreeMap<(String, String), _> can't be probed with borrowed pairs.
        self.grants
            .get(&(owner.to_string(), spender.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn entries(&self) -> Vec<AllowanceEntry> {
        self.grants
            .iter()
            .map(|((owner, spender), amount)| AllowanceEntry {
                owner: owner.clone(),
                spender: spender.clone(),
                amount: *amount,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Last write wins.
    pub(crate) fn set_allowance(&mut self, owner: &str, spender: &str, amount: Amount) {
        self.grants
            .insert((owner.to_string(), spender.to_string()), amount);
        trace!("allowance {owner} -> {spender} set to {amount}");
    }

    pub(crate) fn consume_allowance(
        &mut self,
        owner: &str,
        spender: &str,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let allowance = self.allowance(owner, spender);
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance {
                owner: owner.to_string(),
                spender: spender.to_string(),
                allowance,
                requested: amount,
            });
        }
        // Nothing to spend; don't materialise a grant nobody made.
        if amount == 0 {
            return Ok(());
        }
        let remaining = allowance - amount;
        self.grants
            .insert((owner.to_string(), spender.to_string()), remaining);
        trace!("allowance {owner} -> {spender} consumed {amount}, {remaining} left");
        Ok(())
    }
}
