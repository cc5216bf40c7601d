use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{AccountId, AllowanceEntry, AllowanceStore, Amount, BalanceStore, Metadata};

/// Point-in-time view of the ledger. Read-only; nothing loads it back.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub metadata: Metadata,
    pub balances: BTreeMap<AccountId, Amount>,
    pub allowances: Vec<AllowanceEntry>,
    pub event_count: u64,
    pub state_root: [u8; 32],
}

impl LedgerSnapshot {
    pub fn state_root_hex(&self) -> String {
        hex::encode(self.state_root)
    }
}

pub(crate) fn compute_state_root(balances: &BalanceStore, allowances: &AllowanceStore) -> [u8; 32] {
    let mut leaves: Vec<[u8; 32]> = Vec::with_capacity(balances.len() + allowances.len());
    for (account, amount) in balances.iter() {
        let mut hasher = Sha256::new();
        hasher.update(b"acct");
        hash_str(&mut hasher, account);
        hasher.update(amount.to_le_bytes());
        leaves.push(hasher.finalize().into());
    }
    for entry in allowances.entries() {
        let mut hasher = Sha256::new();
        hasher.update(b"allow");
        hash_str(&mut hasher, &entry.owner);
        hash_str(&mut hasher, &entry.spender);
        hasher.update(entry.amount.to_le_bytes());
        leaves.push(hasher.finalize().into());
    }
    build_merkle(leaves)
}

// Length prefix keeps ("ab","c") and ("a","bc") apart.
fn hash_str(hasher: &mut Sha256, s: &str) {
    hasher.update((s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

fn build_merkle(mut leaves: Vec<[u8; 32]>) -> [u8; 32] {
    if leaves.is_empty() {
        return Sha256::digest(b"vcoin-ledger-empty").into();
    }
    while leaves.len() > 1 {
        let mut next = Vec::with_capacity(leaves.len().div_ceil(2));
        for chunk in leaves.chunks(2) {
            let mut hasher = Sha256::new();
            hasher.update(b"node");
            hasher.update(chunk[0]);
            hasher.update(chunk.get(1).unwrap_or(&chunk[0]));
            next.push(hasher.finalize().into());
        }
        leaves = next;
    }
    leaves[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tree_has_fixed_root() {
        let root = compute_state_root(&BalanceStore::default(), &AllowanceStore::default());
        let expected: [u8; 32] = Sha256::digest(b"vcoin-ledger-empty").into();
        assert_eq!(root, expected);
    }

    #[test]
    fn root_tracks_balances_and_allowances() {
        let mut balances = BalanceStore::default();
        let mut allowances = AllowanceStore::default();
        balances.credit("alice", 1_000);
        balances.credit("bob", 2_000);
        let before = compute_state_root(&balances, &allowances);
        assert_eq!(before, compute_state_root(&balances, &allowances));

        allowances.set_allowance("alice", "bob", 1);
        let with_grant = compute_state_root(&balances, &allowances);
        assert_ne!(before, with_grant);

        balances.debit("bob", 1).unwrap();
        balances.credit("alice", 1);
        assert_ne!(with_grant, compute_state_root(&balances, &allowances));
    }

    #[test]
    fn odd_leaf_is_paired_with_itself() {
        let leaf = [7u8; 32];
        let mut hasher = Sha256::new();
        hasher.update(b"node");
        hasher.update(leaf);
        hasher.update(leaf);
        let expected: [u8; 32] = hasher.finalize().into();
        let three = build_merkle(vec![leaf, leaf, leaf]);
        let mut top = Sha256::new();
        top.update(b"node");
        top.update(expected);
        top.update(expected);
        let expected_three: [u8; 32] = top.finalize().into();
        assert_eq!(three, expected_three);
    }
}
