use std::sync::Arc;

use parking_lot::Mutex;

use crate::engine::{LedgerResult, Operation};
use crate::ledger::{Amount, Ledger};

/// Cloneable handle for hosts that issue operations from several threads.
/// One lock covers each whole operation, which gives all callers a single
/// total order.
#[derive(Clone, Debug)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    pub fn approve(&self, caller: &str, spender: &str, amount: Amount) -> LedgerResult {
        self.inner.lock().approve(caller, spender, amount)
    }

    pub fn transfer(&self, caller: &str, to: &str, amount: Amount) -> LedgerResult {
        self.inner.lock().transfer(caller, to, amount)
    }

    pub fn transfer_from(&self, caller: &str, owner: &str, to: &str, amount: Amount) -> LedgerResult {
        self.inner.lock().transfer_from(caller, owner, to, amount)
    }

    pub fn apply(&self, op: &Operation) -> LedgerResult {
        self.inner.lock().apply(op)
    }

    pub fn balance_of(&self, account: &str) -> Amount {
        self.inner.lock().balance_of(account)
    }

    pub fn allowance(&self, owner: &str, spender: &str) -> Amount {
        self.inner.lock().allowance(owner, spender)
    }

    /// Runs `f` against a consistent view; no operation interleaves with it.
    pub fn with<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&self.inner.lock())
    }
}
