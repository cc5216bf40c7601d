//! The three mutating operations. Each one validates against the stores
//! first and only then mutates, so a call either commits its state change
//! together with exactly one event or leaves the ledger untouched.
//!
//! Two failure disciplines coexist:
//! * soft rejection: `Ok(Outcome::Rejected(..))`, the caller gets a
//!   negative answer and nothing changed (`approve`, `transfer_from`);
//! * hard abort: `Err(LedgerError)`, the operation could not proceed at
//!   all (`transfer` with insufficient balance).

use std::fmt;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::ledger::{AccountId, Amount, EventRecord, Ledger, LedgerEvent};

pub type LedgerResult = Result<Outcome, LedgerError>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// State changed and this record was appended to the event log.
    Committed(EventRecord),
    /// Preconditions not met; no state change, no event.
    Rejected(Rejection),
}

impl Outcome {
    /// The boolean a token caller sees.
    pub fn succeeded(&self) -> bool {
        matches!(self, Outcome::Committed(_))
    }

    pub fn event(&self) -> Option<&LedgerEvent> {
        match self {
            Outcome::Committed(record) => Some(&record.event),
            Outcome::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Outcome::Committed(_) => None,
            Outcome::Rejected(rejection) => Some(rejection),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    InsufficientBalance {
        account: AccountId,
        balance: Amount,
        requested: Amount,
    },
    InsufficientAllowance {
        owner: AccountId,
        spender: AccountId,
        allowance: Amount,
        requested: Amount,
    },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::InsufficientBalance {
                account,
                balance,
                requested,
            } => write!(
                f,
                "insufficient balance in {account}: has {balance}, needs {requested}"
            ),
            Rejection::InsufficientAllowance {
                owner,
                spender,
                allowance,
                requested,
            } => write!(
                f,
                "insufficient allowance from {owner} to {spender}: has {allowance}, needs {requested}"
            ),
        }
    }
}

/// An engine call as data, e.g. one line of a replay script.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Approve {
        caller: AccountId,
        spender: AccountId,
        amount: Amount,
    },
    Transfer {
        caller: AccountId,
        to: AccountId,
        amount: Amount,
    },
    TransferFrom {
        caller: AccountId,
        owner: AccountId,
        to: AccountId,
        amount: Amount,
    },
}

impl Ledger {
    pub fn apply(&mut self, op: &Operation) -> LedgerResult {
        match op {
            Operation::Approve {
                caller,
                spender,
                amount,
            } => self.approve(caller, spender, *amount),
            Operation::Transfer { caller, to, amount } => self.transfer(caller, to, *amount),
            Operation::TransferFrom {
                caller,
                owner,
                to,
                amount,
            } => self.transfer_from(caller, owner, to, *amount),
        }
    }

    /// Grants `spender` the right to move up to `amount` of the caller's
    /// units, replacing any earlier grant. Only succeeds while the caller
    /// actually holds at least `amount`.
    pub fn approve(&mut self, caller: &str, spender: &str, amount: Amount) -> LedgerResult {
        let balance = self.balances.balance_of(caller);
        if balance < amount {
            return Ok(self.reject(
                "approve",
                Rejection::InsufficientBalance {
                    account: caller.to_string(),
                    balance,
                    requested: amount,
                },
            ));
        }

        self.balances.touch(caller);
        self.allowances.set_allowance(caller, spender, amount);
        Ok(self.commit(LedgerEvent::Approval {
            owner: caller.to_string(),
            spender: spender.to_string(),
            value: amount,
        }))
    }

    /// Moves `amount` from the caller to `to`. Insufficient balance aborts
    /// with an error rather than a rejection. Zero-value transfers commit
    /// and emit like any other.
    pub fn transfer(&mut self, caller: &str, to: &str, amount: Amount) -> LedgerResult {
        if let Err(err) = self.balances.debit(caller, amount) {
            warn!("transfer {caller} -> {to} ({amount}) aborted: {err}");
            return Err(err);
        }
        self.balances.credit(to, amount);
        Ok(self.commit(LedgerEvent::Transfer {
            from: caller.to_string(),
            to: to.to_string(),
            value: amount,
        }))
    }

    /// Moves `amount` from `owner` to `to` on the strength of the allowance
    /// `owner` granted the caller. Never aborts on missing allowance or
    /// funds; the outcome is a rejection instead.
    pub fn transfer_from(&mut self, caller: &str, owner: &str, to: &str, amount: Amount) -> LedgerResult {
        let allowance = self.allowances.allowance(owner, caller);
        if allowance < amount {
            return Ok(self.reject(
                "transfer_from",
                Rejection::InsufficientAllowance {
                    owner: owner.to_string(),
                    spender: caller.to_string(),
                    allowance,
                    requested: amount,
                },
            ));
        }
        let balance = self.balances.balance_of(owner);
        if balance < amount {
            return Ok(self.reject(
                "transfer_from",
                Rejection::InsufficientBalance {
                    account: owner.to_string(),
                    balance,
                    requested: amount,
                },
            ));
        }

        // Both preconditions hold, so neither primitive below can fail.
        self.allowances.consume_allowance(owner, caller, amount)?;
        self.balances.debit(owner, amount)?;
        self.balances.credit(to, amount);
        Ok(self.commit(LedgerEvent::Transfer {
            from: owner.to_string(),
            to: to.to_string(),
            value: amount,
        }))
    }

    fn commit(&mut self, event: LedgerEvent) -> Outcome {
        let seq = self.events.append(event.clone());
        debug!("committed #{seq}: {event:?}");
        Outcome::Committed(EventRecord { seq, event })
    }

    fn reject(&self, op: &str, rejection: Rejection) -> Outcome {
        debug!("{op} rejected: {rejection}");
        Outcome::Rejected(rejection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const G: &str = "genesis";

    fn ledger() -> Ledger {
        Ledger::default()
    }

    #[test]
    fn approve_with_funds_sets_allowance_and_emits_once() {
        let mut ledger = ledger();
        let outcome = ledger.approve(G, "spender", 1).unwrap();
        assert!(outcome.succeeded());
        assert_eq!(ledger.allowance(G, "spender"), 1);
        assert_eq!(ledger.events().len(), 1);
        assert_eq!(
            outcome.event(),
            Some(&LedgerEvent::Approval {
                owner: G.into(),
                spender: "spender".into(),
                value: 1,
            })
        );
    }

    #[test]
    fn approve_beyond_balance_is_rejected_quietly() {
        let mut ledger = ledger();
        ledger.approve(G, "spender", 7).unwrap();
        let root = ledger.state_root();

        let outcome = ledger.approve(G, "spender", 1_000_001).unwrap();
        assert!(!outcome.succeeded());
        assert!(matches!(
            outcome.rejection(),
            Some(Rejection::InsufficientBalance { requested: 1_000_001, .. })
        ));
        assert_eq!(ledger.allowance(G, "spender"), 7);
        assert_eq!(ledger.events().len(), 1);
        assert_eq!(ledger.state_root(), root);
    }

    #[test]
    fn approve_overwrites() {
        let mut ledger = ledger();
        assert!(ledger.approve(G, "x", 15).unwrap().succeeded());
        assert_eq!(ledger.allowance(G, "x"), 15);
        assert!(ledger.approve(G, "x", 24).unwrap().succeeded());
        assert_eq!(ledger.allowance(G, "x"), 24);
        assert_eq!(ledger.events().len(), 2);
    }

    #[test]
    fn zero_approve_from_unseen_account_registers_it() {
        let mut ledger = ledger();
        assert!(ledger.approve("newcomer", "x", 0).unwrap().succeeded());
        assert_eq!(ledger.balance_of("newcomer"), 0);
        assert!(ledger.accounts().any(|(a, _)| a == "newcomer"));
    }

    #[test]
    fn transfer_over_balance_aborts_without_side_effects() {
        let mut ledger = ledger();
        let err = ledger.transfer(G, "x", 1_000_001).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientBalance {
                account: G.into(),
                balance: 1_000_000,
                requested: 1_000_001,
            }
        );
        assert_eq!(ledger.balance_of(G), 1_000_000);
        assert_eq!(ledger.balance_of("x"), 0);
        assert!(ledger.events().is_empty());
        assert_eq!(ledger.accounts().count(), 1);
    }

    #[test]
    fn transfer_moves_units() {
        let mut ledger = ledger();
        let outcome = ledger.transfer(G, "x", 10).unwrap();
        assert!(outcome.succeeded());
        assert_eq!(ledger.balance_of(G), 999_990);
        assert_eq!(ledger.balance_of("x"), 10);
        assert_eq!(
            outcome,
            Outcome::Committed(EventRecord {
                seq: 0,
                event: LedgerEvent::Transfer {
                    from: G.into(),
                    to: "x".into(),
                    value: 10,
                },
            })
        );
    }

    #[test]
    fn zero_transfer_still_emits() {
        let mut ledger = ledger();
        let outcome = ledger.transfer(G, "x", 0).unwrap();
        assert!(outcome.succeeded());
        assert_eq!(ledger.balance_of(G), 1_000_000);
        assert_eq!(ledger.balance_of("x"), 0);
        assert_eq!(ledger.events().len(), 1);
        assert_eq!(
            outcome,
            Outcome::Committed(EventRecord {
                seq: 0,
                event: LedgerEvent::Transfer {
                    from: G.into(),
                    to: "x".into(),
                    value: 0,
                },
            })
        );
    }

    #[test]
    fn zero_transfer_from_without_grant_creates_no_allowance() {
        let mut ledger = ledger();
        let root = ledger.state_root();
        let outcome = ledger.transfer_from("stranger", G, G, 0).unwrap();
        assert!(outcome.succeeded());
        assert_eq!(
            outcome.event(),
            Some(&LedgerEvent::Transfer {
                from: G.into(),
                to: G.into(),
                value: 0,
            })
        );
        assert!(ledger.snapshot().allowances.is_empty());
        assert_eq!(ledger.allowance(G, "stranger"), 0);
        assert_eq!(ledger.state_root(), root);
    }

    #[test]
    fn self_transfer_is_a_no_op_on_balances() {
        let mut ledger = ledger();
        assert!(ledger.transfer(G, G, 500).unwrap().succeeded());
        assert_eq!(ledger.balance_of(G), 1_000_000);
        ledger.check_conservation().unwrap();
    }

    #[test]
    fn transfer_from_without_approval_is_rejected() {
        let mut ledger = ledger();
        let outcome = ledger.transfer_from("x", G, "x", 10).unwrap();
        assert!(!outcome.succeeded());
        assert!(matches!(
            outcome.rejection(),
            Some(Rejection::InsufficientAllowance { allowance: 0, requested: 10, .. })
        ));
        assert!(ledger.events().is_empty());
        assert_eq!(ledger.balance_of(G), 1_000_000);
    }

    #[test]
    fn transfer_from_with_approval_spends_allowance() {
        let mut ledger = ledger();
        ledger.approve(G, "x", 15).unwrap();
        let outcome = ledger.transfer_from("x", G, "x", 10).unwrap();
        assert!(outcome.succeeded());
        assert_eq!(ledger.allowance(G, "x"), 5);
        assert_eq!(ledger.balance_of(G), 999_990);
        assert_eq!(ledger.balance_of("x"), 10);
        assert_eq!(
            outcome.event(),
            Some(&LedgerEvent::Transfer {
                from: G.into(),
                to: "x".into(),
                value: 10,
            })
        );
    }

    #[test]
    fn transfer_from_with_allowance_but_drained_owner_is_rejected() {
        let mut ledger = ledger();
        ledger.approve(G, "spender", 100).unwrap();
        ledger.transfer(G, "sink", 999_950).unwrap();
        let root = ledger.state_root();
        let events = ledger.events().len();

        let outcome = ledger.transfer_from("spender", G, "spender", 60).unwrap();
        assert!(matches!(
            outcome.rejection(),
            Some(Rejection::InsufficientBalance { balance: 50, requested: 60, .. })
        ));
        assert_eq!(ledger.allowance(G, "spender"), 100);
        assert_eq!(ledger.events().len(), events);
        assert_eq!(ledger.state_root(), root);
    }

    #[test]
    fn apply_dispatches_operations() {
        let mut ledger = ledger();
        let ops: Vec<Operation> = serde_json::from_str(
            r#"[
                {"op":"transfer","caller":"genesis","to":"x","amount":10},
                {"op":"approve","caller":"genesis","spender":"x","amount":15},
                {"op":"transfer_from","caller":"x","owner":"genesis","to":"x","amount":10}
            ]"#,
        )
        .unwrap();
        for op in &ops {
            assert!(ledger.apply(op).unwrap().succeeded());
        }
        assert_eq!(ledger.balance_of(G), 999_980);
        assert_eq!(ledger.balance_of("x"), 20);
        assert_eq!(ledger.allowance(G, "x"), 5);
        let seqs: Vec<u64> = ledger.events().records().iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
    }

    #[test]
    fn rejection_serializes_with_reason_tag() {
        let json = serde_json::to_value(Rejection::InsufficientAllowance {
            owner: "o".into(),
            spender: "s".into(),
            allowance: 0,
            requested: 1,
        })
        .unwrap();
        assert_eq!(json["reason"], "insufficient_allowance");
        assert_eq!(json["requested"], 1);
    }
}
