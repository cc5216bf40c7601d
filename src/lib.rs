//! Accounting core of the VCoin fungible-token ledger.
//!
//! The crate is organised around a single [`Ledger`] value that a host owns
//! and drives:
//!
//! * [`ledger`] — metadata fixed at genesis, the balance and allowance
//!   stores, the append-only event log and state-root snapshots.
//! * [`engine`] — `approve`, `transfer` and `transfer_from`, each an
//!   all-or-nothing validate-then-mutate step returning a tagged
//!   [`Outcome`] or a hard [`LedgerError`].
//! * [`config`] — genesis parameters loaded from JSON.
//! * [`host`] — a mutex-serialised handle for multi-threaded hosts.
//!
//! The total supply is minted once, to one account, at construction; no
//! operation creates or destroys units afterwards.

pub mod config;
pub mod engine;
pub mod host;
pub mod ledger;

mod error;

pub use config::GenesisConfig;
pub use engine::{LedgerResult, Operation, Outcome, Rejection};
pub use error::{ConfigError, LedgerError};
pub use host::SharedLedger;
pub use ledger::{
    AccountId, Amount, EventLog, EventRecord, Ledger, LedgerEvent, LedgerSnapshot, Metadata,
};
