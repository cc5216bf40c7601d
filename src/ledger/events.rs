use serde::{Deserialize, Serialize};

use super::{AccountId, Amount};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    Approval {
        owner: AccountId,
        spender: AccountId,
        value: Amount,
    },
    Transfer {
        from: AccountId,
        to: AccountId,
        value: Amount,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventRecord {
    pub seq: u64,
    #[serde(flatten)]
    pub event: LedgerEvent,
}

/// Append-only, in commit order. Sequence numbers start at 0 and never skip.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&EventRecord> {
        self.records.last()
    }

    /// Records with `seq >= from`, for consumers resuming where they left off.
    pub fn since(&self, from: u64) -> &[EventRecord] {
        let start = usize::try_from(from)
            .unwrap_or(usize::MAX)
            .min(self.records.len());
        &self.records[start..]
    }

    pub fn iter(&self) -> impl Iterator<Item = &LedgerEvent> {
        self.records.iter().map(|r| &r.event)
    }

    pub(crate) fn append(&mut self, event: LedgerEvent) -> u64 {
        let seq = self.records.len() as u64;
        self.records.push(EventRecord { seq, event });
        seq
    }
}
