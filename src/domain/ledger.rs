use crate::domain::owner::OwnerRef;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Deposit,
    Withdrawal,
    Payment,
    Refund,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Pending,
    Completed,
    Failed,
}

/// One signed balance delta in the audit trail.
///
/// For every owner the account balance must equal the running sum of these
/// amounts; that is the reconciliation contract of the store.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct BalanceEntry {
    pub id: u32,
    pub owner: OwnerRef,
    pub amount: Decimal,
    pub kind: EntryKind,
    pub status: EntryStatus,
    pub order_id: Option<u32>,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Append-only log of every balance delta ever applied.
#[derive(Debug, Default, Clone)]
pub struct BalanceLog {
    entries: Vec<BalanceEntry>,
}

impl BalanceLog {
    #[allow(clippy::too_many_arguments)]
    pub fn append(
        &mut self,
        owner: OwnerRef,
        amount: Decimal,
        kind: EntryKind,
        order_id: Option<u32>,
        description: String,
        now: DateTime<Utc>,
    ) -> &BalanceEntry {
        let entry = BalanceEntry {
            id: self.entries.len() as u32 + 1,
            owner,
            amount,
            kind,
            status: EntryStatus::Completed,
            order_id,
            description,
            created_at: now,
        };
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Newest first, matching how histories are displayed.
    pub fn by_owner(&self, owner: OwnerRef) -> Vec<BalanceEntry> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .filter(|e| e.owner == owner)
            .cloned()
            .collect();
        entries.reverse();
        entries
    }

    /// Running sum of all completed deltas for an owner.
    pub fn sum_for(&self, owner: OwnerRef) -> Decimal {
        self.entries
            .iter()
            .filter(|e| e.owner == owner && e.status == EntryStatus::Completed)
            .map(|e| e.amount)
            .sum()
    }

    pub fn owners(&self) -> Vec<OwnerRef> {
        let mut owners: Vec<_> = self.entries.iter().map(|e| e.owner).collect();
        owners.sort_by_key(|o| (o.kind.as_str(), o.id));
        owners.dedup();
        owners
    }

    pub fn iter(&self) -> impl Iterator<Item = &BalanceEntry> {
        self.entries.iter()
    }

    pub fn from_rows(mut rows: Vec<BalanceEntry>) -> Self {
        rows.sort_by_key(|e| e.id);
        Self { entries: rows }
    }
}
