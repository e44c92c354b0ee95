use crate::domain::money::Amount;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum EscrowKind {
    Hold,
    Release,
    Refund,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum EscrowStatus {
    Pending,
    Completed,
    Failed,
}

/// A party of a fund movement.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum EscrowParty {
    Client,
    Company,
    Escrow,
    System,
}

/// One fund movement tied to an order. Append-only; only `status` may be
/// finalized after creation.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct EscrowEntry {
    pub id: u32,
    pub order_id: u32,
    pub amount: Amount,
    pub kind: EscrowKind,
    pub status: EscrowStatus,
    pub from_party: EscrowParty,
    pub to_party: EscrowParty,
    pub created_at: DateTime<Utc>,
}

/// Append-only log of escrow fund movements.
#[derive(Debug, Default, Clone)]
pub struct EscrowLog {
    entries: Vec<EscrowEntry>,
}

impl EscrowLog {
    pub fn append(
        &mut self,
        order_id: u32,
        amount: Amount,
        kind: EscrowKind,
        from_party: EscrowParty,
        to_party: EscrowParty,
        now: DateTime<Utc>,
    ) -> &EscrowEntry {
        let entry = EscrowEntry {
            id: self.entries.len() as u32 + 1,
            order_id,
            amount,
            kind,
            status: EscrowStatus::Completed,
            from_party,
            to_party,
            created_at: now,
        };
        self.entries.push(entry);
        // Just pushed above
        &self.entries[self.entries.len() - 1]
    }

    pub fn by_order(&self, order_id: u32) -> Vec<EscrowEntry> {
        self.entries
            .iter()
            .filter(|e| e.order_id == order_id)
            .cloned()
            .collect()
    }

    fn sum(&self, order_id: u32, kind: EscrowKind) -> Decimal {
        self.entries
            .iter()
            .filter(|e| e.order_id == order_id && e.kind == kind && e.status == EscrowStatus::Completed)
            .map(|e| e.amount.value())
            .sum()
    }

    /// Funds currently sitting in escrow for an order: Σ hold − Σ release − Σ refund.
    pub fn held(&self, order_id: u32) -> Decimal {
        self.sum(order_id, EscrowKind::Hold)
            - self.sum(order_id, EscrowKind::Release)
            - self.sum(order_id, EscrowKind::Refund)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EscrowEntry> {
        self.entries.iter()
    }

    pub fn from_rows(mut rows: Vec<EscrowEntry>) -> Self {
        rows.sort_by_key(|e| e.id);
        Self { entries: rows }
    }
}
