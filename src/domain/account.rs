use crate::domain::money::{Amount, Balance};
use crate::domain::owner::OwnerRef;
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One balance account per (owner id, owner kind).
///
/// The balance is never negative; it is only mutated through
/// `credit`/`debit` inside a coordinator unit.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct BalanceAccount {
    pub owner: OwnerRef,
    pub balance: Balance,
}

impl BalanceAccount {
    pub fn new(owner: OwnerRef) -> Self {
        Self {
            owner,
            balance: Balance::ZERO,
        }
    }

    pub fn credit(&mut self, amount: Amount) {
        self.balance += amount.into();
    }

    pub fn debit(&mut self, amount: Amount) -> Result<()> {
        if self.balance >= amount.into() {
            self.balance -= amount.into();
            Ok(())
        } else {
            Err(EngineError::InsufficientFunds {
                available: self.balance.value(),
                required: amount.value(),
            })
        }
    }
}

/// The set of balance accounts, keyed by owner.
///
/// Accounts are created lazily on first credit; a debit against a missing
/// account fails like a debit against a zero balance.
#[derive(Debug, Default, Clone)]
pub struct AccountTable {
    accounts: HashMap<OwnerRef, BalanceAccount>,
}

impl AccountTable {
    pub fn balance(&self, owner: OwnerRef) -> Balance {
        self.accounts
            .get(&owner)
            .map(|a| a.balance)
            .unwrap_or(Balance::ZERO)
    }

    pub fn credit(&mut self, owner: OwnerRef, amount: Amount) -> Balance {
        let account = self
            .accounts
            .entry(owner)
            .or_insert_with(|| BalanceAccount::new(owner));
        account.credit(amount);
        account.balance
    }

    pub fn debit(&mut self, owner: OwnerRef, amount: Amount) -> Result<Balance> {
        let account = self
            .accounts
            .entry(owner)
            .or_insert_with(|| BalanceAccount::new(owner));
        account.debit(amount)?;
        Ok(account.balance)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BalanceAccount> {
        self.accounts.values()
    }

    /// Accounts sorted by (kind, id) for stable reporting.
    pub fn all(&self) -> Vec<BalanceAccount> {
        let mut accounts: Vec<_> = self.accounts.values().cloned().collect();
        accounts.sort_by_key(|a| (a.owner.kind.as_str(), a.owner.id));
        accounts
    }

    pub fn from_rows(rows: Vec<BalanceAccount>) -> Self {
        Self {
            accounts: rows.into_iter().map(|a| (a.owner, a)).collect(),
        }
    }
}
