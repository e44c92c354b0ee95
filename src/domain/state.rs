use crate::domain::account::AccountTable;
use crate::domain::escrow::{EscrowKind, EscrowLog, EscrowParty};
use crate::domain::ledger::{BalanceLog, EntryKind};
use crate::domain::order::OrderTable;
use crate::domain::owner::OwnerRef;
use crate::domain::token::TokenTable;
use crate::error::Result;
use chrono::{DateTime, Utc};

/// The five tables of the settlement store.
///
/// `LedgerState` is pure data: no locking, no IO. The transaction
/// coordinator hands a staged copy of it to each atomic unit and discards
/// the copy on error, so every method here may assume it runs inside one
/// unit and mutate freely.
#[derive(Debug, Default, Clone)]
pub struct LedgerState {
    pub orders: OrderTable,
    pub accounts: AccountTable,
    pub escrow: EscrowLog,
    pub entries: BalanceLog,
    pub tokens: TokenTable,
}

impl LedgerState {
    pub fn from_parts(
        orders: OrderTable,
        accounts: AccountTable,
        escrow: EscrowLog,
        entries: BalanceLog,
        tokens: TokenTable,
    ) -> Self {
        Self {
            orders,
            accounts,
            escrow,
            entries,
            tokens,
        }
    }

    /// Moves the order amount from the client into escrow: debit, `hold`
    /// escrow entry, negative `payment` audit entry. The balance check
    /// happens inside the same unit as the debit, closing the
    /// check-then-act window.
    pub fn hold_funds(&mut self, order_id: u32, now: DateTime<Utc>) -> Result<()> {
        let order = self.orders.get(order_id)?;
        let (client, amount) = (OwnerRef::client(order.client_id), order.amount);

        self.accounts.debit(client, amount)?;
        self.escrow.append(
            order_id,
            amount,
            EscrowKind::Hold,
            EscrowParty::Client,
            EscrowParty::Escrow,
            now,
        );
        self.entries.append(
            client,
            -amount.value(),
            EntryKind::Payment,
            Some(order_id),
            format!("Payment for order #{order_id}"),
            now,
        );
        Ok(())
    }

    /// Releases the escrowed amount to the company: credit, `release`
    /// escrow entry, positive `payment` audit entry. The only credit the
    /// company ever receives for an order.
    pub fn release_funds(&mut self, order_id: u32, now: DateTime<Utc>) -> Result<()> {
        let order = self.orders.get(order_id)?;
        let (company, amount) = (OwnerRef::company(order.company_id), order.amount);

        self.accounts.credit(company, amount);
        self.escrow.append(
            order_id,
            amount,
            EscrowKind::Release,
            EscrowParty::Escrow,
            EscrowParty::Company,
            now,
        );
        self.entries.append(
            company,
            amount.value(),
            EntryKind::Payment,
            Some(order_id),
            format!("Payment for order #{order_id}"),
            now,
        );
        Ok(())
    }

    /// Returns the escrowed amount to the client: credit, `refund` escrow
    /// entry, positive `refund` audit entry.
    pub fn refund_funds(&mut self, order_id: u32, now: DateTime<Utc>) -> Result<()> {
        let order = self.orders.get(order_id)?;
        let (client, amount) = (OwnerRef::client(order.client_id), order.amount);

        self.accounts.credit(client, amount);
        self.escrow.append(
            order_id,
            amount,
            EscrowKind::Refund,
            EscrowParty::Escrow,
            EscrowParty::Client,
            now,
        );
        self.entries.append(
            client,
            amount.value(),
            EntryKind::Refund,
            Some(order_id),
            format!("Refund for cancelled order #{order_id}"),
            now,
        );
        Ok(())
    }

    /// Reconciliation check: every account balance equals the running sum
    /// of its audit entries, no escrow pot is overdrawn, and no order has
    /// more than one active worker token. Used by the test suites and
    /// operational tooling, never on the hot path.
    pub fn audit(&self) -> Result<()> {
        use crate::error::EngineError;

        for owner in self.entries.owners() {
            let balance = self.accounts.balance(owner).value();
            let logged = self.entries.sum_for(owner);
            if balance != logged {
                return Err(EngineError::Internal(format!(
                    "balance drift for {owner}: account {balance}, log {logged}"
                )));
            }
        }
        for order in self.orders.iter() {
            let held = self.escrow.held(order.id);
            if held < rust_decimal::Decimal::ZERO {
                return Err(EngineError::Internal(format!(
                    "escrow overdrawn for order {}: {held}",
                    order.id
                )));
            }
            if order.status.is_terminal() && held != rust_decimal::Decimal::ZERO {
                return Err(EngineError::Internal(format!(
                    "escrow not settled for terminal order {}: {held}",
                    order.id
                )));
            }
        }
        let now = Utc::now();
        for order in self.orders.iter() {
            let active = self.tokens.active_for_order(order.id, now).count();
            if active > 1 {
                return Err(EngineError::Internal(format!(
                    "{active} active worker tokens for order {}",
                    order.id
                )));
            }
        }
        Ok(())
    }
}
