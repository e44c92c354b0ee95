use crate::domain::account::BalanceAccount;
use crate::domain::order::Order;
use crate::error::Result;
use std::io::Write;

/// Writes the final account balances as CSV: `owner_kind,owner,balance`.
/// Balances are printed normalized (no trailing zeros).
pub struct AccountWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> AccountWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_accounts(&mut self, accounts: Vec<BalanceAccount>) -> Result<()> {
        self.writer
            .write_record(["owner_kind", "owner", "balance"])?;
        for account in accounts {
            self.writer.write_record([
                account.owner.kind.as_str(),
                &account.owner.id.to_string(),
                &account.balance.to_string(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes the final order states as CSV:
/// `order,client,company,amount,status,payment_status`.
pub struct OrderWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OrderWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_orders(&mut self, orders: Vec<Order>) -> Result<()> {
        self.writer.write_record([
            "order",
            "client",
            "company",
            "amount",
            "status",
            "payment_status",
        ])?;
        for order in orders {
            self.writer.write_record([
                &order.id.to_string(),
                &order.client_id.to_string(),
                &order.company_id.to_string(),
                &order.amount.to_string(),
                order.status.as_str(),
                order.payment_status.as_str(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
