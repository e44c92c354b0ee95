use crate::domain::account::{AccountTable, BalanceAccount};
use crate::domain::escrow::{EscrowEntry, EscrowLog};
use crate::domain::ledger::{BalanceEntry, BalanceLog};
use crate::domain::order::{Order, OrderTable};
use crate::domain::ports::LedgerBackend;
use crate::domain::state::LedgerState;
use crate::domain::token::{TokenTable, WorkerToken};
use crate::error::{EngineError, Result};
use rocksdb::{ColumnFamilyDescriptor, DB, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

pub const CF_ORDERS: &str = "orders";
pub const CF_ACCOUNTS: &str = "accounts";
pub const CF_ESCROW: &str = "escrow";
pub const CF_ENTRIES: &str = "entries";
pub const CF_TOKENS: &str = "tokens";

const ALL_CFS: [&str; 5] = [CF_ORDERS, CF_ACCOUNTS, CF_ESCROW, CF_ENTRIES, CF_TOKENS];

/// Durable ledger storage on RocksDB, one column family per table.
///
/// Rows are JSON-encoded and written through a single `WriteBatch` per
/// commit, so a committed unit is either fully on disk or not at all.
/// Rows are never deleted (the ledger is append-only and orders are never
/// removed), which keeps persist a plain overwrite.
#[derive(Clone)]
pub struct RocksDbBackend {
    db: Arc<DB>,
}

impl RocksDbBackend {
    /// Opens or creates the database and its column families.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = ALL_CFS
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect::<Vec<_>>();
        let db = DB::open_cf_descriptors(&opts, path, cfs)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| EngineError::Internal(format!("column family {name} not found")))
    }

    fn rows<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut rows = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            rows.push(serde_json::from_slice(&value)?);
        }
        Ok(rows)
    }

    fn put<T: Serialize>(&self, batch: &mut WriteBatch, cf_name: &str, key: &[u8], row: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        batch.put_cf(cf, key, serde_json::to_vec(row)?);
        Ok(())
    }
}

impl LedgerBackend for RocksDbBackend {
    fn load(&self) -> Result<LedgerState> {
        let orders: Vec<Order> = self.rows(CF_ORDERS)?;
        let accounts: Vec<BalanceAccount> = self.rows(CF_ACCOUNTS)?;
        let escrow: Vec<EscrowEntry> = self.rows(CF_ESCROW)?;
        let entries: Vec<BalanceEntry> = self.rows(CF_ENTRIES)?;
        let tokens: Vec<WorkerToken> = self.rows(CF_TOKENS)?;

        Ok(LedgerState::from_parts(
            OrderTable::from_rows(orders),
            AccountTable::from_rows(accounts),
            EscrowLog::from_rows(escrow),
            BalanceLog::from_rows(entries),
            TokenTable::from_rows(tokens),
        ))
    }

    fn persist(&self, state: &LedgerState) -> Result<()> {
        let mut batch = WriteBatch::default();

        for order in state.orders.iter() {
            self.put(&mut batch, CF_ORDERS, &order.id.to_be_bytes(), order)?;
        }
        for account in state.accounts.iter() {
            let key = account.owner.to_string();
            self.put(&mut batch, CF_ACCOUNTS, key.as_bytes(), account)?;
        }
        for entry in state.escrow.iter() {
            self.put(&mut batch, CF_ESCROW, &entry.id.to_be_bytes(), entry)?;
        }
        for entry in state.entries.iter() {
            self.put(&mut batch, CF_ENTRIES, &entry.id.to_be_bytes(), entry)?;
        }
        for token in state.tokens.iter() {
            self.put(&mut batch, CF_TOKENS, token.token.as_bytes(), token)?;
        }

        self.db.write(batch)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Amount;
    use crate::domain::owner::OwnerRef;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_column_families() {
        let dir = tempdir().unwrap();
        let backend = RocksDbBackend::open(dir.path()).expect("failed to open RocksDB");
        for name in ALL_CFS {
            assert!(backend.db.cf_handle(name).is_some());
        }
    }

    #[test]
    fn test_persist_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let now = Utc::now();
        let amount = Amount::new(dec!(500.0)).unwrap();

        let mut state = LedgerState::default();
        state
            .accounts
            .credit(OwnerRef::client(1), Amount::new(dec!(1000.0)).unwrap());
        let order = state.orders.create(1, 1, 1, amount, "clean".into(), now);
        state.hold_funds(order.id, now).unwrap();

        {
            let backend = RocksDbBackend::open(dir.path()).unwrap();
            backend.persist(&state).unwrap();
        }

        let backend = RocksDbBackend::open(dir.path()).unwrap();
        let loaded = backend.load().unwrap();

        assert_eq!(loaded.orders.get(order.id).unwrap().amount, amount);
        assert_eq!(
            loaded.accounts.balance(OwnerRef::client(1)).value(),
            dec!(500.0)
        );
        assert_eq!(loaded.escrow.held(order.id), dec!(500.0));

        // Id allocation resumes after the highest persisted id
        let mut loaded = loaded;
        let next = loaded.orders.create(2, 1, 1, amount, String::new(), now);
        assert_eq!(next.id, order.id + 1);
    }
}
