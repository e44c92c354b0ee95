//! Infrastructure layer: the transaction coordinator that owns the atomic
//! scope, in-memory implementations of the catalog and notification ports,
//! and the optional RocksDB persistence backend.

pub mod catalog;
pub mod coordinator;
pub mod notify;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
