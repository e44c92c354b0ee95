use crate::domain::order::OrderStatus;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors produced by the settlement engine and its interfaces.
///
/// Domain errors (`Validation` through `TokenExpired`) are part of the
/// engine's contract; the remaining variants surface infrastructure
/// failures and signal the caller to retry the whole call.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Authorization(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("order {order} cannot be {action} while {status}")]
    StateConflict {
        order: u32,
        action: &'static str,
        status: OrderStatus,
    },

    #[error("insufficient balance: available {available}, required {required}")]
    InsufficientFunds {
        available: Decimal,
        required: Decimal,
    },

    #[error("worker token has already been used")]
    TokenUsed,

    #[error("worker token has expired")]
    TokenExpired,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for EngineError {
    fn from(e: rocksdb::Error) -> Self {
        EngineError::Internal(e.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Internal(format!("serialization error: {e}"))
    }
}
