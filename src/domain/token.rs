use crate::error::{EngineError, Result};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Token validity window after issuance.
const TOKEN_TTL_DAYS: i64 = 7;

/// A single-use completion token handed to the worker.
///
/// The token string is the only credential for the "work delivered"
/// transition; workers hold no account. Unguessability plus the single-use
/// and expiry checks are therefore the whole security boundary for that
/// path.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct WorkerToken {
    pub order_id: u32,
    pub token: String,
    pub is_used: bool,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl WorkerToken {
    /// Issues a fresh token: 32 bytes from the OS RNG, hex-encoded.
    pub fn issue(order_id: u32, now: DateTime<Utc>) -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Self {
            order_id,
            token: hex::encode(bytes),
            is_used: false,
            issued_at: now,
            expires_at: now + Duration::days(TOKEN_TTL_DAYS),
        }
    }

    /// Redemption-time validity. Expiry is checked lazily here; there is no
    /// background sweep.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<()> {
        if self.is_used {
            return Err(EngineError::TokenUsed);
        }
        if self.expires_at <= now {
            return Err(EngineError::TokenExpired);
        }
        Ok(())
    }
}

/// Issued tokens keyed by token string.
#[derive(Debug, Default, Clone)]
pub struct TokenTable {
    tokens: HashMap<String, WorkerToken>,
}

impl TokenTable {
    pub fn insert(&mut self, token: WorkerToken) {
        self.tokens.insert(token.token.clone(), token);
    }

    pub fn get(&self, token: &str) -> Result<&WorkerToken> {
        self.tokens
            .get(token)
            .ok_or(EngineError::NotFound("worker token"))
    }

    pub fn mark_used(&mut self, token: &str) -> Result<()> {
        let entry = self
            .tokens
            .get_mut(token)
            .ok_or(EngineError::NotFound("worker token"))?;
        entry.is_used = true;
        Ok(())
    }

    /// Unused, unexpired tokens for an order. At most one may exist; the
    /// ledger audit checks that.
    pub fn active_for_order(
        &self,
        order_id: u32,
        now: DateTime<Utc>,
    ) -> impl Iterator<Item = &WorkerToken> {
        self.tokens
            .values()
            .filter(move |t| t.order_id == order_id && !t.is_used && t.expires_at > now)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkerToken> {
        self.tokens.values()
    }

    pub fn from_rows(rows: Vec<WorkerToken>) -> Self {
        Self {
            tokens: rows.into_iter().map(|t| (t.token.clone(), t)).collect(),
        }
    }
}
