use crate::domain::ports::LedgerBackendBox;
use crate::domain::state::LedgerState;
use crate::error::Result;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Owner of the atomic-scope lifecycle.
///
/// Every state transition runs as a closure against a staged copy of the
/// ledger state while the write lock is held: precondition checks and
/// writes happen inside the same scope, so concurrent conflicting calls
/// are linearized and the loser observes a clean domain error, never a
/// partially-applied state. An error from the unit (or from the backend
/// persist) discards the staged copy entirely.
#[derive(Clone)]
pub struct TransactionCoordinator {
    state: Arc<RwLock<LedgerState>>,
    backend: Option<Arc<LedgerBackendBox>>,
}

impl TransactionCoordinator {
    pub fn in_memory() -> Self {
        Self {
            state: Arc::new(RwLock::new(LedgerState::default())),
            backend: None,
        }
    }

    /// Recovers the ledger from a durable backend; every future commit is
    /// persisted through it before becoming visible.
    pub fn with_backend(backend: LedgerBackendBox) -> Result<Self> {
        let state = backend.load()?;
        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            backend: Some(Arc::new(backend)),
        })
    }

    /// Runs one atomic unit: all of the unit's writes commit, or none do.
    pub async fn execute<T>(&self, unit: impl FnOnce(&mut LedgerState) -> Result<T>) -> Result<T> {
        let mut guard = self.state.write().await;
        let mut staged = guard.clone();
        let out = unit(&mut staged)?;
        if let Some(backend) = &self.backend {
            backend.persist(&staged)?;
        }
        *guard = staged;
        Ok(out)
    }

    /// Read view. Not linearized with in-flight units; fine for listings
    /// and balance displays, never used for transition preconditions.
    pub async fn read<T>(&self, f: impl FnOnce(&LedgerState) -> T) -> T {
        let guard = self.state.read().await;
        f(&guard)
    }
}
