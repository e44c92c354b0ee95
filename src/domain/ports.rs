use crate::domain::money::Amount;
use crate::domain::owner::OwnerRef;
use crate::domain::state::LedgerState;
use crate::error::Result;
use async_trait::async_trait;
use std::io;

/// A service card as resolved by the catalog collaborator: who offers it
/// and at what price. The price becomes the order amount at creation time.
#[derive(Debug, PartialEq, Clone)]
pub struct ServiceCard {
    pub id: u32,
    pub company_id: u32,
    pub price: Amount,
    pub title: String,
}

/// Lookup port into the service-listing subsystem.
#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    async fn lookup(&self, service_id: u32) -> Result<Option<ServiceCard>>;
}

/// A message for a client or company about an order transition.
#[derive(Debug, PartialEq, Clone)]
pub struct Notification {
    pub owner: OwnerRef,
    pub title: String,
    pub message: String,
    pub order_id: Option<u32>,
}

/// Delivery port for notifications. Invoked after a transition commits;
/// a delivery failure never rolls the transition back.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, note: Notification) -> io::Result<()>;
}

/// Durable storage behind the transaction coordinator.
///
/// `persist` is called under the commit lock with the fully staged state;
/// it must write all of it or none of it. A persist failure aborts the
/// commit.
pub trait LedgerBackend: Send + Sync {
    fn load(&self) -> Result<LedgerState>;
    fn persist(&self, state: &LedgerState) -> Result<()>;
}

pub type ServiceCatalogRef = std::sync::Arc<dyn ServiceCatalog>;
pub type NotificationSinkRef = std::sync::Arc<dyn NotificationSink>;
pub type LedgerBackendBox = Box<dyn LedgerBackend>;
