use crate::domain::money::Amount;
use crate::domain::ports::{ServiceCard, ServiceCatalog};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory service catalog.
///
/// The real listing subsystem lives elsewhere; this implementation backs
/// the CLI and the test suites with sequentially numbered cards.
#[derive(Default, Clone)]
pub struct InMemoryCatalog {
    cards: Arc<RwLock<HashMap<u32, ServiceCard>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a card and assigns the next sequential id.
    pub async fn register(&self, company_id: u32, title: &str, price: Amount) -> ServiceCard {
        let mut cards = self.cards.write().await;
        let id = cards.len() as u32 + 1;
        let card = ServiceCard {
            id,
            company_id,
            price,
            title: title.to_string(),
        };
        cards.insert(id, card.clone());
        card
    }
}

#[async_trait]
impl ServiceCatalog for InMemoryCatalog {
    async fn lookup(&self, service_id: u32) -> Result<Option<ServiceCard>> {
        let cards = self.cards.read().await;
        Ok(cards.get(&service_id).cloned())
    }
}
