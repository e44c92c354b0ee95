use crate::domain::money::Amount;
use crate::domain::order::{Order, OrderStatus, PaymentStatus};
use crate::domain::owner::{Actor, OwnerKind};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Read-side projection of an order for one actor, with the actions
/// currently available to them.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct OrderView {
    pub id: u32,
    pub client_id: u32,
    pub company_id: u32,
    pub service_id: u32,
    pub amount: Amount,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub description: String,
    pub worker_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub can_cancel: bool,
    pub can_pay: bool,
    pub can_rate: bool,
}

impl OrderView {
    pub fn project(order: &Order, actor: Actor) -> Self {
        let is_client = actor.kind() == OwnerKind::Client;
        Self {
            id: order.id,
            client_id: order.client_id,
            company_id: order.company_id,
            service_id: order.service_id,
            amount: order.amount,
            status: order.status,
            payment_status: order.payment_status,
            description: order.description.clone(),
            worker_token: order.worker_token.clone(),
            created_at: order.created_at,
            completed_at: order.completed_at,
            can_cancel: order.status.is_cancellable(),
            can_pay: is_client
                && order.status == OrderStatus::Created
                && order.payment_status == PaymentStatus::Pending,
            can_rate: is_client && order.status == OrderStatus::Completed,
        }
    }
}
