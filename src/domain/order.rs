use crate::domain::money::Amount;
use crate::error::{EngineError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Created,
    Paid,
    InProgress,
    Completed,
    Finished,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Paid => "paid",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Finished => "finished",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Finished | OrderStatus::Cancelled)
    }

    /// Cancellation is allowed from every non-terminal status before the
    /// work has been delivered.
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            OrderStatus::Created | OrderStatus::Paid | OrderStatus::InProgress
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An order of a service card by a client.
///
/// `amount` is copied from the service price at creation and immutable
/// afterwards. Orders are never deleted; cancellation is a terminal status.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Order {
    pub id: u32,
    pub client_id: u32,
    pub company_id: u32,
    pub service_id: u32,
    pub amount: Amount,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub description: String,
    /// Single-use completion token handed to the worker; at most one active
    /// per order.
    pub worker_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Guards a transition: the order must be in `expected` at the instant
    /// the atomic unit executes, otherwise the caller lost a race or is
    /// replaying a transition.
    pub fn require_status(&self, expected: OrderStatus, action: &'static str) -> Result<()> {
        if self.status == expected {
            Ok(())
        } else {
            Err(EngineError::StateConflict {
                order: self.id,
                action,
                status: self.status,
            })
        }
    }
}

/// All orders, keyed by id, with sequential id allocation.
#[derive(Debug, Default, Clone)]
pub struct OrderTable {
    orders: HashMap<u32, Order>,
    next_id: u32,
}

impl OrderTable {
    pub fn create(
        &mut self,
        client_id: u32,
        company_id: u32,
        service_id: u32,
        amount: Amount,
        description: String,
        now: DateTime<Utc>,
    ) -> Order {
        self.next_id += 1;
        let order = Order {
            id: self.next_id,
            client_id,
            company_id,
            service_id,
            amount,
            status: OrderStatus::Created,
            payment_status: PaymentStatus::Pending,
            description,
            worker_token: None,
            created_at: now,
            completed_at: None,
        };
        self.orders.insert(order.id, order.clone());
        order
    }

    pub fn get(&self, id: u32) -> Result<&Order> {
        self.orders.get(&id).ok_or(EngineError::NotFound("order"))
    }

    pub fn get_mut(&mut self, id: u32) -> Result<&mut Order> {
        self.orders
            .get_mut(&id)
            .ok_or(EngineError::NotFound("order"))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    /// Orders sorted by id for stable reporting.
    pub fn all(&self) -> Vec<Order> {
        let mut orders: Vec<_> = self.orders.values().cloned().collect();
        orders.sort_by_key(|o| o.id);
        orders
    }

    pub fn from_rows(rows: Vec<Order>) -> Self {
        let next_id = rows.iter().map(|o| o.id).max().unwrap_or(0);
        Self {
            orders: rows.into_iter().map(|o| (o.id, o)).collect(),
            next_id,
        }
    }
}
