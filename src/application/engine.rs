use crate::application::view::OrderView;
use crate::domain::account::BalanceAccount;
use crate::domain::escrow::EscrowEntry;
use crate::domain::ledger::{BalanceEntry, EntryKind};
use crate::domain::money::{Amount, Balance};
use crate::domain::order::{Order, OrderStatus, PaymentStatus};
use crate::domain::owner::{Actor, OwnerRef};
use crate::domain::ports::{
    Notification, NotificationSink, NotificationSinkRef, ServiceCatalog, ServiceCatalogRef,
};
use crate::domain::token::WorkerToken;
use crate::error::{EngineError, Result};
use crate::infrastructure::coordinator::TransactionCoordinator;
use chrono::Utc;
use tracing::{info, warn};

/// The order/escrow settlement engine.
///
/// Every mutating operation loads the order, checks role/ownership and the
/// current status, and applies the associated fund movements and status
/// update as one atomic unit through the coordinator. Notifications go out
/// after the unit commits and never roll it back.
pub struct SettlementEngine {
    coordinator: TransactionCoordinator,
    catalog: ServiceCatalogRef,
    notifier: NotificationSinkRef,
}

impl SettlementEngine {
    pub fn new(
        coordinator: TransactionCoordinator,
        catalog: ServiceCatalogRef,
        notifier: NotificationSinkRef,
    ) -> Self {
        Self {
            coordinator,
            catalog,
            notifier,
        }
    }

    /// Creates an order for a service card. The amount is copied from the
    /// card price and never changes afterwards.
    pub async fn create_order(
        &self,
        client_id: u32,
        company_id: u32,
        service_id: u32,
        description: &str,
    ) -> Result<Order> {
        let card = self
            .catalog
            .lookup(service_id)
            .await?
            .ok_or(EngineError::NotFound("service"))?;
        if card.company_id != company_id {
            return Err(EngineError::Validation(
                "service does not belong to this company".to_string(),
            ));
        }

        let description = description.to_string();
        let order = self
            .coordinator
            .execute(move |state| {
                Ok(state.orders.create(
                    client_id,
                    company_id,
                    service_id,
                    card.price,
                    description,
                    Utc::now(),
                ))
            })
            .await?;

        info!(order = order.id, client = client_id, company = company_id, "order created");
        self.send(
            OwnerRef::company(company_id),
            "New order",
            format!("Order #{} awaits payment", order.id),
            Some(order.id),
        )
        .await;
        Ok(order)
    }

    /// Moves the order amount from the client into escrow and issues the
    /// single-use worker token, all in one atomic unit. Exactly one of
    /// several concurrent calls can win the created → paid transition.
    pub async fn pay_order(&self, order_id: u32, client_id: u32) -> Result<Order> {
        let order = self
            .coordinator
            .execute(|state| {
                let now = Utc::now();
                let order = state.orders.get(order_id)?;
                if order.client_id != client_id {
                    return Err(EngineError::Authorization(
                        "order does not belong to this client".to_string(),
                    ));
                }
                order.require_status(OrderStatus::Created, "paid")?;

                state.hold_funds(order_id, now)?;
                let token = WorkerToken::issue(order_id, now);

                let order = state.orders.get_mut(order_id)?;
                order.status = OrderStatus::Paid;
                order.payment_status = PaymentStatus::Paid;
                order.worker_token = Some(token.token.clone());
                let snapshot = order.clone();
                state.tokens.insert(token);
                Ok(snapshot)
            })
            .await?;

        info!(order = order.id, client = client_id, "order paid, funds held in escrow");
        self.send(
            OwnerRef::company(order.company_id),
            "Order paid",
            format!("Order #{} has been paid and can be started", order.id),
            Some(order.id),
        )
        .await;
        Ok(order)
    }

    /// Company acknowledges the paid order and starts the work.
    pub async fn start_order(&self, order_id: u32, company_id: u32) -> Result<Order> {
        let order = self
            .coordinator
            .execute(|state| {
                let order = state.orders.get(order_id)?;
                if order.company_id != company_id {
                    return Err(EngineError::Authorization(
                        "order does not belong to this company".to_string(),
                    ));
                }
                order.require_status(OrderStatus::Paid, "started")?;

                let order = state.orders.get_mut(order_id)?;
                order.status = OrderStatus::InProgress;
                Ok(order.clone())
            })
            .await?;

        info!(order = order.id, company = company_id, "order started");
        self.send(
            OwnerRef::client(order.client_id),
            "Order started",
            format!("Work on order #{} has started", order.id),
            Some(order.id),
        )
        .await;
        Ok(order)
    }

    /// Anonymous "work delivered" transition, gated solely by the token.
    /// Token validity and the status check share one atomic unit with the
    /// writes, so two simultaneous redemption attempts have at most one
    /// winner; the loser sees `TokenUsed`.
    pub async fn redeem_worker_token(&self, token: &str) -> Result<Order> {
        let order = self
            .coordinator
            .execute(|state| {
                let now = Utc::now();
                let found = state.tokens.get(token)?;
                found.validate(now)?;
                let order_id = found.order_id;

                state
                    .orders
                    .get(order_id)?
                    .require_status(OrderStatus::InProgress, "completed")?;

                state.tokens.mark_used(token)?;
                let order = state.orders.get_mut(order_id)?;
                order.status = OrderStatus::Completed;
                order.completed_at = Some(now);
                Ok(order.clone())
            })
            .await?;

        info!(order = order.id, "work delivered, order completed");
        self.send(
            OwnerRef::client(order.client_id),
            "Work delivered",
            format!("Order #{} is ready for acceptance", order.id),
            Some(order.id),
        )
        .await;
        Ok(order)
    }

    /// Client accepts the delivered work; escrow is released to the
    /// company. The only transition that credits the company for an order.
    pub async fn finish_order(&self, order_id: u32, client_id: u32) -> Result<Order> {
        let order = self
            .coordinator
            .execute(|state| {
                let now = Utc::now();
                let order = state.orders.get(order_id)?;
                if order.client_id != client_id {
                    return Err(EngineError::Authorization(
                        "order does not belong to this client".to_string(),
                    ));
                }
                order.require_status(OrderStatus::Completed, "finished")?;
                if order.payment_status != PaymentStatus::Paid {
                    return Err(EngineError::StateConflict {
                        order: order.id,
                        action: "finished",
                        status: order.status,
                    });
                }

                state.release_funds(order_id, now)?;
                let order = state.orders.get_mut(order_id)?;
                order.status = OrderStatus::Finished;
                Ok(order.clone())
            })
            .await?;

        info!(order = order.id, client = client_id, "order finished, escrow released");
        self.send(
            OwnerRef::company(order.company_id),
            "Order finished",
            format!("Payment for order #{} has been released", order.id),
            Some(order.id),
        )
        .await;
        Ok(order)
    }

    /// Either owner may cancel before the work is delivered. Cancelling a
    /// paid order refunds the held escrow to the client in the same unit.
    pub async fn cancel_order(&self, order_id: u32, actor: Actor) -> Result<Order> {
        let order = self
            .coordinator
            .execute(move |state| {
                let now = Utc::now();
                let order = state.orders.get(order_id)?;
                let owns = match actor {
                    Actor::Client(id) => order.client_id == id,
                    Actor::Company(id) => order.company_id == id,
                };
                if !owns {
                    return Err(EngineError::Authorization(
                        "order does not belong to this user".to_string(),
                    ));
                }
                if !order.status.is_cancellable() {
                    return Err(EngineError::StateConflict {
                        order: order.id,
                        action: "cancelled",
                        status: order.status,
                    });
                }

                let refund = matches!(order.status, OrderStatus::Paid | OrderStatus::InProgress);
                if refund {
                    state.refund_funds(order_id, now)?;
                }
                let order = state.orders.get_mut(order_id)?;
                if refund {
                    order.payment_status = PaymentStatus::Refunded;
                }
                order.status = OrderStatus::Cancelled;
                Ok(order.clone())
            })
            .await?;

        info!(order = order.id, by = %actor.owner_ref(), "order cancelled");
        let counterparty = match actor {
            Actor::Client(_) => OwnerRef::company(order.company_id),
            Actor::Company(_) => OwnerRef::client(order.client_id),
        };
        self.send(
            counterparty,
            "Order cancelled",
            format!("Order #{} has been cancelled", order.id),
            Some(order.id),
        )
        .await;
        Ok(order)
    }

    /// Direct balance top-up. Gateway settlement is out of scope; the
    /// credit and its audit entry still commit as one unit.
    pub async fn deposit(&self, owner: OwnerRef, amount: Amount) -> Result<Balance> {
        let balance = self
            .coordinator
            .execute(move |state| {
                let balance = state.accounts.credit(owner, amount);
                state.entries.append(
                    owner,
                    amount.value(),
                    EntryKind::Deposit,
                    None,
                    format!("Deposit of {amount}"),
                    Utc::now(),
                );
                Ok(balance)
            })
            .await?;
        info!(owner = %owner, %amount, "balance deposited");
        Ok(balance)
    }

    /// Direct withdrawal; fails inside the unit when the balance is short.
    pub async fn withdraw(&self, owner: OwnerRef, amount: Amount) -> Result<Balance> {
        let balance = self
            .coordinator
            .execute(move |state| {
                let balance = state.accounts.debit(owner, amount)?;
                state.entries.append(
                    owner,
                    -amount.value(),
                    EntryKind::Withdrawal,
                    None,
                    format!("Withdrawal of {amount}"),
                    Utc::now(),
                );
                Ok(balance)
            })
            .await?;
        info!(owner = %owner, %amount, "balance withdrawn");
        Ok(balance)
    }

    pub async fn balance(&self, owner: OwnerRef) -> Balance {
        self.coordinator.read(|s| s.accounts.balance(owner)).await
    }

    pub async fn transaction_history(&self, owner: OwnerRef) -> Vec<BalanceEntry> {
        self.coordinator.read(|s| s.entries.by_owner(owner)).await
    }

    pub async fn escrow_history(&self, order_id: u32) -> Vec<EscrowEntry> {
        self.coordinator.read(|s| s.escrow.by_order(order_id)).await
    }

    pub async fn get_order(&self, order_id: u32) -> Result<Order> {
        self.coordinator
            .read(|s| s.orders.get(order_id).cloned())
            .await
    }

    /// Per-actor projection with the derived action flags.
    pub async fn order_view(&self, order_id: u32, actor: Actor) -> Result<OrderView> {
        let order = self.get_order(order_id).await?;
        let owns = match actor {
            Actor::Client(id) => order.client_id == id,
            Actor::Company(id) => order.company_id == id,
        };
        if !owns {
            return Err(EngineError::Authorization("access denied".to_string()));
        }
        Ok(OrderView::project(&order, actor))
    }

    /// Orders belonging to an actor, optionally filtered by status,
    /// newest first.
    pub async fn orders_for(&self, actor: Actor, status: Option<OrderStatus>) -> Vec<Order> {
        self.coordinator
            .read(|s| {
                let mut orders: Vec<_> = s
                    .orders
                    .iter()
                    .filter(|o| match actor {
                        Actor::Client(id) => o.client_id == id,
                        Actor::Company(id) => o.company_id == id,
                    })
                    .filter(|o| status.is_none_or(|wanted| o.status == wanted))
                    .cloned()
                    .collect();
                orders.sort_by_key(|o| std::cmp::Reverse(o.id));
                orders
            })
            .await
    }

    /// Final-state snapshots for reporting.
    pub async fn accounts(&self) -> Vec<BalanceAccount> {
        self.coordinator.read(|s| s.accounts.all()).await
    }

    pub async fn orders(&self) -> Vec<Order> {
        self.coordinator.read(|s| s.orders.all()).await
    }

    /// Consistency audit over the whole ledger; see `LedgerState::audit`.
    pub async fn audit(&self) -> Result<()> {
        self.coordinator.read(|s| s.audit()).await
    }

    async fn send(&self, owner: OwnerRef, title: &str, message: String, order_id: Option<u32>) {
        let note = Notification {
            owner,
            title: title.to_string(),
            message,
            order_id,
        };
        if let Err(e) = self.notifier.notify(note).await {
            warn!(owner = %owner, error = %e, "notification delivery failed");
        }
    }
}
