mod common;

use escrowd::domain::escrow::EscrowKind;
use escrowd::domain::order::{OrderStatus, PaymentStatus};
use escrowd::domain::owner::{Actor, OwnerRef};
use escrowd::error::EngineError;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_end_to_end_settlement() {
    let ctx = common::engine_with_card(dec!(500.0)).await;
    let engine = &ctx.engine;
    let client = OwnerRef::client(1);
    let company = OwnerRef::company(1);

    engine
        .deposit(client, dec!(1000.0).try_into().unwrap())
        .await
        .unwrap();

    let order = engine.create_order(1, 1, 1, "clean the office").await.unwrap();
    assert_eq!(order.status, OrderStatus::Created);
    assert_eq!(order.amount.value(), dec!(500.0));

    let order = engine.pay_order(order.id, 1).await.unwrap();
    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(engine.balance(client).await.value(), dec!(500.0));
    let token = order.worker_token.clone().expect("token issued on payment");

    let escrow = engine.escrow_history(order.id).await;
    assert_eq!(escrow.len(), 1);
    assert_eq!(escrow[0].kind, EscrowKind::Hold);
    assert_eq!(escrow[0].amount.value(), dec!(500.0));

    engine.start_order(order.id, 1).await.unwrap();
    let order = engine.redeem_worker_token(&token).await.unwrap();
    assert_eq!(order.status, OrderStatus::Completed);
    assert!(order.completed_at.is_some());

    let order = engine.finish_order(order.id, 1).await.unwrap();
    assert_eq!(order.status, OrderStatus::Finished);
    assert_eq!(engine.balance(company).await.value(), dec!(500.0));

    let escrow = engine.escrow_history(order.id).await;
    assert_eq!(escrow.len(), 2);
    assert_eq!(escrow[1].kind, EscrowKind::Release);

    // Replaying the token after settlement changes nothing
    let err = engine.redeem_worker_token(&token).await.unwrap_err();
    assert!(matches!(err, EngineError::TokenUsed));
    let order = engine.get_order(order.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Finished);

    engine.audit().await.unwrap();
}

#[tokio::test]
async fn test_cancel_after_pay_restores_balance_exactly() {
    let ctx = common::engine_with_card(dec!(300.0)).await;
    let engine = &ctx.engine;
    let client = OwnerRef::client(1);

    engine
        .deposit(client, dec!(750.0).try_into().unwrap())
        .await
        .unwrap();
    let order = engine.create_order(1, 1, 1, "").await.unwrap();
    engine.pay_order(order.id, 1).await.unwrap();
    assert_eq!(engine.balance(client).await.value(), dec!(450.0));

    let order = engine.cancel_order(order.id, Actor::Client(1)).await.unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert_eq!(order.payment_status, PaymentStatus::Refunded);
    assert_eq!(engine.balance(client).await.value(), dec!(750.0));

    let escrow = engine.escrow_history(order.id).await;
    assert_eq!(escrow.len(), 2);
    assert_eq!(escrow[1].kind, EscrowKind::Refund);

    engine.audit().await.unwrap();
}

#[tokio::test]
async fn test_cancel_in_progress_refunds() {
    let ctx = common::engine_with_card(dec!(200.0)).await;
    let engine = &ctx.engine;
    let client = OwnerRef::client(1);

    engine
        .deposit(client, dec!(200.0).try_into().unwrap())
        .await
        .unwrap();
    let order = engine.create_order(1, 1, 1, "").await.unwrap();
    engine.pay_order(order.id, 1).await.unwrap();
    engine.start_order(order.id, 1).await.unwrap();

    let order = engine.cancel_order(order.id, Actor::Company(1)).await.unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert_eq!(engine.balance(client).await.value(), dec!(200.0));
    engine.audit().await.unwrap();
}

#[tokio::test]
async fn test_finish_before_delivery_rejected() {
    let ctx = common::engine_with_card(dec!(100.0)).await;
    let engine = &ctx.engine;

    engine
        .deposit(OwnerRef::client(1), dec!(100.0).try_into().unwrap())
        .await
        .unwrap();
    let order = ctx.engine.create_order(1, 1, 1, "").await.unwrap();
    engine.pay_order(order.id, 1).await.unwrap();

    let err = engine.finish_order(order.id, 1).await.unwrap_err();
    assert!(matches!(err, EngineError::StateConflict { .. }));
    // Nothing released to the company
    assert_eq!(
        engine.balance(OwnerRef::company(1)).await.value(),
        dec!(0.0)
    );
}

#[tokio::test]
async fn test_notifications_follow_the_lifecycle() {
    let ctx = common::engine_with_card(dec!(500.0)).await;
    let engine = &ctx.engine;

    engine
        .deposit(OwnerRef::client(1), dec!(500.0).try_into().unwrap())
        .await
        .unwrap();
    let order = engine.create_order(1, 1, 1, "").await.unwrap();
    let order = engine.pay_order(order.id, 1).await.unwrap();
    engine.start_order(order.id, 1).await.unwrap();
    let token = order.worker_token.clone().unwrap();
    engine.redeem_worker_token(&token).await.unwrap();
    engine.finish_order(order.id, 1).await.unwrap();

    let titles: Vec<String> = ctx
        .notifier
        .sent()
        .await
        .into_iter()
        .map(|n| n.title)
        .collect();
    assert_eq!(
        titles,
        vec![
            "New order",
            "Order paid",
            "Order started",
            "Work delivered",
            "Order finished"
        ]
    );
}
