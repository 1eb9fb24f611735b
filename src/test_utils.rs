//! Shared test utilities for the wallet core.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::ledger::{EntryType, ReferenceType},
    core::order::{self, NewOrderItem},
    core::trade::{self, NewOfferedItem, NewTrade},
    core::wallet,
    entities::{self, Order, TradeTransaction},
    errors::Result,
    notify::{Notifier, NotifyError, NotifyEvent},
};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, Set, prelude::*};
use std::sync::Mutex;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a wallet and activates it immediately.
pub async fn create_active_wallet(
    db: &DatabaseConnection,
    seller_code: &str,
) -> Result<entities::wallet::Model> {
    wallet::create_wallet(db, seller_code).await?;
    wallet::activate_wallet(db, seller_code).await
}

/// Tops up a wallet via the refill path and returns the updated wallet.
pub async fn fund_wallet(
    db: &DatabaseConnection,
    seller_code: &str,
    amount: Decimal,
) -> Result<entities::wallet::Model> {
    wallet::credit_wallet(
        db,
        seller_code,
        amount,
        EntryType::Refill,
        ReferenceType::Refill,
        "test-refill",
        "Test wallet refill",
    )
    .await
}

/// Creates a pending order with no line items (the stored subtotal is the
/// fee basis).
pub async fn create_test_order(
    db: &DatabaseConnection,
    buyer_id: &str,
    seller_code: &str,
    subtotal: Decimal,
) -> Result<entities::order::Model> {
    let (order, _) = order::create_order(db, buyer_id, seller_code, subtotal, &[]).await?;
    Ok(order)
}

/// Creates a pending order with line items given as `(price, quantity)`
/// pairs.
pub async fn create_order_with_items(
    db: &DatabaseConnection,
    buyer_id: &str,
    seller_code: &str,
    subtotal: Decimal,
    items: &[(Decimal, i32)],
) -> Result<entities::order::Model> {
    let items: Vec<NewOrderItem> = items
        .iter()
        .enumerate()
        .map(|(i, (price, quantity))| NewOrderItem {
            product_name: format!("Test product {i}"),
            price: *price,
            quantity: *quantity,
        })
        .collect();
    let (order, _) = order::create_order(db, buyer_id, seller_code, subtotal, &items).await?;
    Ok(order)
}

/// Creates a product listing for a seller.
pub async fn create_test_product(
    db: &DatabaseConnection,
    seller_code: &str,
    price: Decimal,
) -> Result<entities::product::Model> {
    entities::product::ActiveModel {
        name: Set("Test Product".to_string()),
        price: Set(price),
        seller_code: Set(seller_code.to_string()),
        description: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a pending trade with one default offered item.
pub async fn create_test_trade(
    db: &DatabaseConnection,
    buyer_id: &str,
    seller_code: &str,
    product_id: i64,
    additional_cash: Decimal,
) -> Result<entities::trade_transaction::Model> {
    create_trade_with_item_value(
        db,
        buyer_id,
        seller_code,
        product_id,
        additional_cash,
        Decimal::from(5),
    )
    .await
}

/// Creates a pending trade whose single offered item carries a specific
/// estimated value. Used to show the fee basis ignores offered-item values.
pub async fn create_trade_with_item_value(
    db: &DatabaseConnection,
    buyer_id: &str,
    seller_code: &str,
    product_id: i64,
    additional_cash: Decimal,
    estimated_value: Decimal,
) -> Result<entities::trade_transaction::Model> {
    let (trade, _) = trade::create_trade(
        db,
        NewTrade {
            buyer_id: buyer_id.to_string(),
            seller_code: seller_code.to_string(),
            product_id,
            additional_cash,
            meetup_location: Some("Library steps".to_string()),
            meetup_schedule: None,
            offered_items: vec![NewOfferedItem {
                name: "Offered item".to_string(),
                quantity: 1,
                estimated_value,
                condition: "used".to_string(),
                images: vec!["img/offered-item.jpg".to_string()],
            }],
        },
    )
    .await?;
    Ok(trade)
}

/// Forces an order's raw status column, bypassing the transition rules.
/// For engine tests that need a record already in a given state.
pub async fn force_order_status(db: &DatabaseConnection, order_id: i64, status: &str) -> Result<()> {
    let order = Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(crate::errors::Error::OrderNotFound { id: order_id })?;
    let mut model: entities::order::ActiveModel = order.into();
    model.status = Set(status.to_string());
    model.update(db).await?;
    Ok(())
}

/// Forces a trade's raw status column, bypassing the transition rules.
pub async fn force_trade_status(db: &DatabaseConnection, trade_id: i64, status: &str) -> Result<()> {
    let trade = TradeTransaction::find_by_id(trade_id)
        .one(db)
        .await?
        .ok_or(crate::errors::Error::TradeNotFound { id: trade_id })?;
    let mut model: entities::trade_transaction::ActiveModel = trade.into();
    model.status = Set(status.to_string());
    model.update(db).await?;
    Ok(())
}

/// Notifier that records every event for assertions.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<NotifyEvent>>,
}

impl RecordingNotifier {
    /// Snapshot of the events delivered so far.
    pub fn events(&self) -> Vec<NotifyEvent> {
        self.events.lock().expect("notifier lock poisoned").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: &NotifyEvent) -> std::result::Result<(), NotifyError> {
        self.events
            .lock()
            .expect("notifier lock poisoned")
            .push(event.clone());
        Ok(())
    }
}

/// Notifier that always fails, for proving money paths ignore delivery
/// failures.
#[derive(Debug, Default)]
pub struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn notify(&self, _event: &NotifyEvent) -> std::result::Result<(), NotifyError> {
        Err(NotifyError("notification channel down".to_string()))
    }
}
