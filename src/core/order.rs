//! Order business logic - lifecycle and the fee-deduction completion hook.
//!
//! Order statuses are seller-driven and loosely gated compared to trades:
//! any non-terminal status may move to any other, `Completed` and `Cancelled`
//! are terminal. The one strict rule is the deduction trigger: the engine
//! runs exactly when the status *transitions into* `Completed`, never on a
//! re-save of an already-completed order. The trigger is an explicit call
//! after the transition commits, not a save hook, so the "real transition
//! only" guard is visible in the control flow.

use crate::{
    core::Actor,
    core::deduction::{self, DeductionReport, DeductionSource},
    entities::{Order, OrderItem, order, order_item},
    errors::{Error, Result},
    notify::{self, Notifier, NotifyEvent},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, Set, TransactionTrait, prelude::*};
use std::fmt;
use std::str::FromStr;
use tracing::{info, instrument};

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    /// Placed by the buyer, awaiting the seller
    Pending,
    /// Seller confirmed the order
    Accepted,
    /// Seller is preparing the goods
    Processing,
    /// Goods handed to the courier
    Shipped,
    /// Goods received by the buyer
    Delivered,
    /// Finished; triggers the platform fee. Terminal.
    Completed,
    /// Called off; no fee. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Storage representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Accepted => "Accepted",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Completed => "Completed",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Whether no further transitions may leave this status
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Pending" => Ok(OrderStatus::Pending),
            "Accepted" => Ok(OrderStatus::Accepted),
            "Processing" => Ok(OrderStatus::Processing),
            "Shipped" => Ok(OrderStatus::Shipped),
            "Delivered" => Ok(OrderStatus::Delivered),
            "Completed" => Ok(OrderStatus::Completed),
            "Cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(Error::UnknownStatus {
                value: s.to_string(),
            }),
        }
    }
}

/// A line item on a new order.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    /// Product name as listed
    pub product_name: String,
    /// Unit price
    pub price: Decimal,
    /// Units purchased
    pub quantity: i32,
}

/// Result of a status change: the updated order, plus the deduction report
/// when the change completed the order.
#[derive(Debug, Clone)]
pub struct OrderTransition {
    /// Order after the status change
    pub order: order::Model,
    /// Present only when this call transitioned the order into `Completed`
    pub deduction: Option<DeductionReport>,
}

/// Creates a pending order with its line items.
#[instrument(skip(db, items))]
pub async fn create_order(
    db: &DatabaseConnection,
    buyer_id: &str,
    seller_code: &str,
    subtotal: Decimal,
    items: &[NewOrderItem],
) -> Result<(order::Model, Vec<order_item::Model>)> {
    if buyer_id.trim().is_empty() || seller_code.trim().is_empty() {
        return Err(Error::Validation {
            message: "Buyer and seller identifiers cannot be empty".to_string(),
        });
    }
    if subtotal < Decimal::ZERO {
        return Err(Error::InvalidAmount { amount: subtotal });
    }
    for item in items {
        if item.price < Decimal::ZERO {
            return Err(Error::InvalidAmount { amount: item.price });
        }
        if item.quantity <= 0 {
            return Err(Error::Validation {
                message: format!(
                    "Quantity for '{}' must be positive, got {}",
                    item.product_name, item.quantity
                ),
            });
        }
    }

    let txn = db.begin().await?;

    let order = order::ActiveModel {
        buyer_id: Set(buyer_id.to_string()),
        seller_code: Set(seller_code.to_string()),
        subtotal: Set(subtotal),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        wallet_deduction_processed: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut inserted = Vec::with_capacity(items.len());
    for item in items {
        let row = order_item::ActiveModel {
            order_id: Set(order.id),
            product_name: Set(item.product_name.clone()),
            price: Set(item.price),
            quantity: Set(item.quantity),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        inserted.push(row);
    }

    txn.commit().await?;
    info!(
        "Created order {} for buyer '{}' from seller '{}' ({} items)",
        order.id,
        buyer_id,
        seller_code,
        inserted.len()
    );
    Ok((order, inserted))
}

/// Finds an order by id.
pub async fn get_order(db: &DatabaseConnection, order_id: i64) -> Result<Option<order::Model>> {
    Order::find_by_id(order_id).one(db).await.map_err(Into::into)
}

/// Retrieves an order's line items.
pub async fn get_order_items(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Vec<order_item::Model>> {
    OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Moves an order to a new status, charging the platform fee when the move
/// completes the order.
///
/// Re-saving the current status is a no-op (no transition, no deduction).
/// Terminal statuses cannot be left. The status commit and the deduction run
/// as separate transactions: a failed deduction is reported as deferred on
/// the result, not as a failure of the status change.
#[instrument(skip(db, notifier))]
pub async fn update_order_status(
    db: &DatabaseConnection,
    order_id: i64,
    new_status: OrderStatus,
    actor: &Actor,
    rate: Decimal,
    notifier: &dyn Notifier,
) -> Result<OrderTransition> {
    let txn = db.begin().await?;

    let order = Order::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;

    if !actor.is_seller(&order.seller_code) {
        return Err(Error::Unauthorized {
            message: format!("Only the seller may update order #{order_id}"),
        });
    }

    let current: OrderStatus = order.status.parse()?;
    if new_status == current {
        // Same-status save: nothing changed, and in particular nothing may
        // re-trigger the deduction for an already-completed order.
        txn.commit().await?;
        return Ok(OrderTransition {
            order,
            deduction: None,
        });
    }
    if current.is_terminal() {
        return Err(Error::InvalidTransition {
            from: current.as_str().to_string(),
            to: new_status.as_str().to_string(),
        });
    }

    let buyer_id = order.buyer_id.clone();
    let seller_code = order.seller_code.clone();
    let mut model: order::ActiveModel = order.into();
    model.status = Set(new_status.as_str().to_string());
    let mut updated = model.update(&txn).await?;
    txn.commit().await?;
    info!(
        "Order {} moved {} -> {}",
        order_id,
        current.as_str(),
        new_status.as_str()
    );

    let deduction = if new_status == OrderStatus::Completed {
        notify::dispatch(
            notifier,
            &NotifyEvent::OrderCompleted {
                order_id,
                buyer_id,
                seller_code,
            },
        );
        let report = DeductionReport::from_result(
            deduction::process_completion(db, DeductionSource::Order(order_id), rate, notifier)
                .await,
        );
        // The engine may have flipped the processed flag; reload for callers.
        updated = Order::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or(Error::OrderNotFound { id: order_id })?;
        Some(report)
    } else {
        None
    };

    Ok(OrderTransition {
        order: updated,
        deduction,
    })
}
