//! The deduction engine - charges the platform fee when an order or trade
//! completes.
//!
//! [`process_completion`] runs one storage transaction that re-validates the
//! source's terminal status, probes the ledger for an existing fee row (the
//! idempotency check), resolves and debits the seller's wallet, appends the
//! ledger entry, and marks the source processed. Any failure rolls the whole
//! unit back, leaving the source retryable. Notification dispatch happens
//! after commit and cannot affect the financial outcome.

use crate::{
    core::ledger::{self, EntryType, ReferenceType},
    core::order::OrderStatus,
    core::trade::TradeStatus,
    core::wallet,
    entities::{Order, OrderItem, Product, TradeTransaction, order, order_item, trade_transaction},
    errors::{Error, Result},
    notify::{self, Notifier, NotifyEvent},
};
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{ConnectionTrait, DatabaseConnection, Set, TransactionTrait, prelude::*};
use tracing::{error, info, instrument, warn};

/// Smallest representable currency amount; fees never round below this on a
/// chargeable transaction. Configurable business rule.
pub const SMALLEST_CURRENCY_UNIT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Minimum fee basis for the smallest-unit floor to apply; below this the
/// computed (possibly zero) fee stands. Configurable business rule.
pub const MIN_BASIS_FOR_FEE_FLOOR: Decimal = Decimal::ONE;

/// Which record completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeductionSource {
    /// An order, by primary key
    Order(i64),
    /// A trade, by primary key
    Trade(i64),
}

impl DeductionSource {
    /// Ledger reference type for this source
    #[must_use]
    pub fn reference_type(&self) -> ReferenceType {
        match self {
            DeductionSource::Order(_) => ReferenceType::Order,
            DeductionSource::Trade(_) => ReferenceType::Trade,
        }
    }

    /// Source record id as stored in ledger references
    #[must_use]
    pub fn reference_id(&self) -> String {
        match self {
            DeductionSource::Order(id) | DeductionSource::Trade(id) => id.to_string(),
        }
    }
}

/// What the engine did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeductionOutcome {
    /// A fee was charged in this call
    Applied {
        /// Ledger row id of the new deduction entry
        entry_id: String,
        /// Seller whose wallet was charged
        seller_code: String,
        /// Fee the rate computed
        fee_computed: Decimal,
        /// Fee actually debited (capped at the wallet balance)
        fee_charged: Decimal,
    },
    /// A completed fee row already existed; nothing was changed
    AlreadyApplied,
    /// The source is not in its completed state; nothing was changed
    SourceNotCompleted,
}

/// Caller-facing summary of a deduction attempt made right after a status
/// transition.
///
/// The transition itself has already committed; a failed deduction is
/// reported here as `Deferred` (the source's processed flag stays false, so
/// re-invoking the engine later retries it) rather than failing the whole
/// request. See the propagation policy in the crate docs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeductionReport {
    /// Fee charged now
    Applied {
        /// Ledger row id of the deduction entry
        entry_id: String,
        /// Fee actually debited
        fee_charged: Decimal,
    },
    /// Fee had already been charged by an earlier trigger
    AlreadyApplied,
    /// Fee not charged yet; retry once the reported problem is fixed
    Deferred {
        /// Why the deduction did not go through
        reason: String,
    },
}

impl DeductionReport {
    /// Folds an engine result into the report attached to a completed
    /// transition, logging failures instead of propagating them.
    pub(crate) fn from_result(result: Result<DeductionOutcome>) -> Self {
        match result {
            Ok(DeductionOutcome::Applied {
                entry_id,
                fee_charged,
                ..
            }) => DeductionReport::Applied {
                entry_id,
                fee_charged,
            },
            Ok(DeductionOutcome::AlreadyApplied) => DeductionReport::AlreadyApplied,
            Ok(DeductionOutcome::SourceNotCompleted) => DeductionReport::Deferred {
                reason: "Source record is not in its completed state".to_string(),
            },
            Err(e) => {
                if e.is_retryable() {
                    warn!("Fee deduction deferred: {}", e);
                } else {
                    error!("Fee deduction failed and needs attention: {}", e);
                }
                DeductionReport::Deferred {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Computes the platform fee for a given basis and percentage rate.
///
/// Currency-correct rounding: half-up to two decimal places. A nonzero rate
/// on a basis of at least [`MIN_BASIS_FOR_FEE_FLOOR`] never produces a fee
/// below [`SMALLEST_CURRENCY_UNIT`], so small transactions still pay the
/// minimum fee instead of rounding to nothing.
#[must_use]
pub fn compute_fee(amount: Decimal, rate: Decimal) -> Decimal {
    let fee = (amount * rate / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rate > Decimal::ZERO && amount >= MIN_BASIS_FOR_FEE_FLOOR && fee < SMALLEST_CURRENCY_UNIT {
        SMALLEST_CURRENCY_UNIT
    } else {
        fee
    }
}

/// Fee basis of an order: the sum of `price * quantity` over its line items,
/// falling back to the stored subtotal when no items exist.
pub async fn order_amount_basis<C>(db: &C, order: &order::Model) -> Result<Decimal>
where
    C: ConnectionTrait,
{
    let items = OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order.id))
        .all(db)
        .await?;

    if items.is_empty() {
        return Ok(order.subtotal);
    }

    Ok(items
        .iter()
        .map(|item| item.price * Decimal::from(item.quantity))
        .sum())
}

/// Fee basis of a trade: the seller's product price plus the buyer's cash
/// component.
///
/// The buyer's offered items are deliberately excluded - their estimated
/// values are not platform revenue.
pub async fn trade_amount_basis<C>(db: &C, trade: &trade_transaction::Model) -> Result<Decimal>
where
    C: ConnectionTrait,
{
    let product = Product::find_by_id(trade.product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound {
            id: trade.product_id,
        })?;

    Ok(product.price + trade.additional_cash)
}

/// Runs the deduction pipeline for a completed order or trade.
///
/// Safe to call any number of times for the same source: repeat calls return
/// [`DeductionOutcome::AlreadyApplied`] without touching the wallet. Calling
/// it on a source that is not completed is a no-op
/// ([`DeductionOutcome::SourceNotCompleted`]), not an error, so reconciliation
/// sweeps can probe records freely.
#[instrument(skip(db, notifier))]
pub async fn process_completion(
    db: &DatabaseConnection,
    source: DeductionSource,
    rate: Decimal,
    notifier: &dyn Notifier,
) -> Result<DeductionOutcome> {
    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        return Err(Error::Validation {
            message: format!("Deduction rate must be between 0 and 100, got {rate}"),
        });
    }

    let txn = db.begin().await?;
    let outcome = match source {
        DeductionSource::Order(id) => process_order(&txn, id, rate).await?,
        DeductionSource::Trade(id) => process_trade(&txn, id, rate).await?,
    };
    txn.commit().await?;

    if let DeductionOutcome::Applied {
        seller_code,
        fee_charged,
        ..
    } = &outcome
    {
        info!(
            "Charged platform fee {} to seller '{}' for {} #{}",
            fee_charged,
            seller_code,
            source.reference_type(),
            source.reference_id()
        );
        notify::dispatch(
            notifier,
            &NotifyEvent::FeeDeducted {
                seller_code: seller_code.clone(),
                reference_type: source.reference_type().as_str(),
                reference_id: source.reference_id(),
                amount: *fee_charged,
            },
        );
    }

    Ok(outcome)
}

async fn process_order<C>(txn: &C, order_id: i64, rate: Decimal) -> Result<DeductionOutcome>
where
    C: ConnectionTrait,
{
    let order = Order::find_by_id(order_id)
        .one(txn)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })?;

    let status: OrderStatus = order.status.parse()?;
    if status != OrderStatus::Completed {
        return Ok(DeductionOutcome::SourceNotCompleted);
    }
    if order.wallet_deduction_processed {
        return Ok(DeductionOutcome::AlreadyApplied);
    }
    if ledger::find_completed_deduction(txn, ReferenceType::Order, &order_id.to_string())
        .await?
        .is_some()
    {
        // Ledger row landed but the flag write was lost (crash between the
        // two); repair the flag so later saves stop probing.
        mark_order_processed(txn, order).await?;
        return Ok(DeductionOutcome::AlreadyApplied);
    }

    let wallet = wallet::get_wallet_by_seller(txn, &order.seller_code)
        .await?
        .ok_or_else(|| Error::WalletNotFound {
            seller_code: order.seller_code.clone(),
        })?;
    wallet::require_active(&wallet)?;

    let basis = order_amount_basis(txn, &order).await?;
    let fee = compute_fee(basis, rate);
    let description = format!("Platform fee ({rate}%) for order #{order_id}");
    let debit = wallet::debit_wallet(
        txn,
        &wallet,
        fee,
        EntryType::Deduction,
        ReferenceType::Order,
        &order_id.to_string(),
        &description,
    )
    .await?;

    let seller_code = order.seller_code.clone();
    mark_order_processed(txn, order).await?;

    Ok(DeductionOutcome::Applied {
        entry_id: debit.entry.id,
        seller_code,
        fee_computed: fee,
        fee_charged: debit.debited,
    })
}

async fn process_trade<C>(txn: &C, trade_id: i64, rate: Decimal) -> Result<DeductionOutcome>
where
    C: ConnectionTrait,
{
    let trade = TradeTransaction::find_by_id(trade_id)
        .one(txn)
        .await?
        .ok_or(Error::TradeNotFound { id: trade_id })?;

    let status: TradeStatus = trade.status.parse()?;
    if status != TradeStatus::Completed {
        return Ok(DeductionOutcome::SourceNotCompleted);
    }
    if trade.wallet_deduction_processed {
        return Ok(DeductionOutcome::AlreadyApplied);
    }
    if ledger::find_completed_deduction(txn, ReferenceType::Trade, &trade_id.to_string())
        .await?
        .is_some()
    {
        mark_trade_processed(txn, trade).await?;
        return Ok(DeductionOutcome::AlreadyApplied);
    }

    let wallet = wallet::get_wallet_by_seller(txn, &trade.seller_code)
        .await?
        .ok_or_else(|| Error::WalletNotFound {
            seller_code: trade.seller_code.clone(),
        })?;
    wallet::require_active(&wallet)?;

    let basis = trade_amount_basis(txn, &trade).await?;
    let fee = compute_fee(basis, rate);
    let description = format!("Platform fee ({rate}%) for trade #{trade_id}");
    let debit = wallet::debit_wallet(
        txn,
        &wallet,
        fee,
        EntryType::Deduction,
        ReferenceType::Trade,
        &trade_id.to_string(),
        &description,
    )
    .await?;

    let seller_code = trade.seller_code.clone();
    mark_trade_processed(txn, trade).await?;

    Ok(DeductionOutcome::Applied {
        entry_id: debit.entry.id,
        seller_code,
        fee_computed: fee,
        fee_charged: debit.debited,
    })
}

async fn mark_order_processed<C>(txn: &C, order: order::Model) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut model: order::ActiveModel = order.into();
    model.wallet_deduction_processed = Set(true);
    model.update(txn).await?;
    Ok(())
}

async fn mark_trade_processed<C>(txn: &C, trade: trade_transaction::Model) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut model: trade_transaction::ActiveModel = trade.into();
    model.wallet_deduction_processed = Set(true);
    model.update(txn).await?;
    Ok(())
}
