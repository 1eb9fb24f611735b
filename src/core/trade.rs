//! Trade business logic - the barter negotiation state machine.
//!
//! Transitions are strictly gated by status and actor:
//!
//! | From      | To        | Actor  |
//! |-----------|-----------|--------|
//! | pending   | accepted  | seller |
//! | pending   | rejected  | seller |
//! | pending   | canceled  | buyer  |
//! | accepted  | canceled  | buyer  |
//! | accepted  | completed | seller |
//!
//! Everything else is an invalid transition that leaves the record untouched.
//! Completing a trade is the sole point that invokes the deduction engine,
//! and only on the genuine `accepted -> completed` edge - never on a re-save.
//! Soft deletion is permitted from terminal states only, by either party.

use crate::{
    core::Actor,
    core::deduction::{self, DeductionReport, DeductionSource},
    entities::{
        OfferedItem, Product, TradeTransaction, offered_item, offered_item::ImageRefs,
        trade_transaction,
    },
    errors::{Error, Result},
    notify::{self, Notifier, NotifyEvent},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, Set, TransactionTrait, prelude::*};
use std::fmt;
use std::str::FromStr;
use tracing::{info, instrument};

/// Trade negotiation status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeStatus {
    /// Offer made, awaiting the seller's decision
    Pending,
    /// Seller agreed; meetup can proceed
    Accepted,
    /// Seller declined. Terminal.
    Rejected,
    /// Exchange happened; triggers the platform fee. Terminal.
    Completed,
    /// Buyer withdrew the offer. Terminal.
    Canceled,
}

impl TradeStatus {
    /// Storage representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Pending => "pending",
            TradeStatus::Accepted => "accepted",
            TradeStatus::Rejected => "rejected",
            TradeStatus::Completed => "completed",
            TradeStatus::Canceled => "canceled",
        }
    }

    /// Whether no further transitions may leave this status
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TradeStatus::Rejected | TradeStatus::Completed | TradeStatus::Canceled
        )
    }

    /// The transition table. Anything not listed here is invalid.
    #[must_use]
    pub fn can_transition_to(&self, to: TradeStatus) -> bool {
        matches!(
            (self, to),
            (TradeStatus::Pending, TradeStatus::Accepted)
                | (TradeStatus::Pending, TradeStatus::Rejected)
                | (TradeStatus::Pending, TradeStatus::Canceled)
                | (TradeStatus::Accepted, TradeStatus::Canceled)
                | (TradeStatus::Accepted, TradeStatus::Completed)
        )
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TradeStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(TradeStatus::Pending),
            "accepted" => Ok(TradeStatus::Accepted),
            "rejected" => Ok(TradeStatus::Rejected),
            "completed" => Ok(TradeStatus::Completed),
            "canceled" => Ok(TradeStatus::Canceled),
            _ => Err(Error::UnknownStatus {
                value: s.to_string(),
            }),
        }
    }
}

/// A buyer-side item on a new trade offer.
#[derive(Debug, Clone)]
pub struct NewOfferedItem {
    /// Item name
    pub name: String,
    /// Units offered
    pub quantity: i32,
    /// Buyer's value estimate (display only)
    pub estimated_value: Decimal,
    /// Condition description
    pub condition: String,
    /// Image references; at least one required
    pub images: Vec<String>,
}

/// A new trade offer.
#[derive(Debug, Clone)]
pub struct NewTrade {
    /// Offering buyer
    pub buyer_id: String,
    /// Receiving seller (wallet key)
    pub seller_code: String,
    /// The seller's product the buyer wants
    pub product_id: i64,
    /// Cash on top of the offered items
    pub additional_cash: Decimal,
    /// Proposed meetup place
    pub meetup_location: Option<String>,
    /// Proposed meetup time
    pub meetup_schedule: Option<chrono::DateTime<chrono::Utc>>,
    /// The offered items; at least one required
    pub offered_items: Vec<NewOfferedItem>,
}

/// Result of completing a trade: the updated record plus what happened to
/// the platform fee.
#[derive(Debug, Clone)]
pub struct TradeCompletion {
    /// Trade after the transition
    pub trade: trade_transaction::Model,
    /// Outcome of the fee deduction attempt
    pub deduction: DeductionReport,
}

/// Opens a trade offer in `pending`.
///
/// Validates that the offer has at least one item, every item carries at
/// least one image, and the product actually belongs to the target seller.
#[instrument(skip(db, new_trade))]
pub async fn create_trade(
    db: &DatabaseConnection,
    new_trade: NewTrade,
) -> Result<(trade_transaction::Model, Vec<offered_item::Model>)> {
    if new_trade.buyer_id.trim().is_empty() || new_trade.seller_code.trim().is_empty() {
        return Err(Error::Validation {
            message: "Buyer and seller identifiers cannot be empty".to_string(),
        });
    }
    if new_trade.additional_cash < Decimal::ZERO {
        return Err(Error::InvalidAmount {
            amount: new_trade.additional_cash,
        });
    }
    if new_trade.offered_items.is_empty() {
        return Err(Error::Validation {
            message: "A trade offer needs at least one offered item".to_string(),
        });
    }
    for item in &new_trade.offered_items {
        if item.quantity <= 0 {
            return Err(Error::Validation {
                message: format!(
                    "Quantity for '{}' must be positive, got {}",
                    item.name, item.quantity
                ),
            });
        }
        if item.estimated_value < Decimal::ZERO {
            return Err(Error::InvalidAmount {
                amount: item.estimated_value,
            });
        }
        if item.images.is_empty() {
            return Err(Error::Validation {
                message: format!("Offered item '{}' needs at least one image", item.name),
            });
        }
    }

    let txn = db.begin().await?;

    let product = Product::find_by_id(new_trade.product_id)
        .one(&txn)
        .await?
        .ok_or(Error::ProductNotFound {
            id: new_trade.product_id,
        })?;
    if product.seller_code != new_trade.seller_code {
        return Err(Error::Validation {
            message: format!(
                "Product {} does not belong to seller '{}'",
                product.id, new_trade.seller_code
            ),
        });
    }

    let trade = trade_transaction::ActiveModel {
        buyer_id: Set(new_trade.buyer_id.clone()),
        seller_code: Set(new_trade.seller_code.clone()),
        product_id: Set(new_trade.product_id),
        additional_cash: Set(new_trade.additional_cash),
        meetup_location: Set(new_trade.meetup_location.clone()),
        meetup_schedule: Set(new_trade.meetup_schedule),
        status: Set(TradeStatus::Pending.as_str().to_string()),
        wallet_deduction_processed: Set(false),
        is_deleted: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(new_trade.offered_items.len());
    for item in &new_trade.offered_items {
        let row = offered_item::ActiveModel {
            trade_id: Set(trade.id),
            name: Set(item.name.clone()),
            quantity: Set(item.quantity),
            estimated_value: Set(item.estimated_value),
            condition: Set(item.condition.clone()),
            images: Set(ImageRefs(item.images.clone())),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        items.push(row);
    }

    txn.commit().await?;
    info!(
        "Opened trade {} from buyer '{}' to seller '{}' ({} offered items)",
        trade.id,
        trade.buyer_id,
        trade.seller_code,
        items.len()
    );
    Ok((trade, items))
}

/// Finds a trade by id, ignoring soft-deleted rows.
pub async fn get_trade(
    db: &DatabaseConnection,
    trade_id: i64,
) -> Result<Option<trade_transaction::Model>> {
    TradeTransaction::find_by_id(trade_id)
        .one(db)
        .await
        .map(|t| t.filter(|t| !t.is_deleted))
        .map_err(Into::into)
}

/// Retrieves a trade's offered items.
pub async fn get_offered_items(
    db: &DatabaseConnection,
    trade_id: i64,
) -> Result<Vec<offered_item::Model>> {
    OfferedItem::find()
        .filter(offered_item::Column::TradeId.eq(trade_id))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Guarded transition shared by the actor-facing operations. Verifies the
/// actor first, then the transition table, then writes the new status in one
/// transaction.
async fn transition(
    db: &DatabaseConnection,
    trade_id: i64,
    to: TradeStatus,
    guard: impl Fn(&trade_transaction::Model) -> Result<()>,
) -> Result<trade_transaction::Model> {
    let txn = db.begin().await?;

    let trade = TradeTransaction::find_by_id(trade_id)
        .one(&txn)
        .await?
        .filter(|t| !t.is_deleted)
        .ok_or(Error::TradeNotFound { id: trade_id })?;

    guard(&trade)?;

    let current: TradeStatus = trade.status.parse()?;
    if !current.can_transition_to(to) {
        return Err(Error::InvalidTransition {
            from: current.as_str().to_string(),
            to: to.as_str().to_string(),
        });
    }

    let mut model: trade_transaction::ActiveModel = trade.into();
    model.status = Set(to.as_str().to_string());
    let updated = model.update(&txn).await?;
    txn.commit().await?;
    info!(
        "Trade {} moved {} -> {}",
        trade_id,
        current.as_str(),
        to.as_str()
    );
    Ok(updated)
}

fn seller_guard<'a>(
    actor: &'a Actor,
    action: &'a str,
) -> impl Fn(&trade_transaction::Model) -> Result<()> + 'a {
    move |trade| {
        if actor.is_seller(&trade.seller_code) {
            Ok(())
        } else {
            Err(Error::Unauthorized {
                message: format!("Only the seller may {action} trade #{}", trade.id),
            })
        }
    }
}

fn buyer_guard<'a>(
    actor: &'a Actor,
    action: &'a str,
) -> impl Fn(&trade_transaction::Model) -> Result<()> + 'a {
    move |trade| {
        if actor.user_id == trade.buyer_id {
            Ok(())
        } else {
            Err(Error::Unauthorized {
                message: format!("Only the buyer may {action} trade #{}", trade.id),
            })
        }
    }
}

/// Seller accepts a pending offer.
#[instrument(skip(db, notifier))]
pub async fn accept_trade(
    db: &DatabaseConnection,
    trade_id: i64,
    actor: &Actor,
    notifier: &dyn Notifier,
) -> Result<trade_transaction::Model> {
    let trade = transition(
        db,
        trade_id,
        TradeStatus::Accepted,
        seller_guard(actor, "accept"),
    )
    .await?;
    notify::dispatch(
        notifier,
        &NotifyEvent::TradeAccepted {
            trade_id,
            buyer_id: trade.buyer_id.clone(),
        },
    );
    Ok(trade)
}

/// Seller rejects a pending offer.
#[instrument(skip(db, notifier))]
pub async fn reject_trade(
    db: &DatabaseConnection,
    trade_id: i64,
    actor: &Actor,
    notifier: &dyn Notifier,
) -> Result<trade_transaction::Model> {
    let trade = transition(
        db,
        trade_id,
        TradeStatus::Rejected,
        seller_guard(actor, "reject"),
    )
    .await?;
    notify::dispatch(
        notifier,
        &NotifyEvent::TradeRejected {
            trade_id,
            buyer_id: trade.buyer_id.clone(),
        },
    );
    Ok(trade)
}

/// Buyer withdraws an offer while it is still pending or accepted.
#[instrument(skip(db))]
pub async fn cancel_trade(
    db: &DatabaseConnection,
    trade_id: i64,
    actor: &Actor,
) -> Result<trade_transaction::Model> {
    transition(
        db,
        trade_id,
        TradeStatus::Canceled,
        buyer_guard(actor, "cancel"),
    )
    .await
}

/// Seller marks an accepted trade as completed, which triggers the platform
/// fee exactly once for this transition.
///
/// The status commit and the deduction are separate transactions: if the
/// deduction cannot run (wallet missing or inactive, storage failure), the
/// trade still completes and the fee is reported as deferred for a later
/// retry via the engine.
#[instrument(skip(db, notifier))]
pub async fn complete_trade(
    db: &DatabaseConnection,
    trade_id: i64,
    actor: &Actor,
    rate: Decimal,
    notifier: &dyn Notifier,
) -> Result<TradeCompletion> {
    let trade = transition(
        db,
        trade_id,
        TradeStatus::Completed,
        seller_guard(actor, "complete"),
    )
    .await?;
    notify::dispatch(
        notifier,
        &NotifyEvent::TradeCompleted {
            trade_id,
            buyer_id: trade.buyer_id.clone(),
            seller_code: trade.seller_code.clone(),
        },
    );

    let report = DeductionReport::from_result(
        deduction::process_completion(db, DeductionSource::Trade(trade_id), rate, notifier).await,
    );

    // The engine may have flipped the processed flag; reload for callers.
    let trade = get_trade(db, trade_id)
        .await?
        .ok_or(Error::TradeNotFound { id: trade_id })?;

    Ok(TradeCompletion {
        trade,
        deduction: report,
    })
}

/// Tombstones a finished trade. Either party may do this, and only from a
/// terminal status. Returns whether anything was deleted.
#[instrument(skip(db))]
pub async fn soft_delete_trade(
    db: &DatabaseConnection,
    trade_id: i64,
    actor: &Actor,
) -> Result<bool> {
    let Some(trade) = TradeTransaction::find_by_id(trade_id)
        .one(db)
        .await?
        .filter(|t| !t.is_deleted)
    else {
        return Ok(false);
    };

    if actor.user_id != trade.buyer_id && !actor.is_seller(&trade.seller_code) {
        return Err(Error::Unauthorized {
            message: format!("Only a party to trade #{trade_id} may delete it"),
        });
    }

    let status: TradeStatus = trade.status.parse()?;
    if !status.is_terminal() {
        return Err(Error::InvalidTransition {
            from: status.as_str().to_string(),
            to: "deleted".to_string(),
        });
    }

    let mut model: trade_transaction::ActiveModel = trade.into();
    model.is_deleted = Set(true);
    model.update(db).await?;
    info!("Soft-deleted trade {}", trade_id);
    Ok(true)
}

/// Replaces an offered item's image list, re-validating that it never
/// becomes empty.
#[instrument(skip(db, images))]
pub async fn update_offered_item_images(
    db: &DatabaseConnection,
    item_id: i64,
    images: Vec<String>,
) -> Result<offered_item::Model> {
    if images.is_empty() {
        return Err(Error::Validation {
            message: "An offered item must keep at least one image".to_string(),
        });
    }

    let item = OfferedItem::find_by_id(item_id)
        .one(db)
        .await?
        .ok_or(Error::OfferedItemNotFound { id: item_id })?;

    let mut model: offered_item::ActiveModel = item.into();
    model.images = Set(ImageRefs(images));
    model.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::wallet::get_wallet_by_seller;
    use crate::entities::WalletTransaction;
    use crate::notify::LogNotifier;
    use crate::test_utils::{
        FailingNotifier, RecordingNotifier, create_active_wallet, create_test_product,
        create_test_trade, fund_wallet, setup_test_db,
    };
    use rust_decimal_macros::dec;

    fn seller() -> Actor {
        Actor::seller("seller-user", "SELL-001")
    }

    fn buyer() -> Actor {
        Actor::buyer("buyer-1")
    }

    async fn setup_trade(db: &DatabaseConnection) -> Result<trade_transaction::Model> {
        create_active_wallet(db, "SELL-001").await?;
        fund_wallet(db, "SELL-001", dec!(1000.00)).await?;
        let product = create_test_product(db, "SELL-001", dec!(40.00)).await?;
        create_test_trade(db, "buyer-1", "SELL-001", product.id, dec!(10.00)).await
    }

    #[tokio::test]
    async fn test_happy_path_charges_fee_once() -> Result<()> {
        let db = setup_test_db().await?;
        let trade = setup_trade(&db).await?;

        accept_trade(&db, trade.id, &seller(), &LogNotifier).await?;
        let completion = complete_trade(&db, trade.id, &seller(), dec!(5), &LogNotifier).await?;

        assert_eq!(completion.trade.status, "completed");
        assert!(completion.trade.wallet_deduction_processed);
        // basis 40 + 10 = 50 at 5% -> 2.50
        assert!(matches!(
            completion.deduction,
            DeductionReport::Applied { ref fee_charged, .. } if *fee_charged == dec!(2.50)
        ));

        let wallet = get_wallet_by_seller(&db, "SELL-001").await?.unwrap();
        assert_eq!(wallet.balance, dec!(997.50));

        let deduction_rows = WalletTransaction::find()
            .all(&db)
            .await?
            .into_iter()
            .filter(|e| e.entry_type == "deduction")
            .count();
        assert_eq!(deduction_rows, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_pending_cannot_complete_directly() -> Result<()> {
        let db = setup_test_db().await?;
        let trade = setup_trade(&db).await?;

        // Seller skips "accepted" and tries to complete straight away
        let result = complete_trade(&db, trade.id, &seller(), dec!(5), &LogNotifier).await;
        assert!(matches!(result, Err(Error::InvalidTransition { .. })));

        let reloaded = get_trade(&db, trade.id).await?.unwrap();
        assert_eq!(reloaded.status, "pending");

        let wallet = get_wallet_by_seller(&db, "SELL-001").await?.unwrap();
        assert_eq!(wallet.balance, dec!(1000.00));
        Ok(())
    }

    #[tokio::test]
    async fn test_actor_guards() -> Result<()> {
        let db = setup_test_db().await?;
        let trade = setup_trade(&db).await?;

        // Buyer cannot accept
        let result = accept_trade(&db, trade.id, &buyer(), &LogNotifier).await;
        assert!(matches!(result, Err(Error::Unauthorized { .. })));

        // Seller cannot cancel
        let result = cancel_trade(&db, trade.id, &seller()).await;
        assert!(matches!(result, Err(Error::Unauthorized { .. })));

        // A third party can do neither
        let stranger = Actor::seller("rando", "SELL-999");
        assert!(matches!(
            reject_trade(&db, trade.id, &stranger, &LogNotifier).await,
            Err(Error::Unauthorized { .. })
        ));

        let reloaded = get_trade(&db, trade.id).await?.unwrap();
        assert_eq!(reloaded.status, "pending");
        Ok(())
    }

    #[tokio::test]
    async fn test_all_off_table_transitions_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        create_active_wallet(&db, "SELL-001").await?;
        fund_wallet(&db, "SELL-001", dec!(100)).await?;
        let product = create_test_product(&db, "SELL-001", dec!(40.00)).await?;

        // From each terminal state, every further action must fail
        for terminal in ["rejected", "completed", "canceled"] {
            let trade =
                create_test_trade(&db, "buyer-1", "SELL-001", product.id, dec!(0)).await?;
            crate::test_utils::force_trade_status(&db, trade.id, terminal).await?;

            assert!(matches!(
                accept_trade(&db, trade.id, &seller(), &LogNotifier).await,
                Err(Error::InvalidTransition { .. })
            ));
            assert!(matches!(
                reject_trade(&db, trade.id, &seller(), &LogNotifier).await,
                Err(Error::InvalidTransition { .. })
            ));
            assert!(matches!(
                cancel_trade(&db, trade.id, &buyer()).await,
                Err(Error::InvalidTransition { .. })
            ));
            assert!(matches!(
                complete_trade(&db, trade.id, &seller(), dec!(5), &LogNotifier).await,
                Err(Error::InvalidTransition { .. })
            ));

            let reloaded = get_trade(&db, trade.id).await?.unwrap();
            assert_eq!(reloaded.status, terminal);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_buyer_cancel_paths() -> Result<()> {
        let db = setup_test_db().await?;

        // Cancel from pending
        let trade = setup_trade(&db).await?;
        let canceled = cancel_trade(&db, trade.id, &buyer()).await?;
        assert_eq!(canceled.status, "canceled");

        // Cancel from accepted
        let product = create_test_product(&db, "SELL-001", dec!(15.00)).await?;
        let trade2 =
            create_test_trade(&db, "buyer-1", "SELL-001", product.id, dec!(0)).await?;
        accept_trade(&db, trade2.id, &seller(), &LogNotifier).await?;
        let canceled2 = cancel_trade(&db, trade2.id, &buyer()).await?;
        assert_eq!(canceled2.status, "canceled");

        // No fee was ever charged
        let rows = WalletTransaction::find()
            .all(&db)
            .await?
            .into_iter()
            .filter(|e| e.entry_type == "deduction")
            .count();
        assert_eq!(rows, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_reject_notifies_buyer() -> Result<()> {
        let db = setup_test_db().await?;
        let trade = setup_trade(&db).await?;
        let recorder = RecordingNotifier::default();

        reject_trade(&db, trade.id, &seller(), &recorder).await?;

        let events = recorder.events();
        assert_eq!(
            events,
            vec![NotifyEvent::TradeRejected {
                trade_id: trade.id,
                buyer_id: "buyer-1".to_string(),
            }]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_affect_money() -> Result<()> {
        let db = setup_test_db().await?;
        let trade = setup_trade(&db).await?;

        accept_trade(&db, trade.id, &seller(), &FailingNotifier).await?;
        let completion =
            complete_trade(&db, trade.id, &seller(), dec!(5), &FailingNotifier).await?;

        // Fee charged despite every notification failing
        assert!(matches!(
            completion.deduction,
            DeductionReport::Applied { .. }
        ));
        let wallet = get_wallet_by_seller(&db, "SELL-001").await?.unwrap();
        assert_eq!(wallet.balance, dec!(997.50));
        Ok(())
    }

    #[tokio::test]
    async fn test_soft_delete_only_from_terminal_by_party() -> Result<()> {
        let db = setup_test_db().await?;
        let trade = setup_trade(&db).await?;

        // Not terminal yet
        assert!(matches!(
            soft_delete_trade(&db, trade.id, &buyer()).await,
            Err(Error::InvalidTransition { .. })
        ));

        accept_trade(&db, trade.id, &seller(), &LogNotifier).await?;
        complete_trade(&db, trade.id, &seller(), dec!(5), &LogNotifier).await?;

        // A stranger may not delete
        assert!(matches!(
            soft_delete_trade(&db, trade.id, &Actor::buyer("rando")).await,
            Err(Error::Unauthorized { .. })
        ));

        // The buyer may
        assert!(soft_delete_trade(&db, trade.id, &buyer()).await?);
        assert!(get_trade(&db, trade.id).await?.is_none());

        // Gone means gone for a second delete
        assert!(!soft_delete_trade(&db, trade.id, &buyer()).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_trade_validation() -> Result<()> {
        let db = setup_test_db().await?;
        create_active_wallet(&db, "SELL-001").await?;
        let product = create_test_product(&db, "SELL-001", dec!(40.00)).await?;

        let base_item = NewOfferedItem {
            name: "Old textbook".to_string(),
            quantity: 1,
            estimated_value: dec!(5.00),
            condition: "used".to_string(),
            images: vec!["img/textbook.jpg".to_string()],
        };
        let base = NewTrade {
            buyer_id: "buyer-1".to_string(),
            seller_code: "SELL-001".to_string(),
            product_id: product.id,
            additional_cash: dec!(0),
            meetup_location: None,
            meetup_schedule: None,
            offered_items: vec![base_item.clone()],
        };

        // No offered items
        let result = create_trade(
            &db,
            NewTrade {
                offered_items: vec![],
                ..base.clone()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        // Item without images
        let result = create_trade(
            &db,
            NewTrade {
                offered_items: vec![NewOfferedItem {
                    images: vec![],
                    ..base_item.clone()
                }],
                ..base.clone()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        // Product owned by someone else
        let result = create_trade(
            &db,
            NewTrade {
                seller_code: "SELL-OTHER".to_string(),
                ..base.clone()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        // Valid offer goes through and persists its items
        let (trade, items) = create_trade(&db, base).await?;
        assert_eq!(trade.status, "pending");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].images.0, vec!["img/textbook.jpg".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn test_offered_item_images_cannot_become_empty() -> Result<()> {
        let db = setup_test_db().await?;
        let trade = setup_trade(&db).await?;
        let items = get_offered_items(&db, trade.id).await?;
        let item = &items[0];

        let result = update_offered_item_images(&db, item.id, vec![]).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        // Original list untouched
        let reloaded = get_offered_items(&db, trade.id).await?;
        assert!(!reloaded[0].images.is_empty());

        // Replacing with a new non-empty list works
        let updated = update_offered_item_images(
            &db,
            item.id,
            vec!["img/a.jpg".to_string(), "img/b.jpg".to_string()],
        )
        .await?;
        assert_eq!(updated.images.0.len(), 2);
        Ok(())
    }
}
