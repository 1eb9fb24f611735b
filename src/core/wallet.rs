//! Wallet business logic - Per-seller balance accounts.
//!
//! Wallets are created pending when a user becomes a seller and only accept
//! money movement once activated. All balance changes pair an atomic
//! database-level update with a ledger row written in the same transaction;
//! [`debit_wallet`] is the single path by which a balance ever decreases and
//! implements the clamp-to-available-balance rule, so no sequence of calls
//! can drive a balance negative.

use crate::{
    core::ledger::{self, EntryStatus, EntryType, NewEntry, ReferenceType},
    entities::{Wallet, wallet, wallet_transaction},
    errors::{Error, Result},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, Set, TransactionTrait, prelude::*, sea_query::Expr,
};
use std::fmt;
use std::str::FromStr;
use tracing::{info, instrument, warn};

use super::Actor;

/// Wallet lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletStatus {
    /// Created but not yet activated; refuses credits and debits
    Pending,
    /// Fully operational
    Active,
    /// Deactivated by an operator; refuses credits and debits
    Suspended,
}

impl WalletStatus {
    /// Storage representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletStatus::Pending => "pending",
            WalletStatus::Active => "active",
            WalletStatus::Suspended => "suspended",
        }
    }
}

impl fmt::Display for WalletStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WalletStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(WalletStatus::Pending),
            "active" => Ok(WalletStatus::Active),
            "suspended" => Ok(WalletStatus::Suspended),
            _ => Err(Error::UnknownStatus {
                value: s.to_string(),
            }),
        }
    }
}

/// Result of a debit attempt: what was asked for, what actually moved.
#[derive(Debug, Clone)]
pub struct DebitOutcome {
    /// Wallet state after the debit
    pub wallet: wallet::Model,
    /// The ledger row written for this debit
    pub entry: wallet_transaction::Model,
    /// Amount the caller asked to debit
    pub requested: Decimal,
    /// Amount actually debited (capped at the available balance)
    pub debited: Decimal,
}

/// Wallet overview for seller and admin dashboards.
#[derive(Debug, Clone)]
pub struct WalletSummary {
    /// The wallet record
    pub wallet: wallet::Model,
    /// Current balance
    pub balance: Decimal,
    /// Lifecycle status
    pub status: WalletStatus,
    /// Most recent ledger entries, newest first
    pub recent_transactions: Vec<wallet_transaction::Model>,
}

/// Creates a pending wallet for a seller. One wallet per seller code.
#[instrument(skip(db))]
pub async fn create_wallet(db: &DatabaseConnection, seller_code: &str) -> Result<wallet::Model> {
    if seller_code.trim().is_empty() {
        return Err(Error::Validation {
            message: "Seller code cannot be empty".to_string(),
        });
    }

    let existing = Wallet::find()
        .filter(wallet::Column::SellerCode.eq(seller_code))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(Error::Validation {
            message: format!("A wallet already exists for seller '{seller_code}'"),
        });
    }

    let model = wallet::ActiveModel {
        seller_code: Set(seller_code.to_string()),
        balance: Set(Decimal::ZERO),
        is_activated: Set(false),
        status: Set(WalletStatus::Pending.as_str().to_string()),
        activated_at: Set(None),
        is_deleted: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let result = model.insert(db).await?;
    info!(
        "Created pending wallet {} for seller '{}'",
        result.id, seller_code
    );
    Ok(result)
}

/// Finds a seller's wallet, ignoring soft-deleted rows.
pub async fn get_wallet_by_seller<C>(db: &C, seller_code: &str) -> Result<Option<wallet::Model>>
where
    C: ConnectionTrait,
{
    Wallet::find()
        .filter(wallet::Column::SellerCode.eq(seller_code))
        .filter(wallet::Column::IsDeleted.eq(false))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Verifies a wallet can move money: activated and in the `active` status.
pub(crate) fn require_active(wallet: &wallet::Model) -> Result<()> {
    let status: WalletStatus = wallet.status.parse()?;
    if status != WalletStatus::Active || !wallet.is_activated {
        return Err(Error::WalletInactive {
            seller_code: wallet.seller_code.clone(),
            status: wallet.status.clone(),
        });
    }
    Ok(())
}

/// Activates a seller's wallet, stamping the activation time.
///
/// Activating an already-active wallet is a no-op; pending and suspended
/// wallets both become active.
#[instrument(skip(db))]
pub async fn activate_wallet(db: &DatabaseConnection, seller_code: &str) -> Result<wallet::Model> {
    let wallet = get_wallet_by_seller(db, seller_code)
        .await?
        .ok_or_else(|| Error::WalletNotFound {
            seller_code: seller_code.to_string(),
        })?;

    if wallet.status.parse::<WalletStatus>()? == WalletStatus::Active {
        return Ok(wallet);
    }

    let mut model: wallet::ActiveModel = wallet.into();
    model.status = Set(WalletStatus::Active.as_str().to_string());
    model.is_activated = Set(true);
    model.activated_at = Set(Some(Utc::now()));
    let result = model.update(db).await?;
    info!("Activated wallet for seller '{}'", seller_code);
    Ok(result)
}

/// Suspends an active wallet. Only `active -> suspended` is valid.
#[instrument(skip(db))]
pub async fn suspend_wallet(db: &DatabaseConnection, seller_code: &str) -> Result<wallet::Model> {
    let wallet = get_wallet_by_seller(db, seller_code)
        .await?
        .ok_or_else(|| Error::WalletNotFound {
            seller_code: seller_code.to_string(),
        })?;

    let status: WalletStatus = wallet.status.parse()?;
    if status != WalletStatus::Active {
        return Err(Error::InvalidTransition {
            from: wallet.status.clone(),
            to: WalletStatus::Suspended.as_str().to_string(),
        });
    }

    let mut model: wallet::ActiveModel = wallet.into();
    model.status = Set(WalletStatus::Suspended.as_str().to_string());
    let result = model.update(db).await?;
    warn!("Suspended wallet for seller '{}'", seller_code);
    Ok(result)
}

/// Credits a seller's wallet and writes the matching ledger row atomically.
///
/// `entry_type` must be a credit-like type (`credit` or `refill`). An
/// inactive wallet is an error, not a silent no-op.
#[instrument(skip(db, description))]
pub async fn credit_wallet(
    db: &DatabaseConnection,
    seller_code: &str,
    amount: Decimal,
    entry_type: EntryType,
    reference_type: ReferenceType,
    reference_id: &str,
    description: &str,
) -> Result<wallet::Model> {
    if amount <= Decimal::ZERO {
        return Err(Error::InvalidAmount { amount });
    }
    if !entry_type.is_credit_like() {
        return Err(Error::Validation {
            message: format!("'{entry_type}' is not a credit entry type"),
        });
    }

    let txn = db.begin().await?;

    let wallet = get_wallet_by_seller(&txn, seller_code)
        .await?
        .ok_or_else(|| Error::WalletNotFound {
            seller_code: seller_code.to_string(),
        })?;
    require_active(&wallet)?;

    let previous_balance = wallet.balance;
    let new_balance = previous_balance + amount;

    Wallet::update_many()
        .col_expr(
            wallet::Column::Balance,
            Expr::col(wallet::Column::Balance).add(amount),
        )
        .filter(wallet::Column::Id.eq(wallet.id))
        .exec(&txn)
        .await?;

    ledger::record_entry(
        &txn,
        NewEntry {
            wallet_id: wallet.id,
            entry_type,
            amount,
            previous_balance,
            new_balance,
            reference_type,
            reference_id: reference_id.to_string(),
            status: EntryStatus::Completed,
            description: description.to_string(),
        },
    )
    .await?;

    let updated = Wallet::find_by_id(wallet.id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::WalletNotFound {
            seller_code: seller_code.to_string(),
        })?;

    txn.commit().await?;
    info!(
        "Credited wallet for seller '{}': +{} ({} -> {})",
        seller_code, amount, previous_balance, new_balance
    );
    Ok(updated)
}

/// Debits a wallet inside the caller's transaction, clamping to the
/// available balance.
///
/// This is the only path by which a balance decreases. If the requested
/// amount exceeds the balance, only the balance is debited and the ledger
/// row records the capped amount; the remainder is forgone, not owed. A zero
/// debit is legal (it still produces the audit row) so a fully-capped fee
/// against an empty wallet leaves its idempotency marker.
pub async fn debit_wallet<C>(
    db: &C,
    wallet: &wallet::Model,
    amount: Decimal,
    entry_type: EntryType,
    reference_type: ReferenceType,
    reference_id: &str,
    description: &str,
) -> Result<DebitOutcome>
where
    C: ConnectionTrait,
{
    if amount < Decimal::ZERO {
        return Err(Error::InvalidAmount { amount });
    }
    if entry_type.is_credit_like() {
        return Err(Error::Validation {
            message: format!("'{entry_type}' is not a debit entry type"),
        });
    }
    require_active(wallet)?;

    let previous_balance = wallet.balance;
    let debited = amount.min(previous_balance);
    let new_balance = previous_balance - debited;

    Wallet::update_many()
        .col_expr(
            wallet::Column::Balance,
            Expr::col(wallet::Column::Balance).sub(debited),
        )
        .filter(wallet::Column::Id.eq(wallet.id))
        .exec(db)
        .await?;

    let entry = ledger::record_entry(
        db,
        NewEntry {
            wallet_id: wallet.id,
            entry_type,
            amount: debited,
            previous_balance,
            new_balance,
            reference_type,
            reference_id: reference_id.to_string(),
            status: EntryStatus::Completed,
            description: description.to_string(),
        },
    )
    .await?;

    let updated = Wallet::find_by_id(wallet.id)
        .one(db)
        .await?
        .ok_or_else(|| Error::WalletNotFound {
            seller_code: wallet.seller_code.clone(),
        })?;

    if debited < amount {
        warn!(
            "Capped debit for seller '{}': requested {}, balance was {}",
            wallet.seller_code, amount, previous_balance
        );
    }

    Ok(DebitOutcome {
        wallet: updated,
        entry,
        requested: amount,
        debited,
    })
}

/// Administrative balance override.
///
/// Writes an `adjustment` ledger row with the same atomicity as every other
/// money path. A negative adjustment that would overdraw the wallet is
/// rejected outright rather than clamped: the operator should re-issue the
/// correct amount, and a clamped row would misstate their intent.
#[instrument(skip(db, reason))]
pub async fn adjust_wallet_balance(
    db: &DatabaseConnection,
    wallet_id: i64,
    signed_amount: Decimal,
    reason: &str,
    actor: &Actor,
) -> Result<wallet::Model> {
    if signed_amount == Decimal::ZERO {
        return Err(Error::InvalidAmount {
            amount: signed_amount,
        });
    }
    if reason.trim().is_empty() {
        return Err(Error::Validation {
            message: "Adjustment reason cannot be empty".to_string(),
        });
    }

    let txn = db.begin().await?;

    let wallet = Wallet::find_by_id(wallet_id)
        .one(&txn)
        .await?
        .filter(|w| !w.is_deleted)
        .ok_or_else(|| Error::Validation {
            message: format!("Wallet {wallet_id} not found"),
        })?;
    require_active(&wallet)?;

    let previous_balance = wallet.balance;
    let magnitude = signed_amount.abs();
    let new_balance = previous_balance + signed_amount;
    if new_balance < Decimal::ZERO {
        return Err(Error::InsufficientBalance {
            current: previous_balance,
            required: magnitude,
        });
    }

    Wallet::update_many()
        .col_expr(
            wallet::Column::Balance,
            Expr::col(wallet::Column::Balance).add(signed_amount),
        )
        .filter(wallet::Column::Id.eq(wallet.id))
        .exec(&txn)
        .await?;

    ledger::record_entry(
        &txn,
        NewEntry {
            wallet_id: wallet.id,
            entry_type: EntryType::Adjustment,
            amount: magnitude,
            previous_balance,
            new_balance,
            reference_type: ReferenceType::Adjustment,
            reference_id: format!("admin:{}", actor.user_id),
            status: EntryStatus::Completed,
            description: reason.to_string(),
        },
    )
    .await?;

    let updated = Wallet::find_by_id(wallet.id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::Validation {
            message: format!("Wallet {wallet_id} not found"),
        })?;

    txn.commit().await?;
    info!(
        "Adjusted wallet {} by {} ({} -> {}) on behalf of '{}'",
        wallet_id, signed_amount, previous_balance, new_balance, actor.user_id
    );
    Ok(updated)
}

/// Builds the wallet overview exposed to seller and admin dashboards.
#[instrument(skip(db))]
pub async fn get_wallet_summary(
    db: &DatabaseConnection,
    seller_code: &str,
) -> Result<WalletSummary> {
    let wallet = get_wallet_by_seller(db, seller_code)
        .await?
        .ok_or_else(|| Error::WalletNotFound {
            seller_code: seller_code.to_string(),
        })?;

    let recent_transactions = ledger::get_recent_for_wallet(db, wallet.id, 10).await?;
    let status: WalletStatus = wallet.status.parse()?;
    let balance = wallet.balance;

    Ok(WalletSummary {
        wallet,
        balance,
        status,
        recent_transactions,
    })
}

/// Soft-deletes a seller's wallet. The row and its ledger history remain;
/// lookups stop returning it. Returns whether anything was deleted.
#[instrument(skip(db))]
pub async fn soft_delete_wallet(db: &DatabaseConnection, seller_code: &str) -> Result<bool> {
    let Some(wallet) = get_wallet_by_seller(db, seller_code).await? else {
        return Ok(false);
    };

    let mut model: wallet::ActiveModel = wallet.into();
    model.is_deleted = Set(true);
    model.update(db).await?;
    info!("Soft-deleted wallet for seller '{}'", seller_code);
    Ok(true)
}
