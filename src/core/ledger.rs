//! Ledger business logic - The append-only wallet transaction log.
//!
//! Every balance change goes through [`record_entry`] inside the same storage
//! transaction as the balance mutation, capturing the before/after balances
//! at write time. Completed rows are never edited; corrections are new
//! adjustment rows. [`find_completed_deduction`] is the idempotency probe the
//! deduction engine runs before charging a fee.

use crate::{
    entities::{WalletTransaction, wallet_transaction},
    errors::{Error, Result},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, DatabaseConnection, QueryOrder, QuerySelect, Set, prelude::*};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Direction/category of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// Balance increase from marketplace activity
    Credit,
    /// Generic balance decrease
    Debit,
    /// Platform-fee balance decrease on a completed order/trade
    Deduction,
    /// Administrative correction, either direction
    Adjustment,
    /// Seller topping up their wallet
    Refill,
}

impl EntryType {
    /// Storage representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Credit => "credit",
            EntryType::Debit => "debit",
            EntryType::Deduction => "deduction",
            EntryType::Adjustment => "adjustment",
            EntryType::Refill => "refill",
        }
    }

    /// Whether this entry type increases the wallet balance
    #[must_use]
    pub fn is_credit_like(&self) -> bool {
        matches!(self, EntryType::Credit | EntryType::Refill)
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "credit" => Ok(EntryType::Credit),
            "debit" => Ok(EntryType::Debit),
            "deduction" => Ok(EntryType::Deduction),
            "adjustment" => Ok(EntryType::Adjustment),
            "refill" => Ok(EntryType::Refill),
            _ => Err(Error::UnknownStatus {
                value: s.to_string(),
            }),
        }
    }
}

/// Kind of record a ledger entry points back at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceType {
    /// A completed order
    Order,
    /// A completed trade
    Trade,
    /// An administrative adjustment action
    Adjustment,
    /// A wallet top-up
    Refill,
    /// A seller verification event
    Verification,
    /// A payout to the seller
    Withdrawal,
}

impl ReferenceType {
    /// Storage representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceType::Order => "order",
            ReferenceType::Trade => "trade",
            ReferenceType::Adjustment => "adjustment",
            ReferenceType::Refill => "refill",
            ReferenceType::Verification => "verification",
            ReferenceType::Withdrawal => "withdrawal",
        }
    }
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Recorded but not yet settled
    Pending,
    /// Settled; the row is immutable from here on
    Completed,
    /// Attempted and failed
    Failed,
    /// Refused by policy or an operator
    Rejected,
}

impl EntryStatus {
    /// Storage representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "pending",
            EntryStatus::Completed => "completed",
            EntryStatus::Failed => "failed",
            EntryStatus::Rejected => "rejected",
        }
    }
}

/// A ledger entry about to be written.
///
/// `amount` is the magnitude of the change (always non-negative);
/// `previous_balance`/`new_balance` are the caller's authoritative reads from
/// inside the same transaction.
#[derive(Debug, Clone)]
pub struct NewEntry {
    /// Wallet the entry belongs to
    pub wallet_id: i64,
    /// Entry category
    pub entry_type: EntryType,
    /// Magnitude of the balance change
    pub amount: Decimal,
    /// Balance before the change
    pub previous_balance: Decimal,
    /// Balance after the change
    pub new_balance: Decimal,
    /// What triggered the entry
    pub reference_type: ReferenceType,
    /// Identifier of the triggering record
    pub reference_id: String,
    /// Entry status
    pub status: EntryStatus,
    /// Human-readable description
    pub description: String,
}

/// Appends one ledger row inside the caller's transaction.
///
/// The id is a fresh ULID so concurrent writers can never collide, and the
/// amount is validated non-negative (a capped deduction against an empty
/// wallet legitimately records zero).
pub async fn record_entry<C>(db: &C, entry: NewEntry) -> Result<wallet_transaction::Model>
where
    C: ConnectionTrait,
{
    if entry.amount < Decimal::ZERO {
        return Err(Error::InvalidAmount {
            amount: entry.amount,
        });
    }

    let expected = if entry.entry_type.is_credit_like() {
        entry.previous_balance + entry.amount
    } else if entry.entry_type == EntryType::Adjustment {
        // Adjustments go either way; the balances themselves carry the sign.
        entry.new_balance
    } else {
        entry.previous_balance - entry.amount
    };
    if expected != entry.new_balance {
        return Err(Error::Validation {
            message: format!(
                "Ledger entry does not conserve balance: {} {} {} != {}",
                entry.previous_balance, entry.entry_type, entry.amount, entry.new_balance
            ),
        });
    }

    let model = wallet_transaction::ActiveModel {
        id: Set(ulid::Ulid::new().to_string()),
        wallet_id: Set(entry.wallet_id),
        entry_type: Set(entry.entry_type.as_str().to_string()),
        amount: Set(entry.amount),
        previous_balance: Set(entry.previous_balance),
        new_balance: Set(entry.new_balance),
        reference_type: Set(entry.reference_type.as_str().to_string()),
        reference_id: Set(entry.reference_id),
        status: Set(entry.status.as_str().to_string()),
        description: Set(entry.description),
        processed_at: Set(Utc::now()),
    };

    let result = model.insert(db).await?;
    debug!(
        "Recorded {} entry {} for wallet_id {}: amount={}, balance {} -> {}",
        result.entry_type,
        result.id,
        result.wallet_id,
        result.amount,
        result.previous_balance,
        result.new_balance
    );
    Ok(result)
}

/// The idempotency probe: finds the completed platform-fee row for a source
/// record, if one was ever written.
///
/// Must run inside the same transaction that would write the new row, so two
/// concurrent completion triggers for the same source serialize on the store
/// instead of both passing the check.
pub async fn find_completed_deduction<C>(
    db: &C,
    reference_type: ReferenceType,
    reference_id: &str,
) -> Result<Option<wallet_transaction::Model>>
where
    C: ConnectionTrait,
{
    WalletTransaction::find()
        .filter(wallet_transaction::Column::EntryType.eq(EntryType::Deduction.as_str()))
        .filter(wallet_transaction::Column::Status.eq(EntryStatus::Completed.as_str()))
        .filter(wallet_transaction::Column::ReferenceType.eq(reference_type.as_str()))
        .filter(wallet_transaction::Column::ReferenceId.eq(reference_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the most recent entries for a wallet, newest first.
pub async fn get_recent_for_wallet(
    db: &DatabaseConnection,
    wallet_id: i64,
    limit: u64,
) -> Result<Vec<wallet_transaction::Model>> {
    WalletTransaction::find()
        .filter(wallet_transaction::Column::WalletId.eq(wallet_id))
        .order_by_desc(wallet_transaction::Column::ProcessedAt)
        .order_by_desc(wallet_transaction::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Reconstructs a wallet's balance by replaying its completed entries in
/// chronological order.
///
/// Each step is checked against the entry's recorded before/after snapshot,
/// so a corrupted ledger surfaces as an error instead of a wrong number.
/// Used by tests and admin reconciliation.
pub async fn replay_balance(db: &DatabaseConnection, wallet_id: i64) -> Result<Decimal> {
    let entries = WalletTransaction::find()
        .filter(wallet_transaction::Column::WalletId.eq(wallet_id))
        .filter(wallet_transaction::Column::Status.eq(EntryStatus::Completed.as_str()))
        .order_by_asc(wallet_transaction::Column::ProcessedAt)
        .order_by_asc(wallet_transaction::Column::Id)
        .all(db)
        .await?;

    let mut balance = Decimal::ZERO;
    for entry in entries {
        if entry.previous_balance != balance {
            return Err(Error::Validation {
                message: format!(
                    "Ledger gap at entry {}: expected previous_balance {}, found {}",
                    entry.id, balance, entry.previous_balance
                ),
            });
        }
        let entry_type: EntryType = entry.entry_type.parse()?;
        let delta = if entry_type.is_credit_like() {
            entry.amount
        } else if entry_type == EntryType::Adjustment {
            entry.new_balance - entry.previous_balance
        } else {
            -entry.amount
        };
        balance += delta;
        if balance != entry.new_balance {
            return Err(Error::Validation {
                message: format!(
                    "Ledger entry {} does not conserve balance: computed {}, recorded {}",
                    entry.id, balance, entry.new_balance
                ),
            });
        }
    }

    Ok(balance)
}
