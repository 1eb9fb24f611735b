//! Wallet entity - Per-seller running balance account.
//!
//! Each seller has exactly one wallet, keyed by their seller code. The wallet
//! starts in the `pending` state when the user becomes a seller and only
//! accepts credits/debits once explicitly activated. The balance invariant
//! (never negative) is enforced by the core debit path, not the schema.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Wallet database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    /// Unique identifier for the wallet
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Seller code this wallet belongs to (one wallet per seller)
    #[sea_orm(unique)]
    pub seller_code: String,
    /// Current balance; never negative
    pub balance: Decimal,
    /// Whether the wallet has gone through activation
    pub is_activated: bool,
    /// Lifecycle status: `"pending"`, `"active"`, or `"suspended"`
    pub status: String,
    /// When the wallet was activated, if it has been
    pub activated_at: Option<DateTimeUtc>,
    /// Soft delete flag - transaction history keeps referencing the row
    pub is_deleted: bool,
    /// When the wallet row was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Wallet and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One wallet has many ledger entries
    #[sea_orm(has_many = "super::wallet_transaction::Entity")]
    WalletTransactions,
}

impl Related<super::wallet_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WalletTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
