//! Wallet transaction entity - The append-only ledger.
//!
//! Every balance-affecting event writes exactly one row here, capturing the
//! balance before and after the change. Rows with status `"completed"` are
//! immutable; corrections are new `adjustment` rows, never edits. The primary
//! key is a ULID string so concurrent writers cannot collide on ids.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ledger entry database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wallet_transactions")]
pub struct Model {
    /// ULID of the entry (collision-resistant, sortable)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Wallet this entry belongs to
    pub wallet_id: i64,
    /// Entry type: `"credit"`, `"debit"`, `"deduction"`, `"adjustment"`, or `"refill"`
    pub entry_type: String,
    /// Magnitude of the balance change; always stored positive
    pub amount: Decimal,
    /// Wallet balance immediately before this entry was applied
    pub previous_balance: Decimal,
    /// Wallet balance immediately after this entry was applied
    pub new_balance: Decimal,
    /// What kind of record triggered the entry: `"order"`, `"trade"`,
    /// `"adjustment"`, `"refill"`, `"verification"`, or `"withdrawal"`
    pub reference_type: String,
    /// Identifier of the triggering record
    pub reference_id: String,
    /// Entry status: `"pending"`, `"completed"`, `"failed"`, or `"rejected"`
    pub status: String,
    /// Human-readable description of the entry
    pub description: String,
    /// When the entry was processed
    pub processed_at: DateTimeUtc,
}

/// Defines relationships between ledger entries and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry belongs to one wallet
    #[sea_orm(
        belongs_to = "super::wallet::Entity",
        from = "Column::WalletId",
        to = "super::wallet::Column::Id"
    )]
    Wallet,
}

impl Related<super::wallet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
