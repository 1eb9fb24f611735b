//! Trade transaction entity - A barter negotiation between buyer and seller.
//!
//! The buyer offers items (see `offered_item`) plus optional cash for the
//! seller's listed product. Status transitions are strictly gated by the
//! state machine in `core::trade`; only `completed` triggers a fee deduction,
//! and the fee basis is the seller's product price plus the cash component -
//! never the buyer's offered-item values.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Trade transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trade_transactions")]
pub struct Model {
    /// Unique identifier for the trade
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User id of the buyer (the offering party)
    pub buyer_id: String,
    /// Seller code of the receiving party (wallet key)
    pub seller_code: String,
    /// The seller's product being traded for
    pub product_id: i64,
    /// Cash the buyer adds on top of the offered items
    pub additional_cash: Decimal,
    /// Where the parties agreed to meet, if set
    pub meetup_location: Option<String>,
    /// When the parties agreed to meet, if set
    pub meetup_schedule: Option<DateTimeUtc>,
    /// Status: `"pending"`, `"accepted"`, `"rejected"`, `"completed"`, or `"canceled"`
    pub status: String,
    /// Whether the platform-fee deduction has been applied for this trade
    pub wallet_deduction_processed: bool,
    /// Soft delete flag - only settable from a terminal status
    pub is_deleted: bool,
    /// When the trade was opened
    pub created_at: DateTimeUtc,
}

/// Defines relationships between TradeTransaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One trade has one or more buyer-side offered items
    #[sea_orm(has_many = "super::offered_item::Entity")]
    OfferedItems,
    /// Each trade is for one of the seller's products
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::offered_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OfferedItems.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
