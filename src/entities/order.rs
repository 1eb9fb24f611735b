//! Order entity - A purchase of listed goods from a seller.
//!
//! Orders move through seller-driven statuses; `Completed` is the terminal
//! state that triggers the platform-fee deduction and `Cancelled` is terminal
//! with no deduction. The `wallet_deduction_processed` flag marks that the
//! fee pipeline has already run for this order.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// User id of the buyer
    pub buyer_id: String,
    /// Seller code of the selling party (wallet key)
    pub seller_code: String,
    /// Stored order total; fallback fee basis when no line items exist
    pub subtotal: Decimal,
    /// Status: `"Pending"`, `"Accepted"`, `"Processing"`, `"Shipped"`,
    /// `"Delivered"`, `"Completed"`, or `"Cancelled"`
    pub status: String,
    /// Whether the platform-fee deduction has been applied for this order
    pub wallet_deduction_processed: bool,
    /// When the order was placed
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One order has many line items
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
