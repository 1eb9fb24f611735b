//! Product entity - The catalog collaborator.
//!
//! Listing management lives in the catalog service; this core only reads the
//! price of a seller's product to compute the trade fee basis.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Product name
    pub name: String,
    /// Listed price
    pub price: Decimal,
    /// Seller code of the listing owner
    pub seller_code: String,
    /// Optional listing description
    pub description: Option<String>,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One product can be the subject of many trades
    #[sea_orm(has_many = "super::trade_transaction::Entity")]
    TradeTransactions,
}

impl Related<super::trade_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TradeTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
