//! Offered item entity - A buyer-side item in a trade offer.
//!
//! Owned by exactly one trade. Every offered item carries at least one image
//! reference; the list is stored as a typed JSON column so malformed shapes
//! are rejected at the boundary instead of decoded defensively downstream.

use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// Ordered list of opaque image reference strings.
///
/// The core validates non-emptiness on creation and on every edit; this type
/// only guarantees the column is a well-formed JSON array of strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct ImageRefs(pub Vec<String>);

impl ImageRefs {
    /// Whether the list holds no references
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Offered item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "offered_items")]
pub struct Model {
    /// Unique identifier for the offered item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Trade this item belongs to
    pub trade_id: i64,
    /// Item name as described by the buyer
    pub name: String,
    /// Number of units offered
    pub quantity: i32,
    /// Buyer's estimate of the item's value (display only; never part of the
    /// fee basis)
    pub estimated_value: Decimal,
    /// Condition description (e.g. "like new", "well used")
    pub condition: String,
    /// Image references; never empty
    pub images: ImageRefs,
}

/// Defines relationships between offered items and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each offered item belongs to one trade
    #[sea_orm(
        belongs_to = "super::trade_transaction::Entity",
        from = "Column::TradeId",
        to = "super::trade_transaction::Column::Id"
    )]
    TradeTransaction,
}

impl Related<super::trade_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TradeTransaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
