//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod offered_item;
pub mod order;
pub mod order_item;
pub mod product;
pub mod system_state;
pub mod trade_transaction;
pub mod wallet;
pub mod wallet_transaction;

// Re-export specific types to avoid conflicts
pub use offered_item::{Column as OfferedItemColumn, Entity as OfferedItem, Model as OfferedItemModel};
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel};
pub use order_item::{Column as OrderItemColumn, Entity as OrderItem, Model as OrderItemModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use system_state::{
    Column as SystemStateColumn, Entity as SystemState, Model as SystemStateModel,
};
pub use trade_transaction::{
    Column as TradeTransactionColumn, Entity as TradeTransaction, Model as TradeTransactionModel,
};
pub use wallet::{Column as WalletColumn, Entity as Wallet, Model as WalletModel};
pub use wallet_transaction::{
    Column as WalletTransactionColumn, Entity as WalletTransaction, Model as WalletTransactionModel,
};
