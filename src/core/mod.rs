//! Core business logic - framework-agnostic wallet, ledger, and
//! transaction-completion operations.
//!
//! Everything in here takes a `DatabaseConnection` (or an open transaction)
//! and returns structured data; HTTP handlers, admin panels, and background
//! jobs in the consuming application are thin wrappers over these functions.

/// The deduction engine: fee computation and the atomic completion pipeline
pub mod deduction;
/// Append-only wallet transaction log operations
pub mod ledger;
/// Order lifecycle and the completion hook
pub mod order;
/// Deduction-rate and generic settings over the system state store
pub mod settings;
/// Trade negotiation state machine
pub mod trade;
/// Wallet lifecycle, credits, debits, and administrative adjustments
pub mod wallet;

/// Authenticated actor performing an operation.
///
/// Supplied by the consuming application's auth layer; this core only uses it
/// for the ownership guards on state transitions and admin operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Stable user identifier
    pub user_id: String,
    /// Seller code, present when the user has a seller profile
    pub seller_code: Option<String>,
}

impl Actor {
    /// An actor with no seller profile (plain buyer)
    #[must_use]
    pub fn buyer(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            seller_code: None,
        }
    }

    /// An actor with a seller profile
    #[must_use]
    pub fn seller(user_id: impl Into<String>, seller_code: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            seller_code: Some(seller_code.into()),
        }
    }

    /// Whether this actor is the seller identified by `seller_code`
    #[must_use]
    pub fn is_seller(&self, seller_code: &str) -> bool {
        self.seller_code.as_deref() == Some(seller_code)
    }
}
