//! Unified error types and result handling for the wallet core.
//!
//! Every money-path failure is surfaced to the caller through [`Error`];
//! nothing in this crate swallows a failed mutation. The variants follow the
//! split the completion pipeline cares about: validation failures (rejected
//! before any write), state-machine guard failures, recoverable wallet
//! problems (retry after the wallet is fixed), and storage failures (the
//! whole transaction rolled back).

use rust_decimal::Decimal;
use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration problem (bad config file, malformed stored setting).
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of what was wrong
        message: String,
    },

    /// Underlying database failure. The enclosing transaction, if any, has
    /// been rolled back; the caller may retry.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// An amount that is zero, negative where positivity is required, or
    /// otherwise outside the acceptable range.
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The offending amount
        amount: Decimal,
    },

    /// Input rejected before any mutation took place.
    #[error("Validation error: {message}")]
    Validation {
        /// What the caller got wrong
        message: String,
    },

    /// A state-machine transition not present in the transition table.
    /// The record's state is unchanged.
    #[error("Invalid transition from '{from}' to '{to}'")]
    InvalidTransition {
        /// Status the record currently holds
        from: String,
        /// Status the caller asked for
        to: String,
    },

    /// The acting user is not allowed to perform this transition.
    #[error("Not authorized: {message}")]
    Unauthorized {
        /// Which guard failed
        message: String,
    },

    /// No wallet exists for the seller. Recoverable: create/fix the wallet
    /// and retry the deduction.
    #[error("No wallet found for seller '{seller_code}'")]
    WalletNotFound {
        /// Seller identifier the lookup used
        seller_code: String,
    },

    /// The wallet exists but is not active; credits and debits are refused.
    /// Recoverable: activate the wallet and retry.
    #[error("Wallet for seller '{seller_code}' is not active (status: {status})")]
    WalletInactive {
        /// Seller identifier
        seller_code: String,
        /// The wallet's current status
        status: String,
    },

    /// A balance change that would overdraw the wallet, on a path where
    /// clamping is not the policy (admin adjustments).
    #[error("Insufficient balance: have {current}, need {required}")]
    InsufficientBalance {
        /// Balance at the time of the attempt
        current: Decimal,
        /// Amount the operation needed
        required: Decimal,
    },

    /// Order lookup failed.
    #[error("Order not found: {id}")]
    OrderNotFound {
        /// Order primary key
        id: i64,
    },

    /// Trade lookup failed.
    #[error("Trade not found: {id}")]
    TradeNotFound {
        /// Trade primary key
        id: i64,
    },

    /// Product lookup failed (trade fee basis needs the seller's product).
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// Product primary key
        id: i64,
    },

    /// Offered-item lookup failed.
    #[error("Offered item not found: {id}")]
    OfferedItemNotFound {
        /// Offered-item primary key
        id: i64,
    },

    /// A stored status string that no known status maps to.
    #[error("Unknown status value: '{value}'")]
    UnknownStatus {
        /// The raw string found in storage
        value: String,
    },
}

impl Error {
    /// Whether the failed operation is safe and sensible to retry later
    /// without caller-side changes.
    ///
    /// Wallet problems leave the source record's deduction flag untouched so
    /// the completion can be re-processed once the wallet is fixed; database
    /// errors roll the whole unit back. Validation, guard, and lookup
    /// failures will fail the same way again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Database(_) | Error::WalletNotFound { .. } | Error::WalletInactive { .. }
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
