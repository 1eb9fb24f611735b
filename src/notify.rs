//! Notification dispatch seam.
//!
//! Email/push delivery belongs to the consuming application; this core only
//! emits events through the [`Notifier`] trait. Dispatch is fire-and-forget:
//! a failed notification is logged and dropped, and must never influence the
//! outcome of the money path that produced it.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, warn};

/// Events this core emits for the outside world to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyEvent {
    /// The seller accepted a trade offer
    TradeAccepted {
        /// Trade primary key
        trade_id: i64,
        /// Buyer to notify
        buyer_id: String,
    },
    /// The seller rejected a trade offer
    TradeRejected {
        /// Trade primary key
        trade_id: i64,
        /// Buyer to notify
        buyer_id: String,
    },
    /// A trade reached its terminal completed state
    TradeCompleted {
        /// Trade primary key
        trade_id: i64,
        /// Buyer to notify
        buyer_id: String,
        /// Seller to notify
        seller_code: String,
    },
    /// An order reached its terminal completed state
    OrderCompleted {
        /// Order primary key
        order_id: i64,
        /// Buyer to notify
        buyer_id: String,
        /// Seller to notify
        seller_code: String,
    },
    /// A platform fee was charged against a seller's wallet
    FeeDeducted {
        /// Seller whose wallet was charged
        seller_code: String,
        /// `"order"` or `"trade"`
        reference_type: &'static str,
        /// Source record id
        reference_id: String,
        /// Amount actually debited
        amount: Decimal,
    },
}

/// Delivery failure reported by a [`Notifier`] implementation.
#[derive(Debug, Error)]
#[error("Notification failed: {0}")]
pub struct NotifyError(pub String);

/// Outbound notification channel supplied by the consuming application.
pub trait Notifier: Send + Sync {
    /// Attempts to deliver one event.
    fn notify(&self, event: &NotifyEvent) -> std::result::Result<(), NotifyError>;
}

/// Default notifier: writes events to the log and always succeeds.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: &NotifyEvent) -> std::result::Result<(), NotifyError> {
        info!("Notification: {:?}", event);
        Ok(())
    }
}

/// Fire-and-forget dispatch: delivery failures are logged, never propagated.
pub(crate) fn dispatch(notifier: &dyn Notifier, event: &NotifyEvent) {
    if let Err(e) = notifier.notify(event) {
        warn!("Dropping failed notification {:?}: {}", event, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysFails;

    impl Notifier for AlwaysFails {
        fn notify(&self, _event: &NotifyEvent) -> std::result::Result<(), NotifyError> {
            Err(NotifyError("smtp down".to_string()))
        }
    }

    #[test]
    fn test_dispatch_swallows_failures() {
        // Must not panic or propagate
        dispatch(
            &AlwaysFails,
            &NotifyEvent::TradeAccepted {
                trade_id: 1,
                buyer_id: "buyer".to_string(),
            },
        );
    }

    #[test]
    fn test_log_notifier_succeeds() {
        assert!(
            LogNotifier
                .notify(&NotifyEvent::TradeRejected {
                    trade_id: 2,
                    buyer_id: "buyer".to_string(),
                })
                .is_ok()
        );
    }
}
