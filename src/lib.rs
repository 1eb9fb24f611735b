//! `TradeMart` wallet core - the money engine of a campus marketplace.
//!
//! This crate owns per-seller wallets, the append-only transaction ledger,
//! and the pipeline that charges the platform fee exactly once when an order
//! or a barter trade reaches its completed state. The surrounding
//! marketplace application (catalog, auth, uploads, UI, email delivery)
//! consumes these operations through plain async functions over a database
//! connection.
//!
//! Two rules shape the whole design:
//! - every balance change pairs an atomic wallet update with a ledger row
//!   written in the same storage transaction, capturing the before/after
//!   balances as the audit trail;
//! - a completion may be observed any number of times (double submits,
//!   reconciliation sweeps, retries after crashes) but charges its fee at
//!   most once, enforced by an in-transaction ledger probe keyed on the
//!   source record.
//!
//! A status change and its fee deduction are deliberately *not* one
//! cross-aggregate transaction: if the deduction cannot run, the marketplace
//! flow proceeds and the fee is reported as deferred for a later retry. See
//! `core::deduction` for the pipeline.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    // Security and correctness
    unsafe_code,
    unsafe_op_in_unsafe_fn,

    // Code quality - things that are almost always bugs
    unreachable_code,
    unreachable_patterns,
    unused_must_use,

    // Documentation - broken links are bugs
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    // Documentation - missing docs should be added gradually
    missing_docs,

    // Clippy categories for overall code quality
    clippy::all,
    clippy::pedantic,
    clippy::nursery,

    // Performance
    clippy::inefficient_to_string,
    clippy::large_types_passed_by_value,
    clippy::needless_pass_by_value,
    clippy::unnecessary_wraps,

    // Correctness
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::exit,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,

    // Complexity and readability
    clippy::cognitive_complexity,
    clippy::large_enum_variant,
    clippy::match_same_arms,
    clippy::too_many_lines,

    // Style consistency
    clippy::enum_glob_use,
    clippy::inconsistent_struct_constructor,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::redundant_closure_for_method_calls,
    clippy::semicolon_if_nothing_returned,
    clippy::wildcard_imports,

    // Future compatibility
    future_incompatible,
    rust_2018_idioms,
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,  // Common pattern in Rust
    clippy::missing_errors_doc,        // Will add gradually
    clippy::missing_panics_doc,        // Will add gradually
)]

/// Configuration management for database and marketplace settings
pub mod config;
/// Core business logic - wallets, ledger, orders, trades, and the deduction engine
pub mod core;
/// SeaORM entity definitions for database tables
pub mod entities;
/// Unified error types and result handling
pub mod errors;
/// Fire-and-forget notification dispatch seam
pub mod notify;

#[cfg(test)]
pub mod test_utils;
