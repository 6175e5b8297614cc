//! Lifecycle engine for a single DAMM position.
//!
//! This crate provides the two core pieces of the cycler:
//! - Bounded retry with exponential backoff, used to absorb
//!   read-after-write lag on the ledger's read path
//! - The position lifecycle state machine sequencing
//!   create / confirm / close / verify

/// Prelude module for convenient imports.
pub mod prelude;

/// Position lifecycle state machine.
pub mod lifecycle;
/// Bounded retry with exponential backoff.
pub mod retry;
