//! Core domain types for the DAMM position cycler.
//!
//! This crate holds the value types shared by every other crate:
//! - Position and pool snapshots as read from the ledger
//! - The error taxonomy for the whole run
//! - Pure math helpers (slippage)
//!
//! No I/O happens here.

/// Error taxonomy.
pub mod error;
/// Pool snapshot and deposit quote types.
pub mod pool;
/// Tracked position types.
pub mod position;
/// Slippage math.
pub mod slippage;

pub use error::CyclerError;
pub use pool::{DepositQuote, PoolSnapshot};
pub use position::{PositionState, TrackedPosition};
pub use slippage::add_slippage;
