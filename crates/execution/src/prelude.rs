//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use damm_cycler_execution::prelude::*;
//! ```

pub use crate::lifecycle::{LifecycleStage, PositionLifecycleManager};
pub use crate::retry::{RetryError, RetryExecutor, RetryPolicy};
