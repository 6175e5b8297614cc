//! Ledger access for the DAMM position cycler.
//!
//! This crate defines the abstract ledger capability the lifecycle engine
//! runs against, plus the concrete Solana adapter:
//! - RPC provider wrapper
//! - DAMM pool instruction builders and account readers
//! - Submit-and-confirm transaction handling

/// DAMM protocol adapter.
pub mod damm;
/// RPC provider.
pub mod rpc;

use async_trait::async_trait;
use damm_cycler_domain::{CyclerError, PoolSnapshot, TrackedPosition};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};

/// Parameters for the create-and-add-liquidity write.
#[derive(Debug, Clone, Copy)]
pub struct CreatePositionParams {
    /// Liquidity to add to the fresh position.
    pub liquidity_delta: u128,
    /// Maximum token A to deposit.
    pub max_amount_a: u64,
    /// Maximum token B to deposit.
    pub max_amount_b: u64,
    /// Token A deposit threshold (quoted amount plus slippage).
    pub threshold_a: u64,
    /// Token B deposit threshold (quoted amount plus slippage).
    pub threshold_b: u64,
}

/// Parameters for the remove-all-liquidity-and-close write.
///
/// The defaults are what the lifecycle engine always submits: zero
/// thresholds, so a close never fails on price movement.
#[derive(Debug, Clone, Default)]
pub struct ClosePositionParams {
    /// Minimum acceptable token A output.
    pub threshold_a: u64,
    /// Minimum acceptable token B output.
    pub threshold_b: u64,
    /// Vesting accounts to unlock before withdrawing.
    pub vestings: Vec<Pubkey>,
    /// Activation point to unlock vestings at.
    pub current_point: u64,
}

/// Abstract ledger capability consumed by the lifecycle engine.
///
/// Reads of positions are eventually consistent: immediately after a
/// confirmed write they may not reflect it yet. Pool reads are strongly
/// consistent. Writes block until the network confirms the transaction.
#[async_trait]
pub trait LedgerAccess: Send + Sync {
    /// Lists positions owned by `owner`. Eventually consistent.
    async fn list_positions(&self, owner: &Pubkey) -> Result<Vec<TrackedPosition>, CyclerError>;

    /// Fetches a fresh pool snapshot. Strongly consistent.
    async fn fetch_pool(&self, pool: &Pubkey) -> Result<PoolSnapshot, CyclerError>;

    /// Creates a position identified by `position_identity` and adds
    /// liquidity to it in one transaction. Returns once confirmed.
    async fn submit_create_and_add_liquidity(
        &self,
        owner: &Keypair,
        pool: &PoolSnapshot,
        position_identity: &Keypair,
        params: &CreatePositionParams,
    ) -> Result<Signature, CyclerError>;

    /// Removes all liquidity from `position`, claims fees, and closes it in
    /// one transaction. Returns once confirmed.
    async fn submit_remove_all_liquidity_and_close(
        &self,
        owner: &Keypair,
        position: &TrackedPosition,
        pool: &PoolSnapshot,
        params: &ClosePositionParams,
    ) -> Result<Signature, CyclerError>;
}
