//! On-ledger position types.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// Snapshot of a position account as read from the ledger.
///
/// This is re-read before every operation that consumes it; it can change
/// between reads and must never be cached across an operation boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionState {
    /// Liquidity currently supplied by the position.
    pub liquidity: u128,
    /// Unclaimed fees in token A.
    pub fee_a_pending: u64,
    /// Unclaimed fees in token B.
    pub fee_b_pending: u64,
    /// Vesting accounts attached to the position.
    pub vestings: Vec<Pubkey>,
}

/// One open liquidity claim against a pool.
///
/// The two handle fields identify the position and never change after
/// creation; only `state` is refreshed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedPosition {
    /// Position account address.
    pub address: Pubkey,
    /// Token account holding the ownership-proof NFT.
    pub nft_account: Pubkey,
    /// Pool the position belongs to.
    pub pool: Pubkey,
    /// Last-read state snapshot.
    pub state: PositionState,
}

impl TrackedPosition {
    /// Creates a tracked position from its identity handles.
    #[must_use]
    pub fn new(address: Pubkey, nft_account: Pubkey, pool: Pubkey, state: PositionState) -> Self {
        Self {
            address,
            nft_account,
            pool,
            state,
        }
    }
}
