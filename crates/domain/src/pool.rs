//! Pool snapshot and deposit quote types.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

/// Snapshot of a DAMM pool account.
///
/// Read immediately before any operation that depends on price; a snapshot
/// is consumed by exactly one operation and then discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSnapshot {
    /// Pool account address.
    pub address: Pubkey,
    /// Mint of token A.
    pub token_a_mint: Pubkey,
    /// Mint of token B.
    pub token_b_mint: Pubkey,
    /// Vault holding the pool's token A.
    pub token_a_vault: Pubkey,
    /// Vault holding the pool's token B.
    pub token_b_vault: Pubkey,
    /// Token program owning the A mint.
    pub token_a_program: Pubkey,
    /// Token program owning the B mint.
    pub token_b_program: Pubkey,
    /// Current sqrt price (Q64.64).
    pub sqrt_price: u128,
    /// Total pool liquidity.
    pub liquidity: u128,
    /// Current activation point of the pool.
    pub current_point: u64,
}

/// Quote for a liquidity deposit, supplied by the caller.
///
/// The cycler treats these values as opaque; it does not price anything
/// itself. Slippage is applied on top of the quoted amounts at creation
/// time only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DepositQuote {
    /// Liquidity to add.
    pub liquidity_delta: u128,
    /// Quoted amount of token A.
    pub amount_a: u64,
    /// Quoted amount of token B.
    pub amount_b: u64,
    /// Slippage tolerance in basis points, applied to both amounts.
    pub slippage_bps: u16,
}
