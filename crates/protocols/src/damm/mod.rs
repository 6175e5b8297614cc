//! DAMM pool protocol adapter.
//!
//! This module talks to the on-chain DAMM program:
//! - Read pool and position accounts
//! - Build create / add-liquidity / remove-liquidity / close instructions
//! - Sign with a fresh blockhash and submit with blocking confirmation

/// Account readers for on-chain state.
pub mod accounts;
/// Instruction builders.
pub mod instructions;
/// Ledger adapter implementing [`crate::LedgerAccess`].
pub mod ledger;

pub use ledger::DammLedger;

use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

/// DAMM program ID (mainnet).
pub const DAMM_PROGRAM_ID: &str = "cpamdpZCGKUy5JxQXB4dcpGPiikHawvSWAd6mEn1sGG";

/// Associated token program ID.
pub const ASSOCIATED_TOKEN_PROGRAM_ID: &str = "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL";

/// System program ID.
pub const SYSTEM_PROGRAM_ID: &str = "11111111111111111111111111111111";

/// Parses the DAMM program ID.
#[must_use]
pub fn program_id() -> Pubkey {
    Pubkey::from_str(DAMM_PROGRAM_ID).expect("Invalid program ID")
}

/// Derives the position PDA for a position NFT mint.
#[must_use]
pub fn derive_position_address(nft_mint: &Pubkey) -> Pubkey {
    let (position, _bump) =
        Pubkey::find_program_address(&[b"position", nft_mint.as_ref()], &program_id());
    position
}

/// Derives the owner's associated token account for the position NFT.
#[must_use]
pub fn derive_position_nft_account(owner: &Pubkey, nft_mint: &Pubkey) -> Pubkey {
    let ata_program = Pubkey::from_str(ASSOCIATED_TOKEN_PROGRAM_ID).expect("Invalid ATA program ID");
    let (ata, _bump) = Pubkey::find_program_address(
        &[owner.as_ref(), spl_token::ID.as_ref(), nft_mint.as_ref()],
        &ata_program,
    );
    ata
}
