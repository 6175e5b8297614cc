//! Instruction builders for the DAMM program.
//!
//! Data layouts use the program's 8-byte discriminators followed by
//! little-endian arguments, the same shape the pool program's IDL defines.

use super::{SYSTEM_PROGRAM_ID, program_id};
use crate::{ClosePositionParams, CreatePositionParams};
use anyhow::Result;
use damm_cycler_domain::PoolSnapshot;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

/// Builds the create-position instruction.
pub fn create_position(
    owner: &Pubkey,
    pool: &Pubkey,
    position: &Pubkey,
    nft_mint: &Pubkey,
    nft_account: &Pubkey,
) -> Result<Instruction> {
    // CreatePosition discriminator
    let discriminator: [u8; 8] = [0x30, 0xf9, 0x0b, 0xbe, 0x62, 0xd1, 0x7a, 0x51];

    let system_program = Pubkey::from_str(SYSTEM_PROGRAM_ID)?;

    let accounts = vec![
        AccountMeta::new(*owner, true),                        // payer and position owner
        AccountMeta::new(*nft_mint, true),                     // position_nft_mint
        AccountMeta::new(*nft_account, false),                 // position_nft_account
        AccountMeta::new(*pool, false),                        // pool
        AccountMeta::new(*position, false),                    // position
        AccountMeta::new_readonly(spl_token::ID, false),       // token_program
        AccountMeta::new_readonly(system_program, false),      // system_program
    ];

    Ok(Instruction {
        program_id: program_id(),
        accounts,
        data: discriminator.to_vec(),
    })
}

/// Builds the add-liquidity instruction.
pub fn add_liquidity(
    owner: &Pubkey,
    pool: &PoolSnapshot,
    position: &Pubkey,
    nft_account: &Pubkey,
    params: &CreatePositionParams,
) -> Result<Instruction> {
    // AddLiquidity discriminator
    let discriminator: [u8; 8] = [0xe5, 0x11, 0x7c, 0x27, 0xd6, 0x70, 0x23, 0x8a];

    let mut data = Vec::with_capacity(8 + 16 + 8 * 4);
    data.extend_from_slice(&discriminator);
    data.extend_from_slice(&params.liquidity_delta.to_le_bytes());
    data.extend_from_slice(&params.max_amount_a.to_le_bytes());
    data.extend_from_slice(&params.max_amount_b.to_le_bytes());
    data.extend_from_slice(&params.threshold_a.to_le_bytes());
    data.extend_from_slice(&params.threshold_b.to_le_bytes());

    let accounts = vec![
        AccountMeta::new(pool.address, false),                     // pool
        AccountMeta::new(*position, false),                        // position
        AccountMeta::new_readonly(*nft_account, false),            // position_nft_account
        AccountMeta::new_readonly(*owner, true),                   // position owner
        AccountMeta::new(pool.token_a_vault, false),               // token_a_vault
        AccountMeta::new(pool.token_b_vault, false),               // token_b_vault
        AccountMeta::new_readonly(pool.token_a_mint, false),       // token_a_mint
        AccountMeta::new_readonly(pool.token_b_mint, false),       // token_b_mint
        AccountMeta::new_readonly(pool.token_a_program, false),    // token_a_program
        AccountMeta::new_readonly(pool.token_b_program, false),    // token_b_program
    ];

    Ok(Instruction {
        program_id: program_id(),
        accounts,
        data,
    })
}

/// Builds the remove-all-liquidity instruction.
pub fn remove_all_liquidity(
    owner: &Pubkey,
    pool: &PoolSnapshot,
    position: &Pubkey,
    nft_account: &Pubkey,
    params: &ClosePositionParams,
) -> Result<Instruction> {
    // RemoveAllLiquidity discriminator
    let discriminator: [u8; 8] = [0x0a, 0x33, 0x2d, 0xc2, 0x8b, 0xc1, 0xf4, 0x3e];

    let mut data = Vec::with_capacity(8 + 8 * 2);
    data.extend_from_slice(&discriminator);
    data.extend_from_slice(&params.threshold_a.to_le_bytes());
    data.extend_from_slice(&params.threshold_b.to_le_bytes());

    let accounts = vec![
        AccountMeta::new(pool.address, false),                     // pool
        AccountMeta::new(*position, false),                        // position
        AccountMeta::new_readonly(*nft_account, false),            // position_nft_account
        AccountMeta::new_readonly(*owner, true),                   // position owner
        AccountMeta::new(pool.token_a_vault, false),               // token_a_vault
        AccountMeta::new(pool.token_b_vault, false),               // token_b_vault
        AccountMeta::new_readonly(pool.token_a_mint, false),       // token_a_mint
        AccountMeta::new_readonly(pool.token_b_mint, false),       // token_b_mint
        AccountMeta::new_readonly(pool.token_a_program, false),    // token_a_program
        AccountMeta::new_readonly(pool.token_b_program, false),    // token_b_program
    ];

    Ok(Instruction {
        program_id: program_id(),
        accounts,
        data,
    })
}

/// Builds the claim-position-fee instruction.
pub fn claim_position_fee(
    owner: &Pubkey,
    pool: &PoolSnapshot,
    position: &Pubkey,
    nft_account: &Pubkey,
) -> Result<Instruction> {
    // ClaimPositionFee discriminator
    let discriminator: [u8; 8] = [0xb4, 0x6f, 0x55, 0x92, 0x1c, 0x3d, 0x09, 0xe7];

    let accounts = vec![
        AccountMeta::new(pool.address, false),                  // pool
        AccountMeta::new(*position, false),                     // position
        AccountMeta::new_readonly(*nft_account, false),         // position_nft_account
        AccountMeta::new_readonly(*owner, true),                // position owner
        AccountMeta::new(pool.token_a_vault, false),            // token_a_vault
        AccountMeta::new(pool.token_b_vault, false),            // token_b_vault
    ];

    Ok(Instruction {
        program_id: program_id(),
        accounts,
        data: discriminator.to_vec(),
    })
}

/// Builds the close-position instruction.
pub fn close_position(
    owner: &Pubkey,
    pool: &Pubkey,
    position: &Pubkey,
    nft_account: &Pubkey,
) -> Result<Instruction> {
    // ClosePosition discriminator
    let discriminator: [u8; 8] = [0x7b, 0x86, 0x51, 0x0c, 0x31, 0x5b, 0xfc, 0x00];

    let accounts = vec![
        AccountMeta::new_readonly(*owner, true),         // position owner
        AccountMeta::new(*owner, false),                 // rent receiver
        AccountMeta::new(*pool, false),                  // pool
        AccountMeta::new(*position, false),              // position
        AccountMeta::new(*nft_account, false),           // position_nft_account
        AccountMeta::new_readonly(spl_token::ID, false), // token_program
    ];

    Ok(Instruction {
        program_id: program_id(),
        accounts,
        data: discriminator.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::pubkey::Pubkey;

    fn snapshot() -> PoolSnapshot {
        PoolSnapshot {
            address: Pubkey::new_unique(),
            token_a_mint: Pubkey::new_unique(),
            token_b_mint: Pubkey::new_unique(),
            token_a_vault: Pubkey::new_unique(),
            token_b_vault: Pubkey::new_unique(),
            token_a_program: spl_token::ID,
            token_b_program: spl_token::ID,
            sqrt_price: 1 << 64,
            liquidity: 0,
            current_point: 0,
        }
    }

    #[test]
    fn test_add_liquidity_encodes_thresholds() {
        let pool = snapshot();
        let params = CreatePositionParams {
            liquidity_delta: 1_000,
            max_amount_a: 10,
            max_amount_b: 20,
            threshold_a: 11,
            threshold_b: 22,
        };

        let ix = add_liquidity(
            &Pubkey::new_unique(),
            &pool,
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &params,
        )
        .unwrap();

        assert_eq!(ix.program_id, program_id());
        // disc(8) + liquidity(16) + 4 amounts(8 each)
        assert_eq!(ix.data.len(), 56);
        assert_eq!(&ix.data[8..24], &1_000u128.to_le_bytes());
        assert_eq!(&ix.data[40..48], &11u64.to_le_bytes());
        assert_eq!(&ix.data[48..56], &22u64.to_le_bytes());
    }

    #[test]
    fn test_remove_all_liquidity_defaults_to_zero_thresholds() {
        let pool = snapshot();
        let ix = remove_all_liquidity(
            &Pubkey::new_unique(),
            &pool,
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &ClosePositionParams::default(),
        )
        .unwrap();

        assert_eq!(&ix.data[8..16], &0u64.to_le_bytes());
        assert_eq!(&ix.data[16..24], &0u64.to_le_bytes());
    }

    #[test]
    fn test_owner_signs_every_instruction() {
        let owner = Pubkey::new_unique();
        let pool = snapshot();
        let position = Pubkey::new_unique();
        let nft = Pubkey::new_unique();

        for ix in [
            create_position(&owner, &pool.address, &position, &Pubkey::new_unique(), &nft).unwrap(),
            add_liquidity(
                &owner,
                &pool,
                &position,
                &nft,
                &CreatePositionParams {
                    liquidity_delta: 1,
                    max_amount_a: 1,
                    max_amount_b: 1,
                    threshold_a: 1,
                    threshold_b: 1,
                },
            )
            .unwrap(),
            remove_all_liquidity(&owner, &pool, &position, &nft, &ClosePositionParams::default())
                .unwrap(),
            claim_position_fee(&owner, &pool, &position, &nft).unwrap(),
            close_position(&owner, &pool.address, &position, &nft).unwrap(),
        ] {
            assert!(
                ix.accounts
                    .iter()
                    .any(|meta| meta.pubkey == owner && meta.is_signer),
                "owner must sign"
            );
        }
    }
}
