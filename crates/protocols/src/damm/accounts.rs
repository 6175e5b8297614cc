//! Fixed-offset readers for DAMM program accounts.
//!
//! Only the fields the cycler consumes are decoded; the rest of each
//! account is skipped by offset rather than carrying the full layout.

use damm_cycler_domain::{CyclerError, PositionState, TrackedPosition};
use solana_sdk::pubkey::Pubkey;

/// Discriminator prefix of position accounts.
pub const POSITION_DISCRIMINATOR: [u8; 8] = [0xaa, 0xbc, 0x8f, 0xe4, 0x7a, 0x40, 0xf7, 0xd0];

/// Discriminator prefix of pool accounts.
pub const POOL_DISCRIMINATOR: [u8; 8] = [0xf1, 0x9a, 0x6d, 0x04, 0x11, 0xb1, 0x6d, 0xbc];

// Position layout offsets.
const POSITION_POOL: usize = 8;
/// Byte offset of the owner field, used for server-side memcmp filters.
pub const POSITION_OWNER_OFFSET: usize = 40;
const POSITION_OWNER: usize = POSITION_OWNER_OFFSET;
const POSITION_NFT_ACCOUNT: usize = 72;
const POSITION_LIQUIDITY: usize = 104;
const POSITION_FEE_A: usize = 120;
const POSITION_FEE_B: usize = 128;
const POSITION_LEN: usize = 136;

// Pool layout offsets.
const POOL_TOKEN_A_MINT: usize = 8;
const POOL_TOKEN_B_MINT: usize = 40;
const POOL_TOKEN_A_VAULT: usize = 72;
const POOL_TOKEN_B_VAULT: usize = 104;
const POOL_SQRT_PRICE: usize = 136;
const POOL_LIQUIDITY: usize = 152;
const POOL_CURRENT_POINT: usize = 168;
const POOL_LEN: usize = 176;

/// A decoded position account together with its owner.
#[derive(Debug, Clone)]
pub struct DecodedPosition {
    /// Wallet that owns the position NFT.
    pub owner: Pubkey,
    /// The position itself.
    pub position: TrackedPosition,
}

/// Raw fields decoded from a pool account. The ledger adapter resolves the
/// token programs separately from the mint accounts.
#[derive(Debug, Clone)]
pub struct DecodedPool {
    pub token_a_mint: Pubkey,
    pub token_b_mint: Pubkey,
    pub token_a_vault: Pubkey,
    pub token_b_vault: Pubkey,
    pub sqrt_price: u128,
    pub liquidity: u128,
    pub current_point: u64,
}

/// Whether the buffer carries the position discriminator.
#[must_use]
pub fn is_position(data: &[u8]) -> bool {
    data.len() >= 8 && data[..8] == POSITION_DISCRIMINATOR
}

/// Decodes a position account.
pub fn decode_position(address: &Pubkey, data: &[u8]) -> Result<DecodedPosition, CyclerError> {
    if !is_position(data) || data.len() < POSITION_LEN {
        return Err(CyclerError::Submission(format!(
            "account {address} is not a valid position account"
        )));
    }

    let pool = read_pubkey(data, POSITION_POOL);
    let owner = read_pubkey(data, POSITION_OWNER);
    let nft_account = read_pubkey(data, POSITION_NFT_ACCOUNT);
    let state = PositionState {
        liquidity: read_u128(data, POSITION_LIQUIDITY),
        fee_a_pending: read_u64(data, POSITION_FEE_A),
        fee_b_pending: read_u64(data, POSITION_FEE_B),
        vestings: Vec::new(),
    };

    Ok(DecodedPosition {
        owner,
        position: TrackedPosition::new(*address, nft_account, pool, state),
    })
}

/// Decodes a pool account.
pub fn decode_pool(address: &Pubkey, data: &[u8]) -> Result<DecodedPool, CyclerError> {
    if data.len() < POOL_LEN || data[..8] != POOL_DISCRIMINATOR {
        return Err(CyclerError::Submission(format!(
            "account {address} is not a valid pool account"
        )));
    }

    Ok(DecodedPool {
        token_a_mint: read_pubkey(data, POOL_TOKEN_A_MINT),
        token_b_mint: read_pubkey(data, POOL_TOKEN_B_MINT),
        token_a_vault: read_pubkey(data, POOL_TOKEN_A_VAULT),
        token_b_vault: read_pubkey(data, POOL_TOKEN_B_VAULT),
        sqrt_price: read_u128(data, POOL_SQRT_PRICE),
        liquidity: read_u128(data, POOL_LIQUIDITY),
        current_point: read_u64(data, POOL_CURRENT_POINT),
    })
}

fn read_pubkey(data: &[u8], offset: usize) -> Pubkey {
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&data[offset..offset + 32]);
    Pubkey::new_from_array(bytes)
}

fn read_u64(data: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&data[offset..offset + 8]);
    u64::from_le_bytes(bytes)
}

fn read_u128(data: &[u8], offset: usize) -> u128 {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&data[offset..offset + 16]);
    u128::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic_position(pool: &Pubkey, owner: &Pubkey, nft: &Pubkey, liquidity: u128) -> Vec<u8> {
        let mut data = vec![0u8; POSITION_LEN];
        data[..8].copy_from_slice(&POSITION_DISCRIMINATOR);
        data[POSITION_POOL..POSITION_POOL + 32].copy_from_slice(pool.as_ref());
        data[POSITION_OWNER..POSITION_OWNER + 32].copy_from_slice(owner.as_ref());
        data[POSITION_NFT_ACCOUNT..POSITION_NFT_ACCOUNT + 32].copy_from_slice(nft.as_ref());
        data[POSITION_LIQUIDITY..POSITION_LIQUIDITY + 16]
            .copy_from_slice(&liquidity.to_le_bytes());
        data[POSITION_FEE_A..POSITION_FEE_A + 8].copy_from_slice(&42u64.to_le_bytes());
        data
    }

    #[test]
    fn test_decode_position() {
        let address = Pubkey::new_unique();
        let pool = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let nft = Pubkey::new_unique();

        let data = synthetic_position(&pool, &owner, &nft, 5_000_000);
        let decoded = decode_position(&address, &data).unwrap();

        assert_eq!(decoded.owner, owner);
        assert_eq!(decoded.position.address, address);
        assert_eq!(decoded.position.nft_account, nft);
        assert_eq!(decoded.position.pool, pool);
        assert_eq!(decoded.position.state.liquidity, 5_000_000);
        assert_eq!(decoded.position.state.fee_a_pending, 42);
    }

    #[test]
    fn test_decode_position_rejects_wrong_discriminator() {
        let address = Pubkey::new_unique();
        let mut data = synthetic_position(
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            0,
        );
        data[0] ^= 0xff;

        assert!(!is_position(&data));
        assert!(decode_position(&address, &data).is_err());
    }

    #[test]
    fn test_decode_position_rejects_short_buffer() {
        let address = Pubkey::new_unique();
        let data = POSITION_DISCRIMINATOR.to_vec();
        assert!(decode_position(&address, &data).is_err());
    }

    #[test]
    fn test_decode_pool() {
        let address = Pubkey::new_unique();
        let mint_a = Pubkey::new_unique();
        let mint_b = Pubkey::new_unique();

        let mut data = vec![0u8; POOL_LEN];
        data[..8].copy_from_slice(&POOL_DISCRIMINATOR);
        data[POOL_TOKEN_A_MINT..POOL_TOKEN_A_MINT + 32].copy_from_slice(mint_a.as_ref());
        data[POOL_TOKEN_B_MINT..POOL_TOKEN_B_MINT + 32].copy_from_slice(mint_b.as_ref());
        data[POOL_SQRT_PRICE..POOL_SQRT_PRICE + 16].copy_from_slice(&(1u128 << 64).to_le_bytes());
        data[POOL_CURRENT_POINT..POOL_CURRENT_POINT + 8].copy_from_slice(&777u64.to_le_bytes());

        let decoded = decode_pool(&address, &data).unwrap();
        assert_eq!(decoded.token_a_mint, mint_a);
        assert_eq!(decoded.token_b_mint, mint_b);
        assert_eq!(decoded.sqrt_price, 1u128 << 64);
        assert_eq!(decoded.current_point, 777);
    }
}
