//! Ledger adapter for the DAMM program.

use super::{accounts, derive_position_address, derive_position_nft_account, instructions, program_id};
use crate::rpc::RpcProvider;
use crate::{ClosePositionParams, CreatePositionParams, LedgerAccess};
use async_trait::async_trait;
use damm_cycler_domain::{CyclerError, PoolSnapshot, TrackedPosition};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;
use std::sync::Arc;
use tracing::{debug, info};

/// Concrete [`LedgerAccess`] implementation against the DAMM program.
pub struct DammLedger {
    /// RPC provider for blockchain interaction.
    provider: Arc<RpcProvider>,
}

impl DammLedger {
    /// Creates a new ledger adapter.
    #[must_use]
    pub fn new(provider: Arc<RpcProvider>) -> Self {
        Self { provider }
    }

    /// Signs instructions with a blockhash fetched immediately beforehand.
    ///
    /// The blockhash must be fresh at signing time; a checkpoint fetched
    /// earlier may already have expired by the time the transaction lands.
    pub async fn prepare_and_sign(
        &self,
        instructions: &[Instruction],
        fee_payer: &Pubkey,
        signers: &[&Keypair],
    ) -> Result<Transaction, CyclerError> {
        let blockhash = self
            .provider
            .get_latest_blockhash()
            .await
            .map_err(|e| CyclerError::Submission(e.to_string()))?;

        let signers: Vec<&Keypair> = signers.to_vec();
        Ok(Transaction::new_signed_with_payer(
            instructions,
            Some(fee_payer),
            &signers,
            blockhash,
        ))
    }

    async fn submit(&self, transaction: &Transaction) -> Result<Signature, CyclerError> {
        let signature = self
            .provider
            .send_and_confirm_transaction(transaction)
            .await
            .map_err(|e| CyclerError::Submission(e.to_string()))?;

        info!(signature = %signature, "Transaction confirmed");
        Ok(signature)
    }

    /// Resolves the token program owning a mint account.
    async fn token_program_of(&self, mint: &Pubkey) -> Result<Pubkey, CyclerError> {
        let account = self
            .provider
            .get_account(mint)
            .await
            .map_err(|e| CyclerError::Submission(e.to_string()))?;
        Ok(account.owner)
    }
}

/// Server-side filters selecting the owner's position accounts.
fn position_filters(owner: &Pubkey) -> Vec<RpcFilterType> {
    vec![
        RpcFilterType::Memcmp(Memcmp::new_raw_bytes(
            0,
            accounts::POSITION_DISCRIMINATOR.to_vec(),
        )),
        RpcFilterType::Memcmp(Memcmp::new_raw_bytes(
            accounts::POSITION_OWNER_OFFSET,
            owner.to_bytes().to_vec(),
        )),
    ]
}

#[async_trait]
impl LedgerAccess for DammLedger {
    async fn list_positions(&self, owner: &Pubkey) -> Result<Vec<TrackedPosition>, CyclerError> {
        let accounts_list = self
            .provider
            .get_program_accounts_with_filters(&program_id(), position_filters(owner))
            .await
            .map_err(|_| CyclerError::TransientVisibility)?;

        let mut positions = Vec::new();
        for (address, account) in &accounts_list {
            if !accounts::is_position(&account.data) {
                continue;
            }
            let decoded = accounts::decode_position(address, &account.data)?;
            if decoded.owner == *owner {
                positions.push(decoded.position);
            }
        }

        debug!(owner = %owner, count = positions.len(), "Listed positions");
        Ok(positions)
    }

    async fn fetch_pool(&self, pool: &Pubkey) -> Result<PoolSnapshot, CyclerError> {
        let account = self
            .provider
            .get_account(pool)
            .await
            .map_err(|e| CyclerError::Submission(e.to_string()))?;

        let decoded = accounts::decode_pool(pool, &account.data)?;
        let token_a_program = self.token_program_of(&decoded.token_a_mint).await?;
        let token_b_program = self.token_program_of(&decoded.token_b_mint).await?;

        Ok(PoolSnapshot {
            address: *pool,
            token_a_mint: decoded.token_a_mint,
            token_b_mint: decoded.token_b_mint,
            token_a_vault: decoded.token_a_vault,
            token_b_vault: decoded.token_b_vault,
            token_a_program,
            token_b_program,
            sqrt_price: decoded.sqrt_price,
            liquidity: decoded.liquidity,
            current_point: decoded.current_point,
        })
    }

    async fn submit_create_and_add_liquidity(
        &self,
        owner: &Keypair,
        pool: &PoolSnapshot,
        position_identity: &Keypair,
        params: &CreatePositionParams,
    ) -> Result<Signature, CyclerError> {
        let nft_mint = position_identity.pubkey();
        let position = derive_position_address(&nft_mint);
        let nft_account = derive_position_nft_account(&owner.pubkey(), &nft_mint);

        info!(
            pool = %pool.address,
            position = %position,
            liquidity = params.liquidity_delta,
            "Creating position and adding liquidity"
        );

        let create_ix = instructions::create_position(
            &owner.pubkey(),
            &pool.address,
            &position,
            &nft_mint,
            &nft_account,
        )
        .map_err(|e| CyclerError::Submission(e.to_string()))?;

        let add_ix = instructions::add_liquidity(&owner.pubkey(), pool, &position, &nft_account, params)
            .map_err(|e| CyclerError::Submission(e.to_string()))?;

        let transaction = self
            .prepare_and_sign(&[create_ix, add_ix], &owner.pubkey(), &[owner, position_identity])
            .await?;

        self.submit(&transaction).await
    }

    async fn submit_remove_all_liquidity_and_close(
        &self,
        owner: &Keypair,
        position: &TrackedPosition,
        pool: &PoolSnapshot,
        params: &ClosePositionParams,
    ) -> Result<Signature, CyclerError> {
        info!(
            position = %position.address,
            threshold_a = params.threshold_a,
            threshold_b = params.threshold_b,
            "Removing all liquidity and closing position"
        );

        let remove_ix = instructions::remove_all_liquidity(
            &owner.pubkey(),
            pool,
            &position.address,
            &position.nft_account,
            params,
        )
        .map_err(|e| CyclerError::Submission(e.to_string()))?;

        let claim_ix = instructions::claim_position_fee(
            &owner.pubkey(),
            pool,
            &position.address,
            &position.nft_account,
        )
        .map_err(|e| CyclerError::Submission(e.to_string()))?;

        let close_ix = instructions::close_position(
            &owner.pubkey(),
            &pool.address,
            &position.address,
            &position.nft_account,
        )
        .map_err(|e| CyclerError::Submission(e.to_string()))?;

        let transaction = self
            .prepare_and_sign(&[remove_ix, claim_ix, close_ix], &owner.pubkey(), &[owner])
            .await?;

        self.submit(&transaction).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter_matches(filter: &RpcFilterType, data: &[u8]) -> bool {
        match filter {
            RpcFilterType::Memcmp(memcmp) => memcmp.bytes_match(data),
            _ => panic!("position scan only uses memcmp filters"),
        }
    }

    #[test]
    fn test_position_filters_select_owner_accounts() {
        let owner = Pubkey::new_unique();
        let other = Pubkey::new_unique();

        let mut owned = vec![0u8; 200];
        owned[..8].copy_from_slice(&accounts::POSITION_DISCRIMINATOR);
        owned[accounts::POSITION_OWNER_OFFSET..accounts::POSITION_OWNER_OFFSET + 32]
            .copy_from_slice(owner.as_ref());

        let mut foreign = owned.clone();
        foreign[accounts::POSITION_OWNER_OFFSET..accounts::POSITION_OWNER_OFFSET + 32]
            .copy_from_slice(other.as_ref());

        let filters = position_filters(&owner);
        assert_eq!(filters.len(), 2);
        assert!(filters.iter().all(|f| filter_matches(f, &owned)));
        assert!(!filters.iter().all(|f| filter_matches(f, &foreign)));
    }
}
