//! RPC provider wrapper.

use anyhow::{Context, Result};
use solana_account_decoder::UiAccountEncoding;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::RpcFilterType;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::account::Account;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use tracing::debug;

/// Configuration for the RPC provider.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// RPC endpoint URL.
    pub url: String,
    /// Commitment level for reads and confirmations.
    pub commitment: CommitmentConfig,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "https://api.mainnet-beta.solana.com".to_string(),
            commitment: CommitmentConfig::confirmed(),
        }
    }
}

/// Thin wrapper over the nonblocking RPC client.
pub struct RpcProvider {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl RpcProvider {
    /// Creates a new provider.
    #[must_use]
    pub fn new(config: RpcConfig) -> Self {
        Self {
            client: RpcClient::new_with_commitment(config.url, config.commitment),
            commitment: config.commitment,
        }
    }

    /// Fetches the latest blockhash.
    pub async fn get_latest_blockhash(&self) -> Result<Hash> {
        self.client
            .get_latest_blockhash()
            .await
            .context("Failed to get latest blockhash")
    }

    /// Fetches a single account.
    pub async fn get_account(&self, address: &Pubkey) -> Result<Account> {
        self.client
            .get_account(address)
            .await
            .with_context(|| format!("Failed to fetch account {address}"))
    }

    /// Fetches program accounts matching server-side filters.
    ///
    /// Scans are always filtered; an unfiltered scan of a busy program
    /// would pull (or get rejected for) its entire account set.
    pub async fn get_program_accounts_with_filters(
        &self,
        program: &Pubkey,
        filters: Vec<RpcFilterType>,
    ) -> Result<Vec<(Pubkey, Account)>> {
        let config = RpcProgramAccountsConfig {
            filters: Some(filters),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.commitment),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };

        let accounts = self
            .client
            .get_program_accounts_with_config(program, config)
            .await
            .with_context(|| format!("Failed to fetch program accounts for {program}"))?;

        debug!(program = %program, count = accounts.len(), "Fetched program accounts");
        Ok(accounts)
    }

    /// Sends a transaction and waits for confirmation.
    pub async fn send_and_confirm_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        self.client
            .send_and_confirm_transaction(transaction)
            .await
            .context("Failed to send and confirm transaction")
    }
}
