//! Command line driver for the DAMM position cycler.

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::CyclerConfig;
use damm_cycler_execution::prelude::*;
use damm_cycler_protocols::LedgerAccess;
use damm_cycler_protocols::damm::DammLedger;
use damm_cycler_protocols::rpc::{RpcConfig, RpcProvider};
use dotenv::dotenv;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

mod config;
mod wallet;

#[derive(Parser)]
#[command(name = "damm-cycler")]
#[command(about = "Open, confirm, and close a single DAMM pool position", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one open/close cycle (or repeat forever with --cycle)
    Run {
        /// Repeat the full cycle until interrupted
        #[arg(long)]
        cycle: bool,
    },
    /// List the owner's current positions and exit
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = CyclerConfig::from_env()?;
    let owner = Arc::new(wallet::load_keypair(&config.keypair)?);
    info!(owner = %owner.pubkey(), pool = %config.pool, "Cycler starting");

    let provider = Arc::new(RpcProvider::new(RpcConfig {
        url: config.rpc_url.clone(),
        commitment: CommitmentConfig::confirmed(),
    }));
    let ledger = Arc::new(DammLedger::new(provider));

    match cli.command {
        Commands::Status => {
            let positions = ledger.list_positions(&owner.pubkey()).await?;
            info!(count = positions.len(), "Current positions");
            for position in positions {
                info!(
                    position = %position.address,
                    pool = %position.pool,
                    liquidity = position.state.liquidity,
                    "Position"
                );
            }
        }
        Commands::Run { cycle } => {
            let token = CancellationToken::new();
            let shutdown = token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Shutdown requested, cancelling pending waits");
                    shutdown.cancel();
                }
            });

            loop {
                if let Err(e) = run_cycle(&ledger, &owner, &config, &token).await {
                    error!(error = %e, "Cycle failed");
                    return Err(e.into());
                }

                if !cycle || token.is_cancelled() {
                    break;
                }
                info!("Cycle complete, starting the next one");
            }
        }
    }

    Ok(())
}

/// Runs one fully serialized open/verify/close/verify cycle.
async fn run_cycle(
    ledger: &Arc<DammLedger>,
    owner: &Arc<Keypair>,
    config: &CyclerConfig,
    token: &CancellationToken,
) -> Result<(), damm_cycler_domain::CyclerError> {
    let mut manager = PositionLifecycleManager::new(
        Arc::clone(ledger),
        Arc::clone(owner),
        config.visibility_policy.clone(),
        token.clone(),
    );

    let position = manager.ensure_open(&config.pool, &config.quote).await?;
    info!(position = %position.address, "Position open");

    // State can have moved since creation; close against a fresh snapshot.
    let snapshot = ledger.fetch_pool(&config.pool).await?;
    manager.close(&position, &snapshot).await?;
    info!(position = %position.address, "Cycle finished, zero positions verified");

    Ok(())
}
