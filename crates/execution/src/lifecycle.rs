//! Position lifecycle state machine.
//!
//! Sequences the open / verify / close / verify protocol for exactly one
//! tracked position. Creation visibility lag is expected and absorbed by
//! the retry executor; a position still visible after a confirmed close is
//! a correctness failure and is never retried.

use crate::retry::{RetryError, RetryExecutor, RetryPolicy};
use damm_cycler_domain::{CyclerError, DepositQuote, PoolSnapshot, TrackedPosition, add_slippage};
use damm_cycler_protocols::{ClosePositionParams, CreatePositionParams, LedgerAccess};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Stage of the tracked position's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleStage {
    /// No position exists and none is being created.
    NoPosition,
    /// Create-and-add-liquidity write is being submitted.
    Creating,
    /// Write confirmed; waiting for the read path to show the position.
    AwaitingVisibility,
    /// Position is observable on the ledger.
    Open,
    /// Remove-and-close write is being submitted.
    Closing,
    /// Write confirmed; verifying the position is gone.
    AwaitingAbsence,
    /// Zero positions verified for the owner.
    Closed,
}

/// Drives one position through its full lifecycle against a ledger.
pub struct PositionLifecycleManager<L: LedgerAccess> {
    /// Ledger access capability.
    ledger: Arc<L>,
    /// Owner of the position; read-only, shared by reference.
    owner: Arc<Keypair>,
    /// Retry executor absorbing creation-visibility lag.
    retry: RetryExecutor,
    /// Cancellation for retry waits.
    token: CancellationToken,
    /// Current stage, for observability.
    stage: LifecycleStage,
}

impl<L: LedgerAccess> PositionLifecycleManager<L> {
    /// Creates a manager starting at [`LifecycleStage::NoPosition`].
    pub fn new(
        ledger: Arc<L>,
        owner: Arc<Keypair>,
        visibility_policy: RetryPolicy,
        token: CancellationToken,
    ) -> Self {
        Self {
            ledger,
            owner,
            retry: RetryExecutor::new(visibility_policy),
            token,
            stage: LifecycleStage::NoPosition,
        }
    }

    /// Current lifecycle stage.
    #[must_use]
    pub fn stage(&self) -> LifecycleStage {
        self.stage
    }

    fn enter(&mut self, stage: LifecycleStage) {
        debug!(from = ?self.stage, to = ?stage, "Lifecycle transition");
        self.stage = stage;
    }

    /// Ensures one open position exists for the owner and returns it.
    ///
    /// If a position is already observable, it is returned directly and no
    /// write is submitted. Otherwise a position is created with liquidity
    /// from `quote` (thresholds carry the quote's slippage allowance), the
    /// write is confirmed, and the read path is polled with backoff until
    /// the position appears or the retry budget runs out.
    pub async fn ensure_open(
        &mut self,
        pool: &Pubkey,
        quote: &DepositQuote,
    ) -> Result<TrackedPosition, CyclerError> {
        let owner_key = self.owner.pubkey();

        let existing = self.ledger.list_positions(&owner_key).await?;
        if let Some(position) = existing.into_iter().next() {
            info!(position = %position.address, "Position already open, skipping creation");
            self.enter(LifecycleStage::Open);
            return Ok(position);
        }

        self.enter(LifecycleStage::Creating);
        let snapshot = self.ledger.fetch_pool(pool).await?;
        let position_identity = Keypair::new();
        let params = CreatePositionParams {
            liquidity_delta: quote.liquidity_delta,
            max_amount_a: quote.amount_a,
            max_amount_b: quote.amount_b,
            threshold_a: add_slippage(quote.amount_a, quote.slippage_bps),
            threshold_b: add_slippage(quote.amount_b, quote.slippage_bps),
        };

        let signature = self
            .ledger
            .submit_create_and_add_liquidity(&self.owner, &snapshot, &position_identity, &params)
            .await?;
        info!(signature = %signature, "Create confirmed, waiting for visibility");

        self.enter(LifecycleStage::AwaitingVisibility);
        let ledger = Arc::clone(&self.ledger);
        // Only transient outcomes consume retry budget; a non-transient read
        // error escapes the loop untouched.
        let outcome = self
            .retry
            .run(&self.token, move || {
                let ledger = Arc::clone(&ledger);
                async move {
                    match ledger.list_positions(&owner_key).await {
                        Ok(positions) if positions.is_empty() => {
                            Err(CyclerError::TransientVisibility)
                        }
                        Ok(positions) => Ok(Ok(positions)),
                        Err(err) if err.is_transient() => Err(err),
                        Err(err) => Ok(Err(err)),
                    }
                }
            })
            .await;

        let mut positions = match outcome {
            Ok(Ok(positions)) => positions,
            Ok(Err(err)) => return Err(err),
            Err(RetryError::Cancelled) => return Err(CyclerError::Cancelled),
            Err(RetryError::Exhausted(source)) => {
                return Err(CyclerError::RetryExhausted {
                    source: Box::new(source),
                });
            }
        };

        let position = positions.remove(0);
        info!(position = %position.address, "Position visible on ledger");
        self.enter(LifecycleStage::Open);
        Ok(position)
    }

    /// Fully withdraws and closes `position`, then verifies absence.
    ///
    /// The close is always submitted with zero token thresholds so that it
    /// can never fail on price movement. The verification read runs exactly
    /// once: a non-empty result here means the close did not take full
    /// effect, which is fatal rather than transient.
    pub async fn close(
        &mut self,
        position: &TrackedPosition,
        pool: &PoolSnapshot,
    ) -> Result<(), CyclerError> {
        self.enter(LifecycleStage::Closing);

        // Accept any output amounts; closing must only fail on an outright
        // ledger error.
        let params = ClosePositionParams::default();
        let signature = self
            .ledger
            .submit_remove_all_liquidity_and_close(&self.owner, position, pool, &params)
            .await?;
        info!(signature = %signature, "Close confirmed, verifying absence");

        self.enter(LifecycleStage::AwaitingAbsence);
        let remaining = self.ledger.list_positions(&self.owner.pubkey()).await?;
        if !remaining.is_empty() {
            return Err(CyclerError::ConsistencyViolation {
                remaining: remaining.len(),
            });
        }

        self.enter(LifecycleStage::Closed);
        info!(position = %position.address, "Position closed and absence verified");
        Ok(())
    }
}
