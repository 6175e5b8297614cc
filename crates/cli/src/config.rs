//! Run configuration.
//!
//! Everything the cycler needs is read from the environment once, up
//! front, into an explicit config value. Components never look up ambient
//! state themselves.

use damm_cycler_domain::{CyclerError, DepositQuote};
use damm_cycler_execution::prelude::RetryPolicy;
use solana_sdk::pubkey::Pubkey;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Where the owner keypair comes from.
#[derive(Debug, Clone)]
pub enum KeypairSource {
    /// Path to a JSON keypair file.
    File(String),
    /// Base58-encoded secret key.
    Base58(String),
}

/// Full configuration for one run.
#[derive(Debug, Clone)]
pub struct CyclerConfig {
    /// RPC endpoint URL.
    pub rpc_url: String,
    /// Owner keypair source.
    pub keypair: KeypairSource,
    /// Pool to cycle a position against.
    pub pool: Pubkey,
    /// Deposit quote for position creation.
    pub quote: DepositQuote,
    /// Backoff policy for the creation-visibility read loop.
    pub visibility_policy: RetryPolicy,
}

impl CyclerConfig {
    /// Builds the configuration from the process environment.
    ///
    /// Required: `POOL_ADDRESS` and one of `WALLET_KEYPAIR_PATH` /
    /// `WALLET_PRIVATE_KEY`. Everything else has defaults.
    pub fn from_env() -> Result<Self, CyclerError> {
        let rpc_url = env::var("RPC_URL")
            .unwrap_or_else(|_| "https://api.mainnet-beta.solana.com".to_string());

        let keypair = match (env::var("WALLET_KEYPAIR_PATH"), env::var("WALLET_PRIVATE_KEY")) {
            (Ok(path), _) => KeypairSource::File(path),
            (_, Ok(secret)) => KeypairSource::Base58(secret),
            _ => {
                return Err(CyclerError::Configuration(
                    "set WALLET_KEYPAIR_PATH or WALLET_PRIVATE_KEY".to_string(),
                ));
            }
        };

        let pool = required_pubkey("POOL_ADDRESS")?;

        let quote = DepositQuote {
            liquidity_delta: parse_or("LIQUIDITY_DELTA", 1_000_000u128)?,
            amount_a: parse_or("MAX_AMOUNT_A", 1_000_000u64)?,
            amount_b: parse_or("MAX_AMOUNT_B", 1_000_000u64)?,
            slippage_bps: parse_or("SLIPPAGE_BPS", 100u16)?,
        };

        // The retry bound is deliberately a knob, not a constant.
        let visibility_policy = RetryPolicy {
            max_retries: parse_or("VISIBILITY_MAX_RETRIES", 8u32)?,
            initial_delay: Duration::from_secs(parse_or("VISIBILITY_INITIAL_DELAY_SECS", 2u64)?),
            max_delay: Duration::from_secs(parse_or("VISIBILITY_MAX_DELAY_SECS", 30u64)?),
            backoff_multiplier: 2.0,
            debug_trace: env::var("RETRY_DEBUG").is_ok(),
        };

        Ok(Self {
            rpc_url,
            keypair,
            pool,
            quote,
            visibility_policy,
        })
    }
}

fn required_pubkey(name: &str) -> Result<Pubkey, CyclerError> {
    let value = env::var(name)
        .map_err(|_| CyclerError::Configuration(format!("{name} must be set")))?;
    parse_pubkey(name, &value)
}

/// Parses a pubkey, mapping failures to a configuration error.
pub fn parse_pubkey(name: &str, value: &str) -> Result<Pubkey, CyclerError> {
    Pubkey::from_str(value)
        .map_err(|e| CyclerError::Configuration(format!("{name} is not a valid pubkey: {e}")))
}

fn parse_or<T: FromStr>(name: &str, default: T) -> Result<T, CyclerError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| CyclerError::Configuration(format!("{name} is malformed: {e}"))),
        Err(_) => Ok(default),
    }
}
