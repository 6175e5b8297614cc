//! Slippage math.

/// Adds a slippage allowance to an amount.
///
/// `amount * (10_000 + bps) / 10_000` with truncating integer division.
/// Used when building deposit thresholds; closing never goes through here
/// because it always submits zero thresholds.
#[must_use]
pub fn add_slippage(amount: u64, bps: u16) -> u64 {
    let scaled = u128::from(amount) * (10_000u128 + u128::from(bps)) / 10_000u128;
    scaled as u64
}
