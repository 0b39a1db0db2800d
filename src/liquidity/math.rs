//! Share minting and redemption arithmetic.
//!
//! Every rounding goes against the caller: minted shares and redeemed
//! reserves round down, a derived balanced deposit rounds up. A deposit
//! followed by a full withdrawal therefore never returns more than was
//! put in.

use ethnum::U256;

use crate::domain::{Amount, BasisPoints, MAX_BPS, Rounding, Shares};
use crate::error::AmmError;
use crate::math::{mul_div, scale_u256, sqrt_product, wide_product};

/// Shares for the first deposit into an empty pool: `floor(√(a × b))`.
///
/// # Errors
///
/// - [`AmmError::ZeroAmount`] if either amount is zero.
/// - [`AmmError::InsufficientLiquidity`] if the result is below
///   `min_initial_shares`.
pub fn bootstrap_shares(
    amount_a: Amount,
    amount_b: Amount,
    min_initial_shares: u64,
) -> crate::error::Result<Shares> {
    if amount_a.is_zero() || amount_b.is_zero() {
        return Err(AmmError::ZeroAmount);
    }
    let shares = sqrt_product(amount_a.get(), amount_b.get());
    if shares < u128::from(min_initial_shares) || shares == 0 {
        return Err(AmmError::InsufficientLiquidity);
    }
    Ok(Shares::new(shares))
}

/// Rejects a deposit whose ratio deviates from the pool ratio by more
/// than `tolerance`:
/// `|a × Rb − b × Ra| ≤ tolerance × max(a × Rb, b × Ra) / 10 000`.
///
/// # Errors
///
/// Returns [`AmmError::RatioMismatch`] outside the tolerance.
pub fn check_ratio(
    amount_a: Amount,
    amount_b: Amount,
    reserve_a: Amount,
    reserve_b: Amount,
    tolerance: BasisPoints,
) -> crate::error::Result<()> {
    let lhs = wide_product(amount_a.get(), reserve_b.get());
    let rhs = wide_product(amount_b.get(), reserve_a.get());
    let (hi, lo) = if lhs >= rhs { (lhs, rhs) } else { (rhs, lhs) };
    let allowed = scale_u256(hi, U256::from(tolerance.get()), U256::from(MAX_BPS))?;
    if hi - lo > allowed {
        return Err(AmmError::RatioMismatch);
    }
    Ok(())
}

/// Shares for a deposit into a live pool:
/// `min(a × T / Ra, b × T / Rb)`, rounded down.
///
/// # Errors
///
/// - [`AmmError::InsufficientLiquidity`] if the result is zero or a
///   reserve is empty.
/// - [`AmmError::Overflow`] if the result exceeds `u128`.
pub fn proportional_shares(
    amount_a: Amount,
    amount_b: Amount,
    reserve_a: Amount,
    reserve_b: Amount,
    total: Shares,
) -> crate::error::Result<Shares> {
    if reserve_a.is_zero() || reserve_b.is_zero() {
        return Err(AmmError::InsufficientLiquidity);
    }
    let by_a = mul_div(amount_a.get(), total.get(), reserve_a.get(), Rounding::Down)?;
    let by_b = mul_div(amount_b.get(), total.get(), reserve_b.get(), Rounding::Down)?;
    let minted = by_a.min(by_b);
    if minted == 0 {
        return Err(AmmError::InsufficientLiquidity);
    }
    Ok(Shares::new(minted))
}

/// Token B needed to match `amount_a` at the pool ratio:
/// `ceil(a × Rb / Ra)`.
///
/// # Errors
///
/// - [`AmmError::InsufficientLiquidity`] if the pool is empty.
/// - [`AmmError::Overflow`] if the result exceeds `u128`.
pub fn balanced_amount_b(
    amount_a: Amount,
    reserve_a: Amount,
    reserve_b: Amount,
) -> crate::error::Result<Amount> {
    if reserve_a.is_zero() {
        return Err(AmmError::InsufficientLiquidity);
    }
    mul_div(amount_a.get(), reserve_b.get(), reserve_a.get(), Rounding::Up).map(Amount::new)
}

/// Reserves paid out for burning `shares`: `floor(shares × R / T)` each.
///
/// # Errors
///
/// - [`AmmError::ZeroAmount`] if `shares` is zero.
/// - [`AmmError::InsufficientShares`] if `shares` exceeds the supply.
pub fn redemption(
    shares: Shares,
    reserve_a: Amount,
    reserve_b: Amount,
    total: Shares,
) -> crate::error::Result<(Amount, Amount)> {
    if shares.is_zero() {
        return Err(AmmError::ZeroAmount);
    }
    if shares > total {
        return Err(AmmError::InsufficientShares {
            requested: shares.as_amount(),
            held: total.as_amount(),
        });
    }
    let a = mul_div(reserve_a.get(), shares.get(), total.get(), Rounding::Down)?;
    let b = mul_div(reserve_b.get(), shares.get(), total.get(), Rounding::Down)?;
    Ok((Amount::new(a), Amount::new(b)))
}
