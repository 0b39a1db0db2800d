//! 256-bit intermediates for reserve products and scaled ratios.
//!
//! Reserves are `u128`, so `reserve_a × reserve_b` and `amount × shares`
//! routinely exceed 128 bits. These helpers widen to
//! [`U256`](ethnum::U256), divide, and narrow back with an explicit
//! overflow error instead of wrapping.

use ethnum::U256;

use crate::domain::Rounding;
use crate::error::AmmError;

/// Computes `a × b / d` with a 256-bit intermediate.
///
/// # Errors
///
/// - [`AmmError::DivisionByZero`] if `d` is zero.
/// - [`AmmError::Overflow`] if the quotient does not fit in `u128`.
///
/// # Examples
///
/// ```
/// use hydra_dex::domain::Rounding;
/// use hydra_dex::math::mul_div;
///
/// // u128::MAX × 2 / 4 would overflow a plain u128 product.
/// let r = mul_div(u128::MAX, 2, 4, Rounding::Down).ok();
/// assert_eq!(r, Some(u128::MAX / 2));
/// ```
pub fn mul_div(a: u128, b: u128, d: u128, rounding: Rounding) -> crate::error::Result<u128> {
    if d == 0 {
        return Err(AmmError::DivisionByZero);
    }
    let product = U256::from(a) * U256::from(b);
    narrow(div_u256(product, U256::from(d), rounding)?, "mul_div result overflow")
}

/// Returns `a × b` as a 256-bit value. Never overflows.
#[must_use]
pub fn wide_product(a: u128, b: u128) -> U256 {
    U256::from(a) * U256::from(b)
}

/// Divides two 256-bit values with explicit rounding.
///
/// # Errors
///
/// Returns [`AmmError::DivisionByZero`] if `d` is zero.
pub fn div_u256(n: U256, d: U256, rounding: Rounding) -> crate::error::Result<U256> {
    if d == U256::ZERO {
        return Err(AmmError::DivisionByZero);
    }
    let q = n / d;
    match rounding {
        Rounding::Down => Ok(q),
        Rounding::Up => {
            if n % d == U256::ZERO {
                Ok(q)
            } else {
                // q < U256::MAX whenever a remainder exists.
                Ok(q + U256::ONE)
            }
        }
    }
}

/// Computes `value × numerator / denominator` in 256 bits, rounding down.
///
/// When the exact product does not fit, the division is applied first;
/// the lost precision is below one part in `2^128` of the result.
///
/// # Errors
///
/// - [`AmmError::DivisionByZero`] if `denominator` is zero.
/// - [`AmmError::Overflow`] if the result does not fit in 256 bits.
pub fn scale_u256(value: U256, numerator: U256, denominator: U256) -> crate::error::Result<U256> {
    if denominator == U256::ZERO {
        return Err(AmmError::DivisionByZero);
    }
    match value.checked_mul(numerator) {
        Some(product) => Ok(product / denominator),
        None => (value / denominator)
            .checked_mul(numerator)
            .ok_or(AmmError::Overflow("scaled product overflow")),
    }
}

/// Narrows a 256-bit value to `u128`.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] with `context` if the value exceeds `u128::MAX`.
pub fn narrow(value: U256, context: &'static str) -> crate::error::Result<u128> {
    if value > U256::from(u128::MAX) {
        return Err(AmmError::Overflow(context));
    }
    Ok(value.as_u128())
}

/// Integer square root, floor, via Newton's method.
#[must_use]
pub fn isqrt_u256(n: U256) -> U256 {
    if n == U256::ZERO {
        return U256::ZERO;
    }
    let mut x = n;
    let mut y = (x >> 1u32) + (x & U256::ONE);
    while y < x {
        x = y;
        y = (x + n / x) >> 1u32;
    }
    x
}

/// `floor(sqrt(a × b))`, the geometric mean used for bootstrap share minting.
///
/// The result always fits in `u128` because `a × b < 2^256`.
#[must_use]
pub fn sqrt_product(a: u128, b: u128) -> u128 {
    isqrt_u256(wide_product(a, b)).as_u128()
}
