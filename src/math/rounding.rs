//! Rounding helper for `u128` division.
//!
//! [`div_round`] is the primitive underneath
//! [`Amount::checked_div`](crate::domain::Amount::checked_div). The engine
//! always rounds against the user:
//!
//! | Quantity | Direction |
//! |----------|-----------|
//! | Swap output | [`Rounding::Down`] |
//! | Minted shares | [`Rounding::Down`] |
//! | Redeemed reserves | [`Rounding::Down`] |
//! | Fee | [`Rounding::Up`] |
//! | Derived deposit (balanced add) | [`Rounding::Up`] |

use crate::domain::Rounding;

/// Integer division of `u128` values with explicit rounding direction.
///
/// Returns [`None`] if `denominator` is zero.
///
/// # Examples
///
/// ```
/// use hydra_dex::domain::Rounding;
/// use hydra_dex::math::div_round;
///
/// assert_eq!(div_round(7, 2, Rounding::Down), Some(3));
/// assert_eq!(div_round(7, 2, Rounding::Up), Some(4));
/// assert_eq!(div_round(7, 0, Rounding::Up), None);
/// ```
#[must_use]
pub const fn div_round(numerator: u128, denominator: u128, rounding: Rounding) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    let q = numerator / denominator;
    match rounding {
        Rounding::Down => Some(q),
        Rounding::Up => {
            // q + 1 cannot overflow: a remainder implies q < u128::MAX.
            if numerator % denominator != 0 {
                Some(q + 1)
            } else {
                Some(q)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn div_by_zero_returns_none() {
        assert_eq!(div_round(100, 0, Rounding::Down), None);
        assert_eq!(div_round(0, 0, Rounding::Up), None);
    }

    #[test]
    fn exact_division_agrees() {
        assert_eq!(div_round(100, 10, Rounding::Down), Some(10));
        assert_eq!(div_round(100, 10, Rounding::Up), Some(10));
    }

    #[test]
    fn remainder_rounds() {
        assert_eq!(div_round(9, 10, Rounding::Down), Some(0));
        assert_eq!(div_round(9, 10, Rounding::Up), Some(1));
    }

    #[test]
    fn max_values() {
        assert_eq!(div_round(u128::MAX, 1, Rounding::Up), Some(u128::MAX));
        assert_eq!(div_round(u128::MAX, 2, Rounding::Up), Some(u128::MAX / 2 + 1));
        assert_eq!(div_round(u128::MAX, u128::MAX - 1, Rounding::Up), Some(2));
    }

    #[test]
    fn zero_numerator() {
        assert_eq!(div_round(0, 5, Rounding::Up), Some(0));
    }
}
