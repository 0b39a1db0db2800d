//! Checked arithmetic trait for domain wrapper types.
//!
//! The [`CheckedArithmetic`] trait turns the `Option`-returning checked
//! methods of [`Amount`] and [`Shares`] into `Result`s carrying a specific
//! [`AmmError`] variant, so that state transitions can use `?` throughout.
//!
//! # Examples
//!
//! ```
//! use hydra_dex::domain::Amount;
//! use hydra_dex::math::CheckedArithmetic;
//!
//! let sum = Amount::new(100).safe_add(&Amount::new(200));
//! assert_eq!(sum.ok(), Some(Amount::new(300)));
//! ```

use crate::domain::{Amount, Rounding, Shares};
use crate::error::AmmError;

/// Fallible arithmetic for domain wrapper types.
///
/// # Contract
///
/// - **No panics**: every error condition produces `Err`.
/// - **No saturation**: overflow is reported, never clamped.
pub trait CheckedArithmetic: Sized {
    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the result exceeds the
    /// representable range.
    fn safe_add(&self, other: &Self) -> Result<Self, AmmError>;

    /// Checked subtraction.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Underflow`] if the result would be negative.
    fn safe_sub(&self, other: &Self) -> Result<Self, AmmError>;

    /// Checked `self × numerator / denominator` with a wide intermediate.
    ///
    /// # Errors
    ///
    /// - [`AmmError::DivisionByZero`] if `denominator` is zero.
    /// - [`AmmError::Overflow`] if the quotient does not fit.
    fn safe_mul_div(
        &self,
        numerator: u128,
        denominator: u128,
        rounding: Rounding,
    ) -> Result<Self, AmmError>;
}

// ---------------------------------------------------------------------------
// Amount
// ---------------------------------------------------------------------------

impl CheckedArithmetic for Amount {
    #[inline]
    fn safe_add(&self, other: &Self) -> Result<Self, AmmError> {
        self.checked_add(other)
            .ok_or(AmmError::Overflow("amount addition overflow"))
    }

    #[inline]
    fn safe_sub(&self, other: &Self) -> Result<Self, AmmError> {
        self.checked_sub(other)
            .ok_or(AmmError::Underflow("amount subtraction underflow"))
    }

    #[inline]
    fn safe_mul_div(
        &self,
        numerator: u128,
        denominator: u128,
        rounding: Rounding,
    ) -> Result<Self, AmmError> {
        super::mul_div(self.get(), numerator, denominator, rounding).map(Amount::new)
    }
}

// ---------------------------------------------------------------------------
// Shares
// ---------------------------------------------------------------------------

impl CheckedArithmetic for Shares {
    #[inline]
    fn safe_add(&self, other: &Self) -> Result<Self, AmmError> {
        self.checked_add(other)
            .ok_or(AmmError::Overflow("share addition overflow"))
    }

    #[inline]
    fn safe_sub(&self, other: &Self) -> Result<Self, AmmError> {
        self.checked_sub(other)
            .ok_or(AmmError::Underflow("share subtraction underflow"))
    }

    #[inline]
    fn safe_mul_div(
        &self,
        numerator: u128,
        denominator: u128,
        rounding: Rounding,
    ) -> Result<Self, AmmError> {
        super::mul_div(self.get(), numerator, denominator, rounding).map(Shares::new)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Amount
    // -----------------------------------------------------------------------

    mod amount {
        use super::*;

        #[test]
        fn add_ok_and_overflow() {
            let Ok(r) = Amount::new(100).safe_add(&Amount::new(200)) else {
                panic!("expected Ok");
            };
            assert_eq!(r, Amount::new(300));
            let Err(AmmError::Overflow(_)) = Amount::MAX.safe_add(&Amount::new(1)) else {
                panic!("expected Overflow");
            };
        }

        #[test]
        fn sub_ok_and_underflow() {
            let Ok(r) = Amount::new(300).safe_sub(&Amount::new(100)) else {
                panic!("expected Ok");
            };
            assert_eq!(r, Amount::new(200));
            let Err(AmmError::Underflow(_)) = Amount::new(1).safe_sub(&Amount::new(2)) else {
                panic!("expected Underflow");
            };
        }

        #[test]
        fn mul_div_rounding() {
            let Ok(down) = Amount::new(10).safe_mul_div(10, 3, Rounding::Down) else {
                panic!("expected Ok");
            };
            let Ok(up) = Amount::new(10).safe_mul_div(10, 3, Rounding::Up) else {
                panic!("expected Ok");
            };
            assert_eq!(down, Amount::new(33));
            assert_eq!(up, Amount::new(34));
        }

        #[test]
        fn mul_div_by_zero() {
            let Err(AmmError::DivisionByZero) = Amount::new(1).safe_mul_div(1, 0, Rounding::Down)
            else {
                panic!("expected DivisionByZero");
            };
        }

        #[test]
        fn chaining_works() {
            let result = Amount::new(100)
                .safe_add(&Amount::new(200))
                .and_then(|v| v.safe_mul_div(3, 1, Rounding::Down))
                .and_then(|v| v.safe_sub(&Amount::new(100)));
            assert_eq!(result.ok(), Some(Amount::new(800)));
        }
    }

    // -----------------------------------------------------------------------
    // Shares
    // -----------------------------------------------------------------------

    mod shares {
        use super::*;

        #[test]
        fn add_sub() {
            let Ok(r) = Shares::new(100).safe_add(&Shares::new(50)) else {
                panic!("expected Ok");
            };
            assert_eq!(r, Shares::new(150));
            assert!(Shares::new(1).safe_sub(&Shares::new(2)).is_err());
        }

        #[test]
        fn proportional_scaling() {
            // 1/3 of 1_000 shares, floored.
            let Ok(r) = Shares::new(1_000).safe_mul_div(1, 3, Rounding::Down) else {
                panic!("expected Ok");
            };
            assert_eq!(r, Shares::new(333));
        }
    }
}
