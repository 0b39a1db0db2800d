//! Arithmetic utilities for AMM calculations.
//!
//! This module provides [`CheckedArithmetic`] for overflow-safe
//! operations on domain amounts, [`div_round`] for explicit division
//! rounding, and 256-bit helpers ([`mul_div`], [`sqrt_product`]) for
//! reserve products that do not fit in `u128`.

mod checked;
mod rounding;
mod wide;

pub use checked::CheckedArithmetic;
pub use rounding::div_round;
pub use wide::{
    div_u256, isqrt_u256, mul_div, narrow, scale_u256, sqrt_product, wide_product,
};
