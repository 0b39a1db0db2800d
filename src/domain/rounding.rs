//! Explicit rounding direction for integer division.

/// Rounding direction for every division performed by the engine.
///
/// Division never happens implicitly: swap outputs, share mints and
/// redemptions round [`Down`](Self::Down) (against the user) while fees
/// and required deposits round [`Up`](Self::Up) (in favour of the pool).
///
/// # Examples
///
/// ```
/// use hydra_dex::domain::Rounding;
///
/// assert!(Rounding::Up.is_up());
/// assert_eq!(Rounding::Up.flip(), Rounding::Down);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Round towards positive infinity (ceiling).
    Up,
    /// Round towards zero (floor).
    Down,
}

impl Rounding {
    /// Returns `true` if this is [`Rounding::Up`].
    #[must_use]
    pub const fn is_up(&self) -> bool {
        matches!(self, Self::Up)
    }

    /// Returns the opposite direction.
    ///
    /// Used when a quantity sits in a denominator: rounding the
    /// denominator up rounds the quotient down.
    #[must_use]
    pub const fn flip(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn up_is_up() {
        assert!(Rounding::Up.is_up());
        assert!(!Rounding::Down.is_up());
    }

    #[test]
    fn flip_is_involutive() {
        assert_eq!(Rounding::Up.flip().flip(), Rounding::Up);
        assert_eq!(Rounding::Down.flip(), Rounding::Up);
    }
}
