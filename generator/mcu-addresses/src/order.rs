use core::fmt;

/// A power-of-two exponent: `Order(n)` describes a span of `2^n` bytes.
///
/// Region sizes, subdivision counts and segment alignments are all powers of
/// two on the MPU targets; carrying the exponent instead of the byte count
/// keeps the arithmetic exact and makes "is this a power of two" a type
/// property rather than a runtime check.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Order(u8);

impl Order {
    /// Largest representable exponent (`2^63` bytes).
    pub const MAX: Self = Self(63);

    /// Create an order, `None` if `2^n` does not fit a `u64`.
    #[inline]
    #[must_use]
    pub const fn new(n: u8) -> Option<Self> {
        if n <= Self::MAX.0 { Some(Self(n)) } else { None }
    }

    /// The smallest order whose span holds `bytes` (i.e. `log2(next_pow2(bytes))`).
    #[inline]
    #[must_use]
    pub const fn containing(bytes: u64) -> Option<Self> {
        match bytes.checked_next_power_of_two() {
            #[allow(clippy::cast_possible_truncation)]
            Some(p) => Some(Self(p.trailing_zeros() as u8)),
            None => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Span in bytes.
    #[inline]
    #[must_use]
    pub const fn size(self) -> u64 {
        1u64 << self.0
    }
}

impl fmt::Debug for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Order({})", self.0)
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "2^{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containing_rounds_up() {
        assert_eq!(Order::containing(0x3000).map(Order::get), Some(14));
        assert_eq!(Order::containing(0x4000).map(Order::get), Some(14));
        assert_eq!(Order::containing(0x4001).map(Order::get), Some(15));
        assert_eq!(Order::containing(1).map(Order::get), Some(0));
        assert_eq!(Order::containing(u64::MAX), None);
    }

    #[test]
    fn bounds() {
        assert!(Order::new(63).is_some());
        assert!(Order::new(64).is_none());
        assert_eq!(Order::new(5).map(Order::size), Some(32));
    }
}
