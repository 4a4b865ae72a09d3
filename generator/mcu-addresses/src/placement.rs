use crate::PhysicalAddress;
use core::fmt;
use core::str::FromStr;

/// Where a memory segment starts.
///
/// Replaces magic "unset" integers: an auto-placed segment is a distinct
/// variant and can never collide with a legitimate address.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Placement {
    /// The allocator chooses the start address.
    Auto,
    /// The project pins the segment at this address.
    Fixed(PhysicalAddress),
}

impl Placement {
    #[inline]
    #[must_use]
    pub const fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }

    /// The concrete address, if one is known.
    #[inline]
    #[must_use]
    pub const fn address(self) -> Option<PhysicalAddress> {
        match self {
            Self::Auto => None,
            Self::Fixed(pa) => Some(pa),
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("Auto"),
            Self::Fixed(pa) => fmt::Display::fmt(pa, f),
        }
    }
}

/// Failure to read a textual address or size.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty value")]
    Empty,
    #[error("'{0}' is not a valid hex number")]
    NotHex(String),
    #[error("'{0}' does not fit in 64 bits")]
    Overflow(String),
}

/// Parse a hex number with optional `0x`/`0X` prefix and `_` separators.
///
/// # Errors
/// Returns a [`ParseError`] for empty input, non-hex digits, or overflow.
pub fn parse_hex(text: &str) -> Result<u64, ParseError> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut value: u64 = 0;
    for c in digits.chars().filter(|&c| c != '_') {
        let d = c
            .to_digit(16)
            .ok_or_else(|| ParseError::NotHex(trimmed.to_owned()))?;
        value = value
            .checked_mul(16)
            .and_then(|v| v.checked_add(u64::from(d)))
            .ok_or_else(|| ParseError::Overflow(trimmed.to_owned()))?;
    }
    Ok(value)
}

impl FromStr for Placement {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == "Auto" {
            return Ok(Self::Auto);
        }
        parse_hex(s).map(|v| Self::Fixed(PhysicalAddress::new(v)))
    }
}
