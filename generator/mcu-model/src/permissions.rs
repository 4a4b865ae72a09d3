use bitfield_struct::bitfield;
use core::fmt;
use core::str::FromStr;

/// Access attributes of a memory segment or region.
///
/// Layout (LSB→MSB):
/// - bit 0: read
/// - bit 1: write
/// - bit 2: execute
/// - bit 3: bufferable
/// - bit 4: cacheable
/// - bit 5: static (mapping fixed at boot, never changed at runtime)
/// - bits 6..7: reserved (zero)
///
/// A segment must allow at least one of read, write or execute; see
/// [`Permissions::allows_access`].
#[bitfield(u8)]
#[derive(PartialEq, Eq, Hash)]
pub struct Permissions {
    /// Bit 0 — readable (`R`).
    pub read: bool,

    /// Bit 1 — writable (`W`).
    pub write: bool,

    /// Bit 2 — executable (`X`).
    pub execute: bool,

    /// Bit 3 — bufferable (`B`).
    pub bufferable: bool,

    /// Bit 4 — cacheable (`C`).
    pub cacheable: bool,

    /// Bit 5 — static mapping (`S`).
    pub static_region: bool,

    /// Bits 6–7 — reserved.
    #[bits(2, default = 0)]
    __: u8,
}

impl Permissions {
    /// Read + execute, cacheable and static: the usual code segment.
    #[must_use]
    pub const fn code() -> Self {
        Self::new()
            .with_read(true)
            .with_execute(true)
            .with_cacheable(true)
            .with_static_region(true)
    }

    /// Read + write, bufferable, cacheable and static: the usual data segment.
    #[must_use]
    pub const fn data() -> Self {
        Self::new()
            .with_read(true)
            .with_write(true)
            .with_bufferable(true)
            .with_cacheable(true)
            .with_static_region(true)
    }

    /// Read + write, uncached and static: the usual peripheral window.
    #[must_use]
    pub const fn device() -> Self {
        Self::new()
            .with_read(true)
            .with_write(true)
            .with_static_region(true)
    }

    /// Whether at least one of read, write or execute is granted.
    #[must_use]
    pub const fn allows_access(self) -> bool {
        self.read() || self.write() || self.execute()
    }

    /// Bitwise union of two attribute sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self::from_bits(self.into_bits() | other.into_bits())
    }
}

/// The attribute letters, in bit order.
const LETTERS: [(char, u8); 6] = [
    ('R', 1 << 0),
    ('W', 1 << 1),
    ('X', 1 << 2),
    ('B', 1 << 3),
    ('C', 1 << 4),
    ('S', 1 << 5),
];

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;
        let bits = self.into_bits();
        for (c, mask) in LETTERS {
            f.write_char(if bits & mask == 0 { '-' } else { c })?;
        }
        Ok(())
    }
}

/// Failure to read an attribute string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PermissionsError {
    #[error("unknown attribute letter '{0}'")]
    UnknownLetter(char),
    #[error("attribute '{0}' grants none of read, write or execute")]
    NoAccess(String),
}

impl FromStr for Permissions {
    type Err = PermissionsError;

    /// Parse attribute letters such as `"RWBCS"`. Order does not matter,
    /// `-` placeholders and whitespace are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bits = 0u8;
        for c in s.chars().filter(|c| !c.is_whitespace() && *c != '-') {
            let (_, mask) = LETTERS
                .iter()
                .find(|(l, _)| *l == c.to_ascii_uppercase())
                .ok_or(PermissionsError::UnknownLetter(c))?;
            bits |= mask;
        }

        let perm = Self::from_bits(bits);
        if !perm.allows_access() {
            return Err(PermissionsError::NoAccess(s.to_owned()));
        }
        Ok(perm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_round_trip_through_display() {
        let p: Permissions = "RXCS".parse().unwrap();
        assert!(p.read() && p.execute() && p.cacheable() && p.static_region());
        assert!(!p.write() && !p.bufferable());
        assert_eq!(p.to_string(), "R-X-CS");
        assert_eq!(p, Permissions::code());
    }

    #[test]
    fn rejects_no_access() {
        assert_eq!(
            "BCS".parse::<Permissions>(),
            Err(PermissionsError::NoAccess("BCS".into()))
        );
        assert_eq!(
            "RQ".parse::<Permissions>(),
            Err(PermissionsError::UnknownLetter('Q'))
        );
    }

    #[test]
    fn union_merges_bits() {
        let p = Permissions::code().union(Permissions::data());
        assert_eq!(p.to_string(), "RWXBCS");
    }
}
