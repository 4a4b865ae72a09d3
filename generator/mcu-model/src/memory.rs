use crate::Permissions;
use core::fmt;
use mcu_addresses::{PhysicalAddress, Placement};

/// What a segment or trunk holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MemoryKind {
    /// Executable image (flash).
    Code,
    /// Read/write data (SRAM).
    Data,
    /// Memory-mapped peripherals.
    Device,
}

impl fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Code => "Code",
            Self::Data => "Data",
            Self::Device => "Device",
        })
    }
}

/// A contiguous memory range requested by a process.
///
/// `start` is [`Placement::Auto`] until the layout allocator has chosen an
/// address, after which it is always [`Placement::Fixed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySegment {
    pub start: Placement,
    /// Size in bytes.
    pub size: u64,
    pub kind: MemoryKind,
    pub perm: Permissions,
    /// Alignment derived for auto-placed segments. `None` for segments the
    /// user placed at a fixed address.
    pub align: Option<u64>,
}

impl MemorySegment {
    #[must_use]
    pub const fn new(start: Placement, size: u64, kind: MemoryKind, perm: Permissions) -> Self {
        Self {
            start,
            size,
            kind,
            perm,
            align: None,
        }
    }

    /// An auto-placed segment.
    #[must_use]
    pub const fn auto(size: u64, kind: MemoryKind, perm: Permissions) -> Self {
        Self::new(Placement::Auto, size, kind, perm)
    }

    /// A segment at a fixed address.
    #[must_use]
    pub const fn fixed(start: u64, size: u64, kind: MemoryKind, perm: Permissions) -> Self {
        Self::new(
            Placement::Fixed(PhysicalAddress::new(start)),
            size,
            kind,
            perm,
        )
    }

    /// Start address, if already known.
    #[must_use]
    pub const fn base(&self) -> Option<PhysicalAddress> {
        self.start.address()
    }

    /// One past the last byte, if the start is known and the end representable.
    #[must_use]
    pub const fn end(&self) -> Option<u64> {
        match self.start.address() {
            Some(base) => base.as_u64().checked_add(self.size),
            None => None,
        }
    }
}

impl fmt::Display for MemorySegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<6} {} +0x{:X} {}",
            self.kind, self.start, self.size, self.perm
        )
    }
}

/// Names one segment of one process in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SegmentRef {
    pub process: String,
    /// Position in the process' segment list.
    pub index: usize,
    pub kind: MemoryKind,
}

impl SegmentRef {
    #[must_use]
    pub fn new(process: impl Into<String>, index: usize, kind: MemoryKind) -> Self {
        Self {
            process: process.into(),
            index,
            kind,
        }
    }
}

impl fmt::Display for SegmentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} segment #{} of process '{}'",
            self.kind, self.index, self.process
        )
    }
}

/// A contiguous physical range provided by the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryTrunk {
    pub start: PhysicalAddress,
    pub size: u64,
    pub kind: MemoryKind,
}

impl MemoryTrunk {
    #[must_use]
    pub const fn new(start: u64, size: u64, kind: MemoryKind) -> Self {
        Self {
            start: PhysicalAddress::new(start),
            size,
            kind,
        }
    }

    /// One past the last byte.
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.start.as_u64().saturating_add(self.size)
    }

    /// Whether `[start, start + size)` lies completely inside the trunk.
    #[must_use]
    pub const fn contains_range(&self, start: u64, size: u64) -> bool {
        match start.checked_add(size) {
            Some(end) => start >= self.start.as_u64() && end <= self.end(),
            None => false,
        }
    }
}
