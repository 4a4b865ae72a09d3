use core::fmt;
use mcu_model::{MemoryKind, SegmentRef};

/// One of the fixed windows the kernel and its user library occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedWindow {
    KernelCode,
    KernelData,
    LibraryCode,
    LibraryData,
}

impl fmt::Display for ReservedWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::KernelCode => "kernel code",
            Self::KernelData => "kernel data",
            Self::LibraryCode => "library code",
            Self::LibraryData => "library data",
        })
    }
}

/// Why a memory layout could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("{segment}: size 0x{size:X} is too large to derive an alignment")]
    Unalignable { segment: SegmentRef, size: u64 },
    #[error("{segment}: size 0x{size:X} rounds down to nothing at alignment 0x{align:X}")]
    AlignmentCollapse {
        segment: SegmentRef,
        size: u64,
        align: u64,
    },
    #[error("{window} window [0x{start:08X}, +0x{size:X}) lies outside every {kind} trunk")]
    ReservedOutside {
        window: ReservedWindow,
        kind: MemoryKind,
        start: u64,
        size: u64,
    },
    #[error("{window} window [0x{start:08X}, +0x{size:X}) overlaps reserved memory")]
    ReservedOverlap {
        window: ReservedWindow,
        start: u64,
        size: u64,
    },
    #[error("{window} window [0x{start:X}, +0x{size:X}) runs past the end of the address range")]
    WindowOverflow {
        window: ReservedWindow,
        start: u64,
        size: u64,
    },
    #[error("{segment} at [0x{start:08X}, +0x{size:X}) lies outside every {} trunk", .segment.kind)]
    OutsideTrunks {
        segment: SegmentRef,
        start: u64,
        size: u64,
    },
    #[error("{segment} at [0x{start:08X}, +0x{size:X}) overlaps memory already in use")]
    Overlap {
        segment: SegmentRef,
        start: u64,
        size: u64,
    },
    #[error("{segment} of 0x{size:X} bytes fits into no free {} memory", .segment.kind)]
    OutOfMemory { segment: SegmentRef, size: u64 },
    #[error("{segment} cannot be auto-placed")]
    AutoDevice { segment: SegmentRef },
    #[error("{segment} reached placement without a derived alignment")]
    Unaligned { segment: SegmentRef },
    #[error("{segment} was left without an address")]
    Unplaced { segment: SegmentRef },
    #[error("primary code segments of '{first}' and '{second}' overlap")]
    CodeOverlap { first: String, second: String },
}

impl LayoutError {
    /// Whether the error stems from a bookkeeping defect rather than the
    /// project description.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Unaligned { .. } | Self::Unplaced { .. })
    }

    /// Whether the error is a structural problem of the description rather
    /// than a failure to find room.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Unalignable { .. }
                | Self::AlignmentCollapse { .. }
                | Self::ReservedOutside { .. }
                | Self::ReservedOverlap { .. }
                | Self::WindowOverflow { .. }
                | Self::AutoDevice { .. }
        )
    }
}
