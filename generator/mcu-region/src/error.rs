use mcu_model::SegmentRef;

/// Why a process' region tree could not be built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegionError {
    #[error("process '{process}' has no memory to protect")]
    Empty { process: String },
    #[error("{segment} has no address")]
    Unplaced { segment: SegmentRef },
    #[error(
        "process '{process}': memory [0x{start:08X}, 0x{end:08X}) needs a region of 2^{required} bytes, above the limit of 2^{bound}"
    )]
    TooLarge {
        process: String,
        start: u64,
        end: u64,
        required: u8,
        bound: u8,
    },
}

impl RegionError {
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Unplaced { .. })
    }
}
