//! # Generator Constants
//!
//! Fixed conventions of the MPU-based target the generator lays systems out
//! for. Everything that is a platform rule rather than a project choice lives
//! here.

/// Granularity of the occupancy bitmaps, in bytes. One bit tracks one unit.
pub const BITMAP_UNIT: u64 = 4;

/// Required alignment of fixed-address segments (start and size), in bytes.
pub const FIXED_SEGMENT_ALIGN: u64 = 32;

/// Auto-placed segments are aligned to `next_pow2(size) / AUTO_ALIGN_DIVISOR`.
///
/// Matches the eight-subregion split of an MPU region.
pub const AUTO_ALIGN_DIVISOR: u64 = 8;

/// Smallest region a node of the region tree may span (`2^8` = 256 bytes).
pub const MIN_REGION_ORDER: u8 = 8;

/// Children per region node.
pub const REGION_SLOTS: usize = 8;

/// `log2(REGION_SLOTS)`: the finest subdivision of a region node.
pub const MAX_NUM_ORDER: u8 = 3;

/// Address width of the supported MCUs, in bits.
pub const DEFAULT_ADDRESS_WIDTH: u8 = 32;

/// First byte past the addressable physical space.
pub const ADDRESS_SPACE_END: u64 = 1 << DEFAULT_ADDRESS_WIDTH;

const _: () = {
    assert!(REGION_SLOTS == 1 << MAX_NUM_ORDER);
    assert!(AUTO_ALIGN_DIVISOR == REGION_SLOTS as u64);
    assert!(FIXED_SEGMENT_ALIGN.is_multiple_of(BITMAP_UNIT));
};
