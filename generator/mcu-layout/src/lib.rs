//! # Memory Layout
//!
//! Places the memory segments of a project into the chip's memory trunks.
//!
//! 1. [`align_segments`] derives the alignment of every auto-placed segment.
//! 2. [`allocate`] runs once per [`MemoryKind`](mcu_model::MemoryKind): it
//!    reserves the kernel and library windows, marks fixed segments, and
//!    places auto segments first-fit, largest first.
//! 3. [`check_memory`] verifies the result.
//!
//! Occupancy is tracked per trunk by an [`OccupancyBitmap`] with one bit per
//! 4-byte unit. The bitmaps are owned by the [`MemoryMap`] of one allocation
//! pass; nothing is global.

mod align;
mod allocator;
mod bitmap;
mod check;
mod error;

pub use align::{AutoAlignment, align_segments, auto_alignment};
pub use allocator::{MemoryMap, TrunkOccupancy, allocate};
pub use bitmap::{BitmapError, OccupancyBitmap};
pub use check::check_memory;
pub use error::{LayoutError, ReservedWindow};
