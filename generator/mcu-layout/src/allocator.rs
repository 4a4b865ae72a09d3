//! First-fit placement of process segments into chip memory trunks.

use crate::error::ReservedWindow;
use crate::{LayoutError, OccupancyBitmap};
use core::cmp::Reverse;
use log::{debug, info, trace};
use mcu_addresses::{PhysicalAddress, Placement};
use mcu_model::consts::BITMAP_UNIT;
use mcu_model::{Chip, KernelImage, LibraryImage, MemoryKind, MemoryTrunk, Project, SegmentRef};

/// A chip trunk together with its occupancy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrunkOccupancy {
    pub trunk: MemoryTrunk,
    pub bitmap: OccupancyBitmap,
}

impl TrunkOccupancy {
    fn new(trunk: MemoryTrunk) -> Self {
        let units = usize::try_from(trunk.size / BITMAP_UNIT).unwrap_or(usize::MAX);
        Self {
            trunk,
            bitmap: OccupancyBitmap::new(units),
        }
    }

    /// Bytes in use.
    #[must_use]
    pub fn used_bytes(&self) -> u64 {
        self.bitmap.occupied() as u64 * BITMAP_UNIT
    }

    /// Bitmap range `(first, count)` covering `[start, start + size)`,
    /// including partially touched units at either end.
    fn units(&self, start: u64, size: u64) -> Option<(usize, usize)> {
        let offset = start.checked_sub(self.trunk.start.as_u64())?;
        let first = offset / BITMAP_UNIT;
        let last = offset.checked_add(size)?.div_ceil(BITMAP_UNIT);
        Some((
            usize::try_from(first).ok()?,
            usize::try_from(last - first).ok()?,
        ))
    }
}

/// Why a fixed range could not be reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReserveError {
    Outside,
    Occupied,
}

/// Occupancy of all chip trunks of one memory kind.
///
/// Trunks are kept in ascending start order; trunks declared with the same
/// start keep their declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryMap {
    kind: MemoryKind,
    trunks: Vec<TrunkOccupancy>,
}

impl MemoryMap {
    /// Fresh, empty bitmaps for every `kind` trunk of `chip`.
    #[must_use]
    pub fn new(chip: &Chip, kind: MemoryKind) -> Self {
        let mut trunks: Vec<_> = chip.trunks_of(kind).copied().collect();
        trunks.sort_by_key(|t| t.start);
        Self {
            kind,
            trunks: trunks.into_iter().map(TrunkOccupancy::new).collect(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> MemoryKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn trunks(&self) -> &[TrunkOccupancy] {
        &self.trunks
    }

    /// Mark a fixed range. The first trunk containing the range takes it.
    fn reserve(&mut self, start: u64, size: u64) -> Result<(), ReserveError> {
        let occ = self
            .trunks
            .iter_mut()
            .find(|o| o.trunk.contains_range(start, size))
            .ok_or(ReserveError::Outside)?;
        let (first, count) = occ.units(start, size).ok_or(ReserveError::Outside)?;
        occ.bitmap.mark(first, count).map_err(|e| match e {
            crate::BitmapError::OutOfRange { .. } => ReserveError::Outside,
            crate::BitmapError::Occupied(_) => ReserveError::Occupied,
        })
    }

    /// Find and mark the first free `align`-aligned range of `size` bytes.
    ///
    /// Trunks are scanned in ascending address order. Candidates run from
    /// the aligned trunk start and stop short of `aligned_end - size`, so a
    /// block ending exactly at the aligned trunk end is never probed.
    pub fn fit(&mut self, size: u64, align: u64) -> Option<PhysicalAddress> {
        for occ in &mut self.trunks {
            let trunk = occ.trunk;
            if size > trunk.size {
                continue;
            }

            let Some(start) = trunk.start.align_up(align) else {
                continue;
            };
            let end = PhysicalAddress::new(trunk.end()).align_down(align);
            let Some(room) = end.offset_from(start) else {
                continue;
            };
            if size > room {
                continue;
            }

            let last = end.as_u64() - size;
            let mut candidate = start.as_u64();
            while candidate < last {
                let (first, count) = occ.units(candidate, size)?;
                if occ.bitmap.try_mark(first, count) {
                    return Some(PhysicalAddress::new(candidate));
                }
                trace!("0x{candidate:08X} is taken in trunk at {}", trunk.start);
                candidate += align;
            }
        }
        None
    }
}

/// The kernel and library windows reserved in memory of `kind`.
fn reserved_windows(
    kernel: &KernelImage,
    library: &LibraryImage,
    kind: MemoryKind,
) -> Result<Vec<(ReservedWindow, PhysicalAddress, u64)>, LayoutError> {
    let (kernel_window, start, size, library_window, library_start, library_size) = match kind {
        MemoryKind::Code => (
            ReservedWindow::KernelCode,
            kernel.code_start,
            kernel.code_size,
            ReservedWindow::LibraryCode,
            kernel.code_end(),
            library.code_size,
        ),
        MemoryKind::Data => (
            ReservedWindow::KernelData,
            kernel.data_start,
            kernel.data_size,
            ReservedWindow::LibraryData,
            kernel.data_end(),
            library.data_size,
        ),
        MemoryKind::Device => return Ok(Vec::new()),
    };
    let library_start = library_start.ok_or(LayoutError::WindowOverflow {
        window: kernel_window,
        start: start.as_u64(),
        size,
    })?;
    Ok(vec![
        (kernel_window, start, size),
        (library_window, library_start, library_size),
    ])
}

/// Place every segment of `kind`.
///
/// Reserves the kernel and library windows, then marks every fixed segment,
/// then places the auto segments largest first (first-fit). Device memory is
/// never allocated; its segments are only checked against the device trunks.
///
/// Auto segments must have been through [`align_segments`](crate::align_segments).
///
/// # Errors
/// The first [`LayoutError`] encountered; the project may then be partially
/// placed and must be discarded.
pub fn allocate(
    project: &mut Project,
    chip: &Chip,
    kind: MemoryKind,
) -> Result<MemoryMap, LayoutError> {
    let mut map = MemoryMap::new(chip, kind);
    if kind == MemoryKind::Device {
        check_device(project, chip)?;
        return Ok(map);
    }

    for (window, start, size) in reserved_windows(&project.kernel, &project.library, kind)? {
        if size == 0 {
            continue;
        }
        map.reserve(start.as_u64(), size).map_err(|e| match e {
            ReserveError::Outside => LayoutError::ReservedOutside {
                window,
                kind,
                start: start.as_u64(),
                size,
            },
            ReserveError::Occupied => LayoutError::ReservedOverlap {
                window,
                start: start.as_u64(),
                size,
            },
        })?;
        debug!("reserved {window} window at {start} (+0x{size:X})");
    }

    let mut pending = Vec::new();
    for (p, process) in project.processes.iter().enumerate() {
        for (s, segment) in process.segments.iter().enumerate() {
            if segment.kind != kind {
                continue;
            }
            let Placement::Fixed(start) = segment.start else {
                pending.push((p, s));
                continue;
            };

            map.reserve(start.as_u64(), segment.size).map_err(|e| {
                let reference = SegmentRef::new(&process.name, s, kind);
                match e {
                    ReserveError::Outside => LayoutError::OutsideTrunks {
                        segment: reference,
                        start: start.as_u64(),
                        size: segment.size,
                    },
                    ReserveError::Occupied => LayoutError::Overlap {
                        segment: reference,
                        start: start.as_u64(),
                        size: segment.size,
                    },
                }
            })?;
            debug!("'{}': fixed {kind} segment #{s} at {start}", process.name);
        }
    }

    // Largest first; the stable sort keeps declaration order among equals.
    pending.sort_by_key(|&(p, s)| Reverse(project.processes[p].segments[s].size));

    for (p, s) in pending {
        let process = &mut project.processes[p];
        let reference = SegmentRef::new(&process.name, s, kind);
        let segment = &mut process.segments[s];
        let align = segment
            .align
            .ok_or_else(|| LayoutError::Unaligned {
                segment: reference.clone(),
            })?;
        let start = map.fit(segment.size, align).ok_or_else(|| LayoutError::OutOfMemory {
            segment: reference.clone(),
            size: segment.size,
        })?;
        segment.start = Placement::Fixed(start);
        debug!("{reference} placed at {start} (+0x{:X})", segment.size);
    }

    for occ in map.trunks() {
        info!(
            "{kind} trunk at {}: 0x{:X} of 0x{:X} bytes in use",
            occ.trunk.start,
            occ.used_bytes(),
            occ.trunk.size
        );
    }
    Ok(map)
}

/// Every device segment must be fixed and lie inside one device trunk.
fn check_device(project: &Project, chip: &Chip) -> Result<(), LayoutError> {
    for process in &project.processes {
        for (s, segment) in process.segments.iter().enumerate() {
            if segment.kind != MemoryKind::Device {
                continue;
            }
            let reference = || SegmentRef::new(&process.name, s, MemoryKind::Device);
            let Placement::Fixed(start) = segment.start else {
                return Err(LayoutError::AutoDevice {
                    segment: reference(),
                });
            };
            if !chip
                .trunks_of(MemoryKind::Device)
                .any(|t| t.contains_range(start.as_u64(), segment.size))
            {
                return Err(LayoutError::OutsideTrunks {
                    segment: reference(),
                    start: start.as_u64(),
                    size: segment.size,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align_segments;
    use mcu_model::{MemorySegment, Permissions, Process};

    fn chip() -> Chip {
        Chip {
            platform: "A7M".into(),
            trunks: vec![
                MemoryTrunk::new(0x0800_0000, 0x2_0000, MemoryKind::Code),
                MemoryTrunk::new(0x2000_0000, 0x1_0000, MemoryKind::Data),
                MemoryTrunk::new(0x4000_0000, 0x1000_0000, MemoryKind::Device),
            ],
            ..Chip::default()
        }
    }

    fn kernel() -> KernelImage {
        KernelImage {
            code_start: PhysicalAddress::new(0x0800_0000),
            code_size: 0x1000,
            data_start: PhysicalAddress::new(0x2000_0000),
            data_size: 0x800,
            ..KernelImage::default()
        }
    }

    fn project(processes: Vec<Process>) -> Project {
        Project {
            kernel: kernel(),
            library: LibraryImage {
                code_size: 0x1000,
                data_size: 0x800,
                ..LibraryImage::default()
            },
            processes,
            ..Project::default()
        }
    }

    #[test]
    fn trunks_sorted_by_start_keeping_ties() {
        let chip = Chip {
            trunks: vec![
                MemoryTrunk::new(0x2000, 0x100, MemoryKind::Data),
                MemoryTrunk::new(0x1000, 0x100, MemoryKind::Data),
                MemoryTrunk::new(0x1000, 0x200, MemoryKind::Data),
                MemoryTrunk::new(0x0, 0x100, MemoryKind::Code),
            ],
            ..Chip::default()
        };
        let map = MemoryMap::new(&chip, MemoryKind::Data);
        let order: Vec<_> = map
            .trunks()
            .iter()
            .map(|o| (o.trunk.start.as_u64(), o.trunk.size))
            .collect();
        assert_eq!(order, [(0x1000, 0x100), (0x1000, 0x200), (0x2000, 0x100)]);
    }

    #[test]
    fn fit_never_probes_the_exact_tail() {
        let chip = Chip {
            trunks: vec![MemoryTrunk::new(0x1000, 0x400, MemoryKind::Data)],
            ..Chip::default()
        };
        let mut map = MemoryMap::new(&chip, MemoryKind::Data);
        assert_eq!(map.fit(0x200, 0x200), Some(PhysicalAddress::new(0x1000)));
        // 0x1200..0x1400 is free but ends exactly at the trunk end.
        assert_eq!(map.fit(0x200, 0x200), None);
        assert_eq!(map.trunks()[0].used_bytes(), 0x200);

        // A block as large as the whole trunk has no candidate at all.
        let mut map = MemoryMap::new(&chip, MemoryKind::Data);
        assert_eq!(map.fit(0x400, 0x400), None);
        assert_eq!(map.fit(0x100, 0x100), Some(PhysicalAddress::new(0x1000)));
    }

    #[test]
    fn fit_skips_misaligned_trunk_heads() {
        let chip = Chip {
            trunks: vec![
                MemoryTrunk::new(0x1010, 0x200, MemoryKind::Data),
                MemoryTrunk::new(0x4000, 0x1000, MemoryKind::Data),
            ],
            ..Chip::default()
        };
        let mut map = MemoryMap::new(&chip, MemoryKind::Data);
        // 0x1010..0x1210 holds no 0x200-aligned 0x200 block.
        assert_eq!(map.fit(0x200, 0x200), Some(PhysicalAddress::new(0x4000)));
    }

    #[test]
    fn places_around_reserved_and_fixed_memory() {
        let mut project = project(vec![
            Process::new("P1")
                .with_segment(MemorySegment::auto(0x3000, MemoryKind::Code, Permissions::code())),
            Process::new("P2").with_segment(MemorySegment::fixed(
                0x0801_0000,
                0x1000,
                MemoryKind::Code,
                Permissions::code(),
            )),
        ]);

        align_segments(&mut project).unwrap();
        let map = allocate(&mut project, &chip(), MemoryKind::Code).unwrap();

        let p1 = &project.processes[0].segments[0];
        assert_eq!(p1.base(), Some(PhysicalAddress::new(0x0800_2000)));
        assert_eq!(p1.size, 0x2800);
        assert_eq!(map.trunks()[0].used_bytes(), 0x2000 + 0x1000 + 0x2800);
    }

    #[test]
    fn larger_segments_are_placed_first() {
        let mut project = project(vec![Process::new("P")
            .with_segment(MemorySegment::auto(0x400, MemoryKind::Data, Permissions::data()))
            .with_segment(MemorySegment::auto(0x2000, MemoryKind::Data, Permissions::data()))]);

        align_segments(&mut project).unwrap();
        allocate(&mut project, &chip(), MemoryKind::Data).unwrap();

        let segs = &project.processes[0].segments;
        // Reserved data ends at 0x2000_1000; the big one (align 0x400) comes first.
        assert_eq!(segs[1].base(), Some(PhysicalAddress::new(0x2000_1000)));
        assert_eq!(segs[1].size, 0x1C00);
        assert_eq!(segs[0].base(), Some(PhysicalAddress::new(0x2000_2C00)));
    }

    #[test]
    fn equal_sizes_keep_declaration_order() {
        let data = |size| MemorySegment::auto(size, MemoryKind::Data, Permissions::data());
        let mut project = project(vec![
            Process::new("A").with_segment(data(0x800)),
            Process::new("B")
                .with_segment(data(0x800))
                .with_segment(data(0x2000)),
        ]);

        align_segments(&mut project).unwrap();
        allocate(&mut project, &chip(), MemoryKind::Data).unwrap();

        let [a, b] = &project.processes[..] else {
            panic!("two processes")
        };
        // The 0x1C00 block takes 0x2000_1000, then the two 0x700 blocks
        // (align 0x100) follow in declaration order.
        assert_eq!(b.segments[1].base(), Some(PhysicalAddress::new(0x2000_1000)));
        assert_eq!(a.segments[0].base(), Some(PhysicalAddress::new(0x2000_2C00)));
        assert_eq!(b.segments[0].base(), Some(PhysicalAddress::new(0x2000_3300)));
    }

    #[test]
    fn fixed_overlap_is_fatal() {
        let mut project = project(vec![Process::new("Clash").with_segment(MemorySegment::fixed(
            0x0800_1800,
            0x100,
            MemoryKind::Code,
            Permissions::code(),
        ))]);

        assert_eq!(
            allocate(&mut project, &chip(), MemoryKind::Code),
            Err(LayoutError::Overlap {
                segment: SegmentRef::new("Clash", 0, MemoryKind::Code),
                start: 0x0800_1800,
                size: 0x100,
            })
        );
    }

    #[test]
    fn reserved_window_outside_trunk_is_fatal() {
        let mut project = project(Vec::new());
        project.kernel.code_start = PhysicalAddress::new(0x0010_0000);
        assert!(matches!(
            allocate(&mut project, &chip(), MemoryKind::Code),
            Err(LayoutError::ReservedOutside {
                window: ReservedWindow::KernelCode,
                ..
            })
        ));
    }

    #[test]
    fn kernel_window_past_the_address_range_is_fatal() {
        let mut project = project(Vec::new());
        project.kernel.code_start = PhysicalAddress::new(u64::MAX - 0xFFF);
        project.kernel.code_size = 0x2000;
        assert_eq!(
            allocate(&mut project, &chip(), MemoryKind::Code),
            Err(LayoutError::WindowOverflow {
                window: ReservedWindow::KernelCode,
                start: u64::MAX - 0xFFF,
                size: 0x2000,
            })
        );
    }

    #[test]
    fn exhausted_memory_names_the_segment() {
        let mut project = project(vec![Process::new("Hog")
            .with_segment(MemorySegment::auto(0x2_0000, MemoryKind::Data, Permissions::data()))]);

        align_segments(&mut project).unwrap();
        assert_eq!(
            allocate(&mut project, &chip(), MemoryKind::Data),
            Err(LayoutError::OutOfMemory {
                segment: SegmentRef::new("Hog", 0, MemoryKind::Data),
                size: 0x1_C000,
            })
        );
    }

    #[test]
    fn device_segments_are_only_checked() {
        let device =
            |start| MemorySegment::fixed(start, 0x400, MemoryKind::Device, Permissions::device());
        let mut project = project(vec![
            Process::new("Drv")
                .with_segment(device(0x4001_0000))
                .with_segment(device(0x3000_0000)),
        ]);

        assert_eq!(
            allocate(&mut project, &chip(), MemoryKind::Device),
            Err(LayoutError::OutsideTrunks {
                segment: SegmentRef::new("Drv", 1, MemoryKind::Device),
                start: 0x3000_0000,
                size: 0x400,
            })
        );

        project.processes[0].segments[1] =
            MemorySegment::auto(0x400, MemoryKind::Device, Permissions::device());
        assert!(matches!(
            allocate(&mut project, &chip(), MemoryKind::Device),
            Err(LayoutError::AutoDevice { .. })
        ));
    }
}
