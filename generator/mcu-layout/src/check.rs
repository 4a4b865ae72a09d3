use crate::LayoutError;
use mcu_model::{MemoryKind, Project, SegmentRef};

/// Verify the placed memory map.
///
/// Every segment must carry an address, and the primary code segments of
/// distinct processes must not overlap; each process' entry lives there.
///
/// # Errors
/// [`LayoutError::Unplaced`] for a segment without an address,
/// [`LayoutError::CodeOverlap`] for two clashing primary code segments.
pub fn check_memory(project: &Project) -> Result<(), LayoutError> {
    let mut primaries = Vec::new();
    for process in &project.processes {
        for (index, segment) in process.segments.iter().enumerate() {
            if segment.base().is_none() {
                return Err(LayoutError::Unplaced {
                    segment: SegmentRef::new(&process.name, index, segment.kind),
                });
            }
        }

        if let Some(code) = process.primary_segment(MemoryKind::Code)
            && let (Some(start), Some(end)) = (code.base(), code.end())
        {
            primaries.push((process.name.as_str(), start.as_u64(), end));
        }
    }

    for (i, &(first, a_start, a_end)) in primaries.iter().enumerate() {
        for &(second, b_start, b_end) in &primaries[i + 1..] {
            if a_start < b_end && b_start < a_end {
                return Err(LayoutError::CodeOverlap {
                    first: first.to_owned(),
                    second: second.to_owned(),
                });
            }
        }
    }
    Ok(())
}
