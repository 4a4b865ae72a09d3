use crate::LayoutError;
use log::{debug, warn};
use mcu_addresses::Order;
use mcu_model::consts::AUTO_ALIGN_DIVISOR;
use mcu_model::{MemoryKind, Project, SegmentRef};

/// Derived placement constraints of an auto-placed segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoAlignment {
    /// Required start alignment in bytes. Zero for requests below eight
    /// bytes, which have no usable alignment.
    pub align: u64,
    /// Usable size after rounding; zero whenever `align` is.
    pub size: u64,
}

/// Alignment and usable size for an auto-placed segment of `size` bytes.
///
/// The size is rounded up to a power of two and one eighth of that becomes
/// the alignment. The size then shrinks to the largest multiple of the
/// alignment strictly below the request, so up to a whole alignment granule
/// of the request is given up.
///
/// `None` for a zero size or one without a representable power of two.
///
/// ```rust
/// # use mcu_layout::auto_alignment;
/// let a = auto_alignment(0x3000).unwrap();
/// assert_eq!((a.align, a.size), (0x800, 0x2800));
/// ```
#[must_use]
pub fn auto_alignment(size: u64) -> Option<AutoAlignment> {
    let below = size.checked_sub(1)?;
    let align = Order::containing(size)?.size() / AUTO_ALIGN_DIVISOR;
    if align == 0 {
        return Some(AutoAlignment { align: 0, size: 0 });
    }
    Some(AutoAlignment {
        align,
        size: (below / align) * align,
    })
}

/// Derive the alignment of every auto-placed code and data segment and
/// shrink its size accordingly.
///
/// Fixed segments and device segments are left alone.
///
/// # Errors
/// [`LayoutError::Unalignable`] or [`LayoutError::AlignmentCollapse`] naming
/// the first segment that cannot be aligned.
pub fn align_segments(project: &mut Project) -> Result<(), LayoutError> {
    for process in &mut project.processes {
        for (index, segment) in process.segments.iter_mut().enumerate() {
            if !segment.start.is_auto() || segment.kind == MemoryKind::Device {
                continue;
            }

            let reference = || SegmentRef::new(&process.name, index, segment.kind);
            let Some(derived) = auto_alignment(segment.size) else {
                return Err(LayoutError::Unalignable {
                    segment: reference(),
                    size: segment.size,
                });
            };
            if derived.size == 0 {
                return Err(LayoutError::AlignmentCollapse {
                    segment: reference(),
                    size: segment.size,
                    align: derived.align,
                });
            }

            if segment.size - derived.size >= derived.align {
                warn!(
                    "{}: 0x{:X} bytes shrink to 0x{:X} at alignment 0x{:X}",
                    reference(),
                    segment.size,
                    derived.size,
                    derived.align
                );
            } else {
                debug!(
                    "{}: align 0x{:X}, size 0x{:X} -> 0x{:X}",
                    reference(),
                    derived.align,
                    segment.size,
                    derived.size
                );
            }

            segment.align = Some(derived.align);
            segment.size = derived.size;
        }
    }
    Ok(())
}
