use crate::{RegionError, RegionNode, RegionSlot};
use log::{debug, trace, warn};
use mcu_addresses::{Order, PhysicalAddress};
use mcu_model::consts::{MAX_NUM_ORDER, MIN_REGION_ORDER};
use mcu_model::{Permissions, Process, SegmentRef};

/// A placed range with its permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: u64,
    end: u64,
    perm: Permissions,
}

impl Span {
    const fn covers(&self, start: u64, end: u64) -> bool {
        self.start <= start && self.end >= end
    }

    const fn overlaps(&self, start: u64, end: u64) -> bool {
        self.start < end && self.end > start
    }

    /// Whether `boundary` falls strictly inside the span.
    const fn is_cut_by(&self, boundary: u64) -> bool {
        self.start < boundary && boundary < self.end
    }
}

/// The tightest power-of-two box around `spans` could not honor `bound`.
struct Oversize {
    start: u64,
    end: u64,
    required: u8,
    bound: u8,
}

/// Build the protection-region tree of one placed process.
///
/// `bound` is the largest admissible region order for the root, usually the
/// address width.
///
/// # Errors
/// [`RegionError::Empty`] for a process without segments,
/// [`RegionError::Unplaced`] for a segment without an address and
/// [`RegionError::TooLarge`] if the memory cannot be covered within `bound`.
pub fn synthesize(process: &Process, bound: u8) -> Result<RegionNode, RegionError> {
    let mut spans = Vec::with_capacity(process.segments.len());
    for (index, segment) in process.segments.iter().enumerate() {
        let end = segment.end().ok_or_else(|| RegionError::Unplaced {
            segment: SegmentRef::new(&process.name, index, segment.kind),
        })?;
        if segment.size == 0 {
            continue;
        }
        spans.push(Span {
            start: end - segment.size,
            end,
            perm: segment.perm,
        });
    }
    if spans.is_empty() {
        return Err(RegionError::Empty {
            process: process.name.clone(),
        });
    }

    let root = build(&spans, bound).map_err(|o| RegionError::TooLarge {
        process: process.name.clone(),
        start: o.start,
        end: o.end,
        required: o.required,
        bound: o.bound,
    })?;
    debug!(
        "process '{}': {} region nodes, depth {}",
        process.name,
        root.node_count(),
        root.depth()
    );
    Ok(root)
}

fn build(spans: &[Span], bound: u8) -> Result<RegionNode, Oversize> {
    let (base, total) = bounding_box(spans, bound)?;
    let num_order = subdivision(spans, base, total);
    let child_order = total - num_order;
    let child_size = 1u64 << child_order;

    let mut node = RegionNode {
        base: PhysicalAddress::new(base),
        size_order: Order::new(child_order).unwrap_or(Order::MAX),
        num_order,
        attr: spans
            .iter()
            .fold(Permissions::new(), |acc, s| acc.union(s.perm)),
        children: Default::default(),
    };
    trace!(
        "node {} +2^{total}: {} children of 2^{child_order}",
        node.base,
        1 << num_order
    );

    for (i, slot) in node.children[..1 << num_order].iter_mut().enumerate() {
        let c_start = base + i as u64 * child_size;
        let c_end = c_start + child_size;

        let mut covers = spans.iter().filter(|s| s.covers(c_start, c_end));
        if let Some(first) = covers.next() {
            if let Some(other) = covers.find(|s| s.perm != first.perm) {
                warn!(
                    "region 0x{c_start:08X} +0x{child_size:X} mapped {} although a covering segment asks for {}",
                    first.perm, other.perm
                );
            }
            *slot = RegionSlot::Leaf(first.perm);
            continue;
        }

        let clipped: Vec<Span> = spans
            .iter()
            .filter(|s| s.overlaps(c_start, c_end))
            .map(|s| Span {
                start: s.start.max(c_start),
                end: s.end.min(c_end),
                perm: s.perm,
            })
            .collect();
        if !clipped.is_empty() {
            *slot = RegionSlot::Table(Box::new(build(&clipped, child_order)?));
        }
    }

    Ok(node)
}

/// Smallest `(base, order)` with `base` aligned to `2^order`, `order` at
/// least `MIN_REGION_ORDER` and `[base, base + 2^order)` holding all spans.
fn bounding_box(spans: &[Span], bound: u8) -> Result<(u64, u8), Oversize> {
    let start = spans.iter().map(|s| s.start).min().unwrap_or_default();
    let end = spans.iter().map(|s| s.end).max().unwrap_or_default();

    let mut order = MIN_REGION_ORDER;
    loop {
        let oversize = Oversize {
            start,
            end,
            required: order,
            bound,
        };
        if order > bound || order >= 64 {
            return Err(oversize);
        }
        let base = start & !((1u64 << order) - 1);
        if u128::from(base) + (1u128 << order) >= u128::from(end) {
            return Ok((base, order));
        }
        order += 1;
    }
}

/// `log2` of the child count for a node of `2^total` bytes at `base`.
///
/// Eight children when all spans share one permission set and sit on
/// eighth boundaries; otherwise the finest split that cuts no span, falling
/// back to halves.
fn subdivision(spans: &[Span], base: u64, total: u8) -> u8 {
    let eighth = 1u64 << (total - MAX_NUM_ORDER);
    let uniform = spans.iter().all(|s| s.perm == spans[0].perm)
        && spans
            .iter()
            .all(|s| s.start % eighth == 0 && (s.end - s.start) % eighth == 0);
    if uniform {
        return MAX_NUM_ORDER;
    }

    (1..=MAX_NUM_ORDER)
        .rev()
        .find(|&n| {
            let child = 1u64 << (total - n);
            (1..1u64 << n).all(|k| {
                let boundary = base + k * child;
                !spans.iter().any(|s| s.is_cut_by(boundary))
            })
        })
        .unwrap_or(1)
}
