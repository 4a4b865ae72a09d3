//! Occupancy tracking for one memory trunk.

/// One bit per 4-byte unit of a trunk; a set bit means "in use".
///
/// Ranges are given in units relative to the trunk start. Both marking
/// operations either mark the whole range or leave the bitmap untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyBitmap {
    words: Vec<u32>,
    units: usize,
}

/// A rejected [`OccupancyBitmap::mark`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BitmapError {
    #[error("{count} units from unit {first} exceed the bitmap of {units} units")]
    OutOfRange {
        first: usize,
        count: usize,
        units: usize,
    },
    #[error("unit {0} is already occupied")]
    Occupied(usize),
}

const WORD_BITS: usize = u32::BITS as usize;

impl OccupancyBitmap {
    /// An empty bitmap of `units` units.
    #[must_use]
    pub fn new(units: usize) -> Self {
        Self {
            words: vec![0; units.div_ceil(WORD_BITS)],
            units,
        }
    }

    #[inline]
    #[must_use]
    pub const fn units(&self) -> usize {
        self.units
    }

    #[must_use]
    pub fn is_set(&self, unit: usize) -> bool {
        unit < self.units && self.words[unit / WORD_BITS] & (1 << (unit % WORD_BITS)) != 0
    }

    /// Number of occupied units.
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Whether every unit in `first..first + count` is free.
    ///
    /// A range that leaves the bitmap is never free.
    #[must_use]
    pub fn is_free(&self, first: usize, count: usize) -> bool {
        self.in_range(first, count)
            && masks(first, count).all(|(word, mask)| self.words[word] & mask == 0)
    }

    /// Mark `first..first + count` if all of it is free.
    ///
    /// Returns `false`, without touching the bitmap, if any unit is taken or
    /// the range leaves the bitmap.
    pub fn try_mark(&mut self, first: usize, count: usize) -> bool {
        if !self.is_free(first, count) {
            return false;
        }
        self.set(first, count);
        true
    }

    /// Mark `first..first + count` for a placement that must not move.
    ///
    /// # Errors
    /// [`BitmapError::OutOfRange`] if the range leaves the bitmap,
    /// [`BitmapError::Occupied`] with the first taken unit on overlap. The
    /// bitmap is unchanged in both cases.
    pub fn mark(&mut self, first: usize, count: usize) -> Result<(), BitmapError> {
        if !self.in_range(first, count) {
            return Err(BitmapError::OutOfRange {
                first,
                count,
                units: self.units,
            });
        }
        if let Some(unit) = (first..first + count).find(|&u| self.is_set(u)) {
            return Err(BitmapError::Occupied(unit));
        }
        self.set(first, count);
        Ok(())
    }

    fn in_range(&self, first: usize, count: usize) -> bool {
        first.checked_add(count).is_some_and(|end| end <= self.units)
    }

    fn set(&mut self, first: usize, count: usize) {
        for (word, mask) in masks(first, count) {
            self.words[word] |= mask;
        }
    }
}

/// Split a unit range into `(word index, bit mask)` pairs.
fn masks(first: usize, count: usize) -> impl Iterator<Item = (usize, u32)> {
    let end = first + count;
    let mut pos = first;
    core::iter::from_fn(move || {
        if pos >= end {
            return None;
        }
        let word = pos / WORD_BITS;
        let bit = pos % WORD_BITS;
        let take = (WORD_BITS - bit).min(end - pos);
        let mask = if take == WORD_BITS {
            u32::MAX
        } else {
            ((1u32 << take) - 1) << bit
        };
        pos += take;
        Some((word, mask))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_mark_is_all_or_nothing() {
        let mut bm = OccupancyBitmap::new(100);
        assert!(bm.try_mark(10, 5));
        assert_eq!(bm.occupied(), 5);

        // Overlaps unit 14 only; nothing may change.
        assert!(!bm.try_mark(14, 40));
        assert_eq!(bm.occupied(), 5);
        assert!(!bm.is_set(20));

        assert!(bm.try_mark(15, 40));
        assert_eq!(bm.occupied(), 45);
    }

    #[test]
    fn ranges_across_word_boundaries() {
        let mut bm = OccupancyBitmap::new(200);
        assert!(bm.try_mark(30, 70));
        assert!(bm.is_set(30) && bm.is_set(31) && bm.is_set(32) && bm.is_set(99));
        assert!(!bm.is_set(29) && !bm.is_set(100));
        assert!(bm.is_free(0, 30));
        assert!(bm.is_free(100, 100));
        assert!(!bm.is_free(90, 20));
    }

    #[test]
    fn out_of_range_is_never_free() {
        let mut bm = OccupancyBitmap::new(64);
        assert!(!bm.try_mark(60, 5));
        assert!(!bm.try_mark(usize::MAX, 2));
        assert_eq!(
            bm.mark(60, 5),
            Err(BitmapError::OutOfRange {
                first: 60,
                count: 5,
                units: 64
            })
        );
        assert!(bm.try_mark(60, 4));
    }

    #[test]
    fn mark_reports_first_conflict() {
        let mut bm = OccupancyBitmap::new(64);
        bm.mark(8, 8).unwrap();
        assert_eq!(bm.mark(0, 12), Err(BitmapError::Occupied(8)));
        assert_eq!(bm.occupied(), 8);
        bm.mark(0, 8).unwrap();
        assert_eq!(bm.occupied(), 16);
    }

    #[test]
    fn empty_range_is_trivially_free() {
        let mut bm = OccupancyBitmap::new(4);
        assert!(bm.try_mark(4, 0));
        assert_eq!(bm.occupied(), 0);
    }
}
