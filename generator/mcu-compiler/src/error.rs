use crate::ValidationError;
use core::fmt;
use mcu_capid::CapIdError;
use mcu_layout::LayoutError;
use mcu_region::RegionError;

/// The generator phase that detected an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Validation,
    Alignment,
    Layout,
    Capability,
    Region,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Validation => "validation",
            Self::Alignment => "alignment",
            Self::Layout => "memory layout",
            Self::Capability => "capability resolution",
            Self::Region => "region synthesis",
        })
    }
}

/// What kind of fault an error indicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The description violates a structural rule.
    Configuration,
    /// No memory, address or region satisfies a constraint, or a reference
    /// has no target.
    Placement,
    /// The generator broke one of its own invariants.
    Internal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Configuration => "configuration error",
            Self::Placement => "placement error",
            Self::Internal => "internal error",
        })
    }
}

/// A fatal error of a generator run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Capability(#[from] CapIdError),
    #[error(transparent)]
    Region(#[from] RegionError),
}

impl CompileError {
    #[must_use]
    pub const fn phase(&self) -> Phase {
        match self {
            Self::Validation(_) => Phase::Validation,
            Self::Layout(
                LayoutError::Unalignable { .. } | LayoutError::AlignmentCollapse { .. },
            ) => Phase::Alignment,
            Self::Layout(_) => Phase::Layout,
            Self::Capability(_) => Phase::Capability,
            Self::Region(_) => Phase::Region,
        }
    }

    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Validation(_) => ErrorClass::Configuration,
            Self::Layout(e) => classify(e.is_internal(), e.is_configuration()),
            Self::Capability(e) => classify(
                e.is_internal(),
                !e.is_internal() && !e.is_unresolved_reference(),
            ),
            Self::Region(e) => classify(e.is_internal(), matches!(e, RegionError::Empty { .. })),
        }
    }

    /// `"<class> during <phase>: <message>"`.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{} during {}: {self}", self.class(), self.phase())
    }
}

const fn classify(internal: bool, configuration: bool) -> ErrorClass {
    if internal {
        ErrorClass::Internal
    } else if configuration {
        ErrorClass::Configuration
    } else {
        ErrorClass::Placement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcu_model::{MemoryKind, SegmentRef};

    #[test]
    fn phases_and_classes() {
        let segment = SegmentRef::new("P", 0, MemoryKind::Code);

        let e = CompileError::from(LayoutError::AlignmentCollapse {
            segment: segment.clone(),
            size: 0x10,
            align: 0x20,
        });
        assert_eq!((e.phase(), e.class()), (Phase::Alignment, ErrorClass::Configuration));

        let e = CompileError::from(LayoutError::OutOfMemory {
            segment: segment.clone(),
            size: 0x1000,
        });
        assert_eq!((e.phase(), e.class()), (Phase::Layout, ErrorClass::Placement));

        let e = CompileError::from(LayoutError::Unplaced { segment });
        assert_eq!(e.class(), ErrorClass::Internal);

        let e = CompileError::from(CapIdError::CountMismatch {
            expected: 4,
            written: 3,
        });
        assert_eq!((e.phase(), e.class()), (Phase::Capability, ErrorClass::Internal));
        assert_eq!(
            e.describe(),
            "internal error during capability resolution: global capability table holds 3 entries, expected 4"
        );
    }
}
