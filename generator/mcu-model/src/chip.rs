use crate::{MemoryKind, MemoryTrunk};

/// A chip description: the physical memory and configuration surface of one
/// MCU variant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Chip {
    /// Chip class, e.g. `STM32F405`.
    pub class: String,
    pub vendor: String,
    /// Platform (architecture) the chip belongs to, e.g. `A7M`.
    pub platform: String,
    /// Full part names this description covers.
    pub compatible: Vec<String>,
    pub cores: u32,
    /// Number of MPU regions the hardware provides.
    pub regions: u32,
    pub trunks: Vec<MemoryTrunk>,
    pub options: Vec<ChipOption>,
    pub vectors: Vec<ChipVector>,
}

impl Chip {
    /// Trunks of the given kind, in declaration order.
    pub fn trunks_of(&self, kind: MemoryKind) -> impl Iterator<Item = &MemoryTrunk> {
        self.trunks.iter().filter(move |t| t.kind == kind)
    }

    #[must_use]
    pub fn option(&self, name: &str) -> Option<&ChipOption> {
        self.options.iter().find(|o| o.name == name)
    }

    #[must_use]
    pub fn vector(&self, name: &str) -> Option<&ChipVector> {
        self.vectors.iter().find(|v| v.name == name)
    }
}

/// A configurable chip setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipOption {
    pub name: String,
    /// Macro emitted for the option in generated headers.
    pub macro_name: String,
    pub kind: OptionKind,
}

/// The value domain of a [`ChipOption`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionKind {
    /// An inclusive integer range.
    Range { min: i64, max: i64 },
    /// One of a fixed set of words.
    Select(Vec<String>),
}

impl OptionKind {
    /// Whether `value` is acceptable for this option.
    #[must_use]
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Self::Range { min, max } => value
                .trim()
                .parse::<i64>()
                .is_ok_and(|v| (*min..=*max).contains(&v)),
            Self::Select(choices) => choices.iter().any(|c| c == value.trim()),
        }
    }
}

/// A hardware interrupt vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipVector {
    pub name: String,
    pub number: u32,
}
