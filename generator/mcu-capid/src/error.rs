use mcu_model::ObjectKind;

/// Why capability ids could not be assigned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapIdError {
    #[error("process name '{name}' is not a valid identifier")]
    InvalidProcessName { name: String },
    #[error("{kind} name '{name}' in process '{process}' is not a valid identifier")]
    InvalidName {
        kind: ObjectKind,
        name: String,
        process: String,
    },
    #[error("{kind} '{name}' in process '{process}' names target '{target}', which is not a valid identifier")]
    InvalidTarget {
        kind: ObjectKind,
        name: String,
        process: String,
        target: String,
    },
    #[error("process '{second}' clashes with process '{first}'")]
    DuplicateProcess { first: String, second: String },
    #[error("{kind} '{second}' clashes with '{first}' in process '{process}'")]
    Duplicate {
        kind: ObjectKind,
        process: String,
        first: String,
        second: String,
    },
    #[error("{kind} '{second}' to '{target}' clashes with '{first}' in process '{process}'")]
    DuplicateReference {
        kind: ObjectKind,
        process: String,
        first: String,
        second: String,
        target: String,
    },
    #[error("interrupt endpoint '{second}' in process '{second_process}' clashes with '{first}' in process '{first_process}'")]
    DuplicateInterrupt {
        first: String,
        first_process: String,
        second: String,
        second_process: String,
    },
    #[error("process '{process}' declares more capabilities than a table can index")]
    TableOverflow { process: String },
    #[error("{count} kernel objects exceed the 32-bit global capability space")]
    GlobalOverflow { count: usize },
    #[error("interrupt endpoint '{name}' in process '{process}' names no interrupt vector of the chip")]
    UnknownVector { name: String, process: String },
    #[error("{kind} '{name}' of process '{process}' targets unknown process '{target}'")]
    TargetProcessMissing {
        kind: ObjectKind,
        name: String,
        process: String,
        target: String,
    },
    #[error("port '{name}' of process '{process}' targets its own process")]
    SelfTarget { name: String, process: String },
    #[error("{kind} '{name}' of process '{process}' matches nothing in process '{target}'")]
    TargetObjectMissing {
        kind: ObjectKind,
        name: String,
        process: String,
        target: String,
    },
    #[error("{kind} '{name}' of process '{process}' has no global id")]
    MissingGlobalId {
        kind: ObjectKind,
        name: String,
        process: String,
    },
    #[error("global capability table holds {written} entries, expected {expected}")]
    CountMismatch { expected: usize, written: usize },
}

impl CapIdError {
    /// Whether the error reveals a defect in the id assignment itself.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::CountMismatch { .. } | Self::MissingGlobalId { .. }
        )
    }

    /// Whether the error is a dangling cross-reference rather than a
    /// malformed or conflicting declaration.
    #[must_use]
    pub const fn is_unresolved_reference(&self) -> bool {
        matches!(
            self,
            Self::TargetProcessMissing { .. }
                | Self::TargetObjectMissing { .. }
                | Self::UnknownVector { .. }
        )
    }
}
