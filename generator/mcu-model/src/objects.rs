use core::fmt;
use mcu_model_derive::KernelObject;

/// A capability identifier, either process-local or global.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct CapId(u32);

impl CapId {
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for CapId {
    #[inline]
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl fmt::Debug for CapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CapId({})", self.0)
    }
}

impl fmt::Display for CapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Category of a named kernel object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    Process,
    Thread,
    Invocation,
    Port,
    ReceiveEndpoint,
    SendEndpoint,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Process => "process",
            Self::Thread => "thread",
            Self::Invocation => "invocation",
            Self::Port => "port",
            Self::ReceiveEndpoint => "receive endpoint",
            Self::SendEndpoint => "send endpoint",
        })
    }
}

/// Uniform view over the named records of a project.
///
/// Implemented via `#[derive(KernelObject)]`.
pub trait KernelObject {
    const KIND: ObjectKind;

    /// The object's user-given name.
    fn name(&self) -> &str;

    /// For references: the name of the process the object points into.
    fn target(&self) -> Option<&str>;
}

/// Whether `name` is a valid C identifier: non-empty, ASCII alphanumerics
/// and `_` only, not starting with a digit.
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// What a receive or send endpoint is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EndpointRole {
    /// Ordinary message passing between processes.
    #[default]
    Message,
    /// Delivery of a hardware interrupt vector.
    Interrupt,
}

/// A schedulable execution context within a process.
#[derive(Debug, Clone, PartialEq, Eq, KernelObject)]
#[kernel_object(kind = Thread)]
pub struct Thread {
    pub name: String,
    /// Entry symbol.
    pub entry: String,
    pub stack_size: u64,
    /// Opaque value handed to the entry.
    pub parameter: String,
    pub priority: u32,
    pub local_id: Option<CapId>,
    pub global_id: Option<CapId>,
}

impl Thread {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        entry: impl Into<String>,
        stack_size: u64,
        priority: u32,
    ) -> Self {
        Self {
            name: name.into(),
            entry: entry.into(),
            stack_size,
            parameter: String::from("0"),
            priority,
            local_id: None,
            global_id: None,
        }
    }

    /// Replace the default entry argument of `"0"`.
    #[must_use]
    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = parameter.into();
        self
    }
}

/// A synchronous call entry into a process.
#[derive(Debug, Clone, PartialEq, Eq, KernelObject)]
#[kernel_object(kind = Invocation)]
pub struct Invocation {
    pub name: String,
    pub entry: String,
    pub stack_size: u64,
    pub local_id: Option<CapId>,
    pub global_id: Option<CapId>,
}

impl Invocation {
    #[must_use]
    pub fn new(name: impl Into<String>, entry: impl Into<String>, stack_size: u64) -> Self {
        Self {
            name: name.into(),
            entry: entry.into(),
            stack_size,
            local_id: None,
            global_id: None,
        }
    }
}

/// A reference to an invocation in another process.
#[derive(Debug, Clone, PartialEq, Eq, KernelObject)]
#[kernel_object(kind = Port)]
pub struct Port {
    /// Name of the target invocation.
    pub name: String,
    /// Name of the process owning the invocation.
    #[kernel_object(target)]
    pub target: String,
    pub local_id: Option<CapId>,
    /// Global id of the referenced invocation.
    pub target_global_id: Option<CapId>,
}

impl Port {
    #[must_use]
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            local_id: None,
            target_global_id: None,
        }
    }
}

/// A message sink owned by a process.
#[derive(Debug, Clone, PartialEq, Eq, KernelObject)]
#[kernel_object(kind = ReceiveEndpoint)]
pub struct ReceiveEndpoint {
    pub name: String,
    pub role: EndpointRole,
    pub local_id: Option<CapId>,
    pub global_id: Option<CapId>,
    /// Interrupt number, resolved from the chip for [`EndpointRole::Interrupt`].
    pub vector_number: Option<u32>,
}

impl ReceiveEndpoint {
    #[must_use]
    pub fn new(name: impl Into<String>, role: EndpointRole) -> Self {
        Self {
            name: name.into(),
            role,
            local_id: None,
            global_id: None,
            vector_number: None,
        }
    }
}

/// A reference to a receive endpoint in another (or the same) process.
#[derive(Debug, Clone, PartialEq, Eq, KernelObject)]
#[kernel_object(kind = SendEndpoint)]
pub struct SendEndpoint {
    /// Name of the target receive endpoint.
    pub name: String,
    #[kernel_object(target)]
    pub target: String,
    pub role: EndpointRole,
    pub local_id: Option<CapId>,
    pub target_global_id: Option<CapId>,
}

impl SendEndpoint {
    #[must_use]
    pub fn new(name: impl Into<String>, target: impl Into<String>, role: EndpointRole) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            role,
            local_id: None,
            target_global_id: None,
        }
    }
}
