use crate::{
    CapId, Invocation, MemoryKind, MemorySegment, Port, ReceiveEndpoint, SendEndpoint, Thread,
};
use mcu_model_derive::KernelObject;

/// An isolated protection domain and everything it declares.
#[derive(Debug, Clone, PartialEq, Eq, Default, KernelObject)]
#[kernel_object(kind = Process)]
pub struct Process {
    pub name: String,
    /// Capability-table slots reserved beyond the declared objects.
    pub extra_captbl: u32,
    pub segments: Vec<MemorySegment>,
    pub threads: Vec<Thread>,
    pub invocations: Vec<Invocation>,
    pub ports: Vec<Port>,
    pub receive_endpoints: Vec<ReceiveEndpoint>,
    pub send_endpoints: Vec<SendEndpoint>,

    /// Number of local ids in use. Set by the resolver.
    pub captbl_frontier: Option<u32>,
    /// Global id of the process' capability table.
    pub captbl_global_id: Option<CapId>,
    /// Global id of the process object.
    pub global_id: Option<CapId>,
}

impl Process {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_extra_captbl(mut self, extra: u32) -> Self {
        self.extra_captbl = extra;
        self
    }

    #[must_use]
    pub fn with_segment(mut self, segment: MemorySegment) -> Self {
        self.segments.push(segment);
        self
    }

    #[must_use]
    pub fn with_thread(mut self, thread: Thread) -> Self {
        self.threads.push(thread);
        self
    }

    #[must_use]
    pub fn with_invocation(mut self, invocation: Invocation) -> Self {
        self.invocations.push(invocation);
        self
    }

    #[must_use]
    pub fn with_port(mut self, port: Port) -> Self {
        self.ports.push(port);
        self
    }

    #[must_use]
    pub fn with_receive_endpoint(mut self, endpoint: ReceiveEndpoint) -> Self {
        self.receive_endpoints.push(endpoint);
        self
    }

    #[must_use]
    pub fn with_send_endpoint(mut self, endpoint: SendEndpoint) -> Self {
        self.send_endpoints.push(endpoint);
        self
    }

    /// Segments of the given kind, in declaration order.
    pub fn segments_of(&self, kind: MemoryKind) -> impl Iterator<Item = &MemorySegment> {
        self.segments.iter().filter(move |s| s.kind == kind)
    }

    /// The first declared segment of `kind`; the process' primary one.
    #[must_use]
    pub fn primary_segment(&self, kind: MemoryKind) -> Option<&MemorySegment> {
        self.segments_of(kind).next()
    }

    /// Number of objects that receive a local capability id.
    #[must_use]
    pub const fn local_object_count(&self) -> usize {
        self.threads.len()
            + self.invocations.len()
            + self.ports.len()
            + self.receive_endpoints.len()
            + self.send_endpoints.len()
    }

    /// Total capability-table size: used slots plus the reserved extra.
    ///
    /// `None` until the resolver has run.
    #[must_use]
    pub fn captbl_size(&self) -> Option<u32> {
        self.captbl_frontier
            .map(|frontier| frontier.saturating_add(self.extra_captbl))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KernelObject, ObjectKind, Permissions};

    #[test]
    fn builder_and_queries() {
        let p = Process::new("Proc1")
            .with_extra_captbl(4)
            .with_segment(MemorySegment::auto(0x1000, MemoryKind::Data, Permissions::data()))
            .with_segment(MemorySegment::auto(0x3000, MemoryKind::Code, Permissions::code()))
            .with_segment(MemorySegment::auto(0x800, MemoryKind::Code, Permissions::code()))
            .with_thread(Thread::new("T", "t_entry", 0x200, 3));

        assert_eq!(p.name(), "Proc1");
        assert_eq!(Process::KIND, ObjectKind::Process);
        assert_eq!(p.segments_of(MemoryKind::Code).count(), 2);
        assert_eq!(p.primary_segment(MemoryKind::Code).map(|s| s.size), Some(0x3000));
        assert_eq!(p.local_object_count(), 1);
        assert_eq!(p.captbl_size(), None);
    }
}
