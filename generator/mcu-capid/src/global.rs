use crate::CapIdError;
use core::fmt;
use log::{debug, info};
use mcu_model::{CapId, Project};

/// Kind of a kernel object in the global capability table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CapabilityKind {
    CapabilityTable,
    Process,
    Thread,
    Invocation,
    ReceiveEndpoint,
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CapabilityTable => "captbl",
            Self::Process => "process",
            Self::Thread => "thread",
            Self::Invocation => "invocation",
            Self::ReceiveEndpoint => "endpoint",
        })
    }
}

/// One slot of the global table.
///
/// `process` indexes `Project::processes`; `object` indexes the matching
/// per-process list (zero for capability tables and processes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalEntry {
    pub kind: CapabilityKind,
    pub process: usize,
    pub object: usize,
}

/// The system-wide capability table, indexed by global [`CapId`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalCapabilityTable {
    entries: Vec<GlobalEntry>,
}

impl GlobalCapabilityTable {
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: CapId) -> Option<&GlobalEntry> {
        self.entries.get(usize::try_from(id.get()).ok()?)
    }

    /// Entries with their ids, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (CapId, &GlobalEntry)> {
        (0u32..).map(CapId::new).zip(&self.entries)
    }

    /// Number of entries of `kind`.
    #[must_use]
    pub fn count(&self, kind: CapabilityKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    /// Size of the boot process' table: every global object plus `extra`
    /// reserved slots.
    #[must_use]
    pub fn main_captbl_size(&self, extra: u32) -> usize {
        self.entries.len() + extra as usize
    }

    fn push(&mut self, kind: CapabilityKind, process: usize, object: usize) -> Option<CapId> {
        let id = CapId::new(u32::try_from(self.entries.len()).ok()?);
        self.entries.push(GlobalEntry {
            kind,
            process,
            object,
        });
        Some(id)
    }
}

/// Number the project's kernel objects in one flat sequence.
///
/// Order: all capability tables, all processes, all threads, all
/// invocations, then all receive endpoints; within a category process by
/// process in declaration order. Ports and send endpoints are references and
/// get no entry.
///
/// # Errors
/// [`CapIdError::CountMismatch`] if the written table does not hold exactly
/// one entry per kernel object.
pub fn assign_global_ids(project: &mut Project) -> Result<GlobalCapabilityTable, CapIdError> {
    let processes = project.processes.len();
    let expected = 2 * processes
        + project
            .processes
            .iter()
            .map(|p| p.threads.len() + p.invocations.len() + p.receive_endpoints.len())
            .sum::<usize>();

    let mut table = GlobalCapabilityTable {
        entries: Vec::with_capacity(expected),
    };
    let overflow = || CapIdError::GlobalOverflow { count: expected };

    for (p, process) in project.processes.iter_mut().enumerate() {
        process.captbl_global_id =
            Some(table.push(CapabilityKind::CapabilityTable, p, 0).ok_or_else(overflow)?);
    }
    for (p, process) in project.processes.iter_mut().enumerate() {
        process.global_id = Some(table.push(CapabilityKind::Process, p, 0).ok_or_else(overflow)?);
    }
    for (p, process) in project.processes.iter_mut().enumerate() {
        for (o, thread) in process.threads.iter_mut().enumerate() {
            thread.global_id = Some(table.push(CapabilityKind::Thread, p, o).ok_or_else(overflow)?);
        }
    }
    for (p, process) in project.processes.iter_mut().enumerate() {
        for (o, invocation) in process.invocations.iter_mut().enumerate() {
            invocation.global_id =
                Some(table.push(CapabilityKind::Invocation, p, o).ok_or_else(overflow)?);
        }
    }
    for (p, process) in project.processes.iter_mut().enumerate() {
        for (o, endpoint) in process.receive_endpoints.iter_mut().enumerate() {
            endpoint.global_id =
                Some(table.push(CapabilityKind::ReceiveEndpoint, p, o).ok_or_else(overflow)?);
        }
    }

    if table.len() != expected {
        return Err(CapIdError::CountMismatch {
            expected,
            written: table.len(),
        });
    }

    for kind in [
        CapabilityKind::CapabilityTable,
        CapabilityKind::Process,
        CapabilityKind::Thread,
        CapabilityKind::Invocation,
        CapabilityKind::ReceiveEndpoint,
    ] {
        debug!("{} {kind} capabilities", table.count(kind));
    }
    info!("global capability table: {} entries", table.len());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcu_model::{EndpointRole, Invocation, Port, Process, ReceiveEndpoint, Thread};

    #[test]
    fn categories_come_before_processes() {
        let mut project = Project {
            processes: vec![
                Process::new("A")
                    .with_thread(Thread::new("TA", "a", 0x100, 1))
                    .with_invocation(Invocation::new("IA", "ia", 0x100))
                    .with_port(Port::new("IB", "B")),
                Process::new("B")
                    .with_thread(Thread::new("TB0", "b0", 0x100, 1))
                    .with_thread(Thread::new("TB1", "b1", 0x100, 1))
                    .with_invocation(Invocation::new("IB", "ib", 0x100))
                    .with_receive_endpoint(ReceiveEndpoint::new("RB", EndpointRole::Message))
                    .with_receive_endpoint(ReceiveEndpoint::new("IRQ", EndpointRole::Interrupt)),
            ],
            ..Project::default()
        };

        let table = assign_global_ids(&mut project).unwrap();
        assert_eq!(table.len(), 2 + 2 + 3 + 2 + 2);

        let [a, b] = &project.processes[..] else {
            panic!("two processes")
        };
        let id = |v: Option<CapId>| v.map(CapId::get);
        assert_eq!((id(a.captbl_global_id), id(b.captbl_global_id)), (Some(0), Some(1)));
        assert_eq!((id(a.global_id), id(b.global_id)), (Some(2), Some(3)));
        assert_eq!(id(a.threads[0].global_id), Some(4));
        assert_eq!(id(b.threads[1].global_id), Some(6));
        assert_eq!(id(a.invocations[0].global_id), Some(7));
        assert_eq!(id(b.invocations[0].global_id), Some(8));
        assert_eq!(id(b.receive_endpoints[1].global_id), Some(10));
        assert_eq!(a.ports[0].local_id, None);

        let kinds: Vec<_> = table.iter().map(|(_, e)| e.kind).collect();
        assert!(kinds.is_sorted());
        assert_eq!(
            table.get(CapId::new(6)),
            Some(&GlobalEntry {
                kind: CapabilityKind::Thread,
                process: 1,
                object: 1
            })
        );
        assert_eq!(table.main_captbl_size(5), 16);
    }

    #[test]
    fn every_id_used_once() {
        let mut project = Project {
            processes: (0..4)
                .map(|i| {
                    Process::new(format!("P{i}"))
                        .with_thread(Thread::new("T", "t", 0x100, 1))
                        .with_receive_endpoint(ReceiveEndpoint::new("E", EndpointRole::Message))
                })
                .collect(),
            ..Project::default()
        };

        let table = assign_global_ids(&mut project).unwrap();
        let mut ids: Vec<u32> = project
            .processes
            .iter()
            .flat_map(|p| {
                [
                    p.captbl_global_id,
                    p.global_id,
                    p.threads[0].global_id,
                    p.receive_endpoints[0].global_id,
                ]
            })
            .map(|id| id.unwrap().get())
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..u32::try_from(table.len()).unwrap()).collect::<Vec<_>>());
    }
}
