//! Human-readable renderings of a [`CompiledSystem`].

use crate::CompiledSystem;
use core::fmt;
use mcu_capid::{CapabilityKind, GlobalEntry};
use mcu_model::{Project, Thread};

/// Kernel windows, process segments and trunk usage.
pub struct MemoryReport<'a>(pub(crate) &'a CompiledSystem);

impl fmt::Display for MemoryReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let project = &self.0.project;
        let chip = &self.0.chip;
        let kernel = &project.kernel;
        let library = &project.library;

        writeln!(
            f,
            "Memory map of '{}' on {} ({} by {}, {}, cores {}, MPU regions {})",
            project.name,
            project.chip_full,
            chip.class,
            chip.vendor,
            chip.platform,
            chip.cores,
            chip.regions
        )?;
        let windows = [
            ("kernel code", Some(kernel.code_start), kernel.code_size),
            ("library code", kernel.code_end(), library.code_size),
            ("kernel data", Some(kernel.data_start), kernel.data_size),
            ("library data", kernel.data_end(), library.data_size),
        ];
        for (label, start, size) in windows {
            match start {
                Some(start) => writeln!(f, "  {label:<24} {start} +0x{size:X}")?,
                None => writeln!(f, "  {label:<24} (unrepresentable) +0x{size:X}")?,
            }
        }

        for process in &project.processes {
            for (index, segment) in process.segments.iter().enumerate() {
                let label = format!("{} #{index}", process.name);
                write!(f, "  {label:<24} {segment}")?;
                if let Some(align) = segment.align {
                    write!(f, " (auto, align 0x{align:X})")?;
                }
                writeln!(f)?;
            }
        }

        for map in &self.0.memory {
            for occ in map.trunks() {
                writeln!(
                    f,
                    "  {} trunk {} +0x{:X}: 0x{:X} bytes used",
                    map.kind(),
                    occ.trunk.start,
                    occ.trunk.size,
                    occ.used_bytes()
                )?;
            }
        }
        Ok(())
    }
}

/// The global capability table with owner and object names.
pub struct CapabilityReport<'a>(pub(crate) &'a CompiledSystem);

fn object_name<'p>(project: &'p Project, entry: &GlobalEntry) -> Option<&'p str> {
    let process = project.processes.get(entry.process)?;
    let name = match entry.kind {
        CapabilityKind::CapabilityTable | CapabilityKind::Process => &process.name,
        CapabilityKind::Thread => &process.threads.get(entry.object)?.name,
        CapabilityKind::Invocation => &process.invocations.get(entry.object)?.name,
        CapabilityKind::ReceiveEndpoint => &process.receive_endpoints.get(entry.object)?.name,
    };
    Some(name.as_str())
}

fn thread_of<'p>(project: &'p Project, entry: &GlobalEntry) -> Option<&'p Thread> {
    if entry.kind != CapabilityKind::Thread {
        return None;
    }
    project.processes.get(entry.process)?.threads.get(entry.object)
}

impl fmt::Display for CapabilityReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let system = self.0;
        writeln!(
            f,
            "Global capabilities: {} entries, main table size {}",
            system.captbl.len(),
            system.main_captbl_size()
        )?;
        for (id, entry) in system.captbl.iter() {
            let owner = system
                .project
                .processes
                .get(entry.process)
                .map_or("?", |p| p.name.as_str());
            let name = object_name(&system.project, entry).unwrap_or("?");
            write!(f, "  {id:>4} {:<10} {owner}.{name}", entry.kind.to_string())?;
            if let Some(thread) = thread_of(&system.project, entry) {
                write!(
                    f,
                    " {}({}) prio {}",
                    thread.entry, thread.parameter, thread.priority
                )?;
            }
            writeln!(f)?;
        }

        for process in &system.project.processes {
            writeln!(
                f,
                "  '{}': {} local capabilities, table size {}",
                process.name,
                process.captbl_frontier.unwrap_or_default(),
                process.captbl_size().unwrap_or_default()
            )?;
        }
        Ok(())
    }
}

/// Every process' region tree.
pub struct RegionReport<'a>(pub(crate) &'a CompiledSystem);

impl fmt::Display for RegionReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for regions in &self.0.regions {
            writeln!(
                f,
                "Regions of '{}' ({} nodes):",
                regions.process,
                regions.root.node_count()
            )?;
            write!(f, "{}", regions.root)?;
        }
        Ok(())
    }
}
