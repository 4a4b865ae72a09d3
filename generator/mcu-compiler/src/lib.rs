//! # MCU System Generator
//!
//! Turns a parsed [`Project`] and its [`Chip`] description into a fully
//! resolved system: every segment placed, every kernel object numbered and
//! every process given a protection-region tree.
//!
//! ```rust
//! use mcu_compiler::{GeneratorConfig, compile};
//! use mcu_model::*;
//!
//! let chip = Chip {
//!     class: "STM32F405".into(),
//!     platform: "A7M".into(),
//!     trunks: vec![
//!         MemoryTrunk::new(0x0800_0000, 0x10_0000, MemoryKind::Code),
//!         MemoryTrunk::new(0x2000_0000, 0x2_0000, MemoryKind::Data),
//!     ],
//!     ..Chip::default()
//! };
//! let project = Project {
//!     name: "Blinky".into(),
//!     platform: "A7M".into(),
//!     chip_class: "STM32F405".into(),
//!     kernel: KernelImage {
//!         code_start: PhysicalAddress::new(0x0800_0000),
//!         code_size: 0x8000,
//!         data_start: PhysicalAddress::new(0x2000_0000),
//!         data_size: 0x2000,
//!         ..KernelImage::default()
//!     },
//!     processes: vec![
//!         Process::new("Blinky")
//!             .with_segment(MemorySegment::auto(0x4000, MemoryKind::Code, Permissions::code()))
//!             .with_segment(MemorySegment::auto(0x1000, MemoryKind::Data, Permissions::data()))
//!             .with_thread(Thread::new("Main", "blinky_main", 0x400, 5)),
//!     ],
//!     ..Project::default()
//! };
//!
//! let system = compile(&project, &chip, &GeneratorConfig::default()).unwrap();
//! assert_eq!(system.captbl.len(), 3);
//! println!("{}", system.memory_report());
//! ```

mod config;
mod error;
mod report;
mod validate;

pub use config::GeneratorConfig;
pub use error::{CompileError, ErrorClass, Phase};
pub use report::{CapabilityReport, MemoryReport, RegionReport};
pub use validate::{ValidationError, validate};

use log::info;
use mcu_capid::{GlobalCapabilityTable, resolve};
use mcu_layout::{MemoryMap, align_segments, allocate, check_memory};
use mcu_model::{Chip, MemoryKind, Project};
use mcu_region::{RegionNode, synthesize};

/// The region tree of one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRegions {
    pub process: String,
    pub root: RegionNode,
}

/// Output of a successful run. Read-only input for back ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledSystem {
    /// The project with every segment placed and every id assigned.
    pub project: Project,
    /// The chip the project was laid out on.
    pub chip: Chip,
    pub captbl: GlobalCapabilityTable,
    /// Occupancy of the code and data trunks, in that order.
    pub memory: Vec<MemoryMap>,
    /// One tree per process, in process order.
    pub regions: Vec<ProcessRegions>,
}

impl CompiledSystem {
    #[must_use]
    pub fn regions_of(&self, process: &str) -> Option<&RegionNode> {
        self.regions
            .iter()
            .find(|r| r.process == process)
            .map(|r| &r.root)
    }

    /// Size of the boot process' capability table.
    #[must_use]
    pub fn main_captbl_size(&self) -> usize {
        self.captbl
            .main_captbl_size(self.project.library.extra_captbl)
    }

    #[must_use]
    pub const fn memory_report(&self) -> MemoryReport<'_> {
        MemoryReport(self)
    }

    #[must_use]
    pub const fn capability_report(&self) -> CapabilityReport<'_> {
        CapabilityReport(self)
    }

    #[must_use]
    pub const fn region_report(&self) -> RegionReport<'_> {
        RegionReport(self)
    }
}

/// Run the whole generator.
///
/// Validation, alignment, code and data placement, the device check, the
/// memory check, capability resolution and region synthesis run in that
/// order on a copy of `project`; the input is never modified, so repeated
/// runs give identical results.
///
/// # Errors
/// The first [`CompileError`] of any phase. Nothing is produced on failure.
pub fn compile(
    project: &Project,
    chip: &Chip,
    config: &GeneratorConfig,
) -> Result<CompiledSystem, CompileError> {
    info!(
        "generating '{}' for {} ({})",
        project.name, chip.class, chip.platform
    );
    validate(project, chip, config)?;

    let mut project = project.clone();
    align_segments(&mut project)?;
    let code = allocate(&mut project, chip, MemoryKind::Code)?;
    let data = allocate(&mut project, chip, MemoryKind::Data)?;
    allocate(&mut project, chip, MemoryKind::Device)?;
    check_memory(&project)?;

    let captbl = resolve(&mut project, chip)?;

    let regions = project
        .processes
        .iter()
        .map(|process| {
            synthesize(process, config.region_bound).map(|root| ProcessRegions {
                process: process.name.clone(),
                root,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        "'{}': {} processes, {} global capabilities",
        project.name,
        project.processes.len(),
        captbl.len()
    );
    Ok(CompiledSystem {
        project,
        chip: chip.clone(),
        captbl,
        memory: vec![code, data],
        regions,
    })
}
