use crate::GeneratorConfig;
use log::debug;
use mcu_model::consts::FIXED_SEGMENT_ALIGN;
use mcu_model::{Chip, MemoryKind, Placement, Project, SegmentRef};

/// A structural problem of the project description.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("address width of {0} bits is not supported")]
    AddressWidth(u8),
    #[error("region bound 2^{bound} exceeds the {width}-bit address space")]
    RegionBound { bound: u8, width: u8 },
    #[error("project targets platform '{project}' but the chip belongs to '{chip}'")]
    PlatformMismatch { project: String, chip: String },
    #[error("project targets chip class '{project}' but the chip is '{chip}'")]
    ChipMismatch { project: String, chip: String },
    #[error("chip option '{0}' has no value in the project")]
    MissingOption(String),
    #[error("'{value}' is not a valid value for chip option '{option}'")]
    BadOptionValue { option: String, value: String },
    #[error("process '{process}' declares no {kind} segment")]
    MissingSegment { process: String, kind: MemoryKind },
    #[error("{0} has zero size")]
    ZeroSize(SegmentRef),
    #[error("{0} grants none of read, write or execute")]
    NoAccess(SegmentRef),
    #[error("{0} must have a fixed address")]
    AutoDevice(SegmentRef),
    #[error("{segment} at 0x{start:08X} +0x{size:X} is not {align}-byte aligned")]
    Misaligned {
        segment: SegmentRef,
        start: u64,
        size: u64,
        align: u64,
    },
    #[error("{segment} ends past the address space at 0x{limit:X}")]
    BeyondAddressSpace { segment: SegmentRef, limit: u64 },
}

/// Check the project against the chip and the configuration before anything
/// is placed.
///
/// # Errors
/// The first [`ValidationError`] found.
pub fn validate(
    project: &Project,
    chip: &Chip,
    config: &GeneratorConfig,
) -> Result<(), ValidationError> {
    let limit = config
        .address_space_end()
        .ok_or(ValidationError::AddressWidth(config.address_width))?;
    if config.region_bound > config.address_width {
        return Err(ValidationError::RegionBound {
            bound: config.region_bound,
            width: config.address_width,
        });
    }

    if project.platform != chip.platform {
        return Err(ValidationError::PlatformMismatch {
            project: project.platform.clone(),
            chip: chip.platform.clone(),
        });
    }
    if project.chip_class != chip.class {
        return Err(ValidationError::ChipMismatch {
            project: project.chip_class.clone(),
            chip: chip.class.clone(),
        });
    }

    for option in &chip.options {
        let entry = project
            .chip_config
            .iter()
            .find(|e| e.name == option.name)
            .ok_or_else(|| ValidationError::MissingOption(option.name.clone()))?;
        if !option.kind.accepts(&entry.value) {
            return Err(ValidationError::BadOptionValue {
                option: option.name.clone(),
                value: entry.value.clone(),
            });
        }
        debug!("{} = {}", option.macro_name, entry.value);
    }

    for process in &project.processes {
        for kind in [MemoryKind::Code, MemoryKind::Data] {
            if process.primary_segment(kind).is_none() {
                return Err(ValidationError::MissingSegment {
                    process: process.name.clone(),
                    kind,
                });
            }
        }

        for (index, segment) in process.segments.iter().enumerate() {
            let reference = || SegmentRef::new(&process.name, index, segment.kind);
            if segment.size == 0 {
                return Err(ValidationError::ZeroSize(reference()));
            }
            if !segment.perm.allows_access() {
                return Err(ValidationError::NoAccess(reference()));
            }

            match segment.start {
                Placement::Auto if segment.kind == MemoryKind::Device => {
                    return Err(ValidationError::AutoDevice(reference()));
                }
                Placement::Auto => {}
                Placement::Fixed(start) => {
                    if !start.is_aligned(FIXED_SEGMENT_ALIGN)
                        || !segment.size.is_multiple_of(FIXED_SEGMENT_ALIGN)
                    {
                        return Err(ValidationError::Misaligned {
                            segment: reference(),
                            start: start.as_u64(),
                            size: segment.size,
                            align: FIXED_SEGMENT_ALIGN,
                        });
                    }
                    if segment.end().is_none_or(|end| end > limit) {
                        return Err(ValidationError::BeyondAddressSpace {
                            segment: reference(),
                            limit,
                        });
                    }
                }
            }
        }
    }

    debug!(
        "project '{}' is valid for chip {} ({} processes)",
        project.name,
        chip.class,
        project.processes.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcu_model::{ChipOption, ConfigEntry, MemorySegment, OptionKind, Permissions, Process};

    fn chip() -> Chip {
        Chip {
            class: "STM32F405".into(),
            platform: "A7M".into(),
            options: vec![
                ChipOption {
                    name: "HSE".into(),
                    macro_name: "RME_A7M_HSE_FREQ".into(),
                    kind: OptionKind::Range { min: 4, max: 26 },
                },
                ChipOption {
                    name: "FPU".into(),
                    macro_name: "RME_A7M_FPU".into(),
                    kind: OptionKind::Select(vec!["None".into(), "FPV4_SP".into()]),
                },
            ],
            ..Chip::default()
        }
    }

    fn process() -> Process {
        Process::new("App")
            .with_segment(MemorySegment::auto(0x1000, MemoryKind::Code, Permissions::code()))
            .with_segment(MemorySegment::auto(0x1000, MemoryKind::Data, Permissions::data()))
    }

    fn project() -> Project {
        Project {
            name: "Demo".into(),
            platform: "A7M".into(),
            chip_class: "STM32F405".into(),
            chip_config: vec![ConfigEntry::new("HSE", "8"), ConfigEntry::new("FPU", "FPV4_SP")],
            processes: vec![process()],
            ..Project::default()
        }
    }

    fn check(project: &Project) -> Result<(), ValidationError> {
        validate(project, &chip(), &GeneratorConfig::default())
    }

    #[test]
    fn accepts_a_well_formed_project() {
        assert_eq!(check(&project()), Ok(()));
    }

    #[test]
    fn platform_and_options() {
        let mut p = project();
        p.platform = "RV32P".into();
        assert!(matches!(check(&p), Err(ValidationError::PlatformMismatch { .. })));

        let mut p = project();
        p.chip_config.remove(0);
        assert_eq!(check(&p), Err(ValidationError::MissingOption("HSE".into())));

        let mut p = project();
        p.chip_config[0].value = "48".into();
        assert_eq!(
            check(&p),
            Err(ValidationError::BadOptionValue {
                option: "HSE".into(),
                value: "48".into()
            })
        );
    }

    #[test]
    fn processes_need_code_and_data() {
        let mut p = project();
        p.processes[0].segments.remove(1);
        assert_eq!(
            check(&p),
            Err(ValidationError::MissingSegment {
                process: "App".into(),
                kind: MemoryKind::Data
            })
        );
    }

    #[test]
    fn segment_rules() {
        let mut p = project();
        p.processes[0] = process().with_segment(MemorySegment::auto(
            0x100,
            MemoryKind::Device,
            Permissions::device(),
        ));
        assert_eq!(
            check(&p),
            Err(ValidationError::AutoDevice(SegmentRef::new("App", 2, MemoryKind::Device)))
        );

        let mut p = project();
        p.processes[0] = process().with_segment(MemorySegment::fixed(
            0x4000_0010,
            0x100,
            MemoryKind::Device,
            Permissions::device(),
        ));
        assert!(matches!(check(&p), Err(ValidationError::Misaligned { .. })));

        let mut p = project();
        p.processes[0] = process().with_segment(MemorySegment::fixed(
            0xFFFF_FF00,
            0x200,
            MemoryKind::Device,
            Permissions::device(),
        ));
        assert!(matches!(check(&p), Err(ValidationError::BeyondAddressSpace { .. })));

        let mut p = project();
        p.processes[0].segments[0].size = 0;
        assert!(matches!(check(&p), Err(ValidationError::ZeroSize(_))));

        let mut p = project();
        p.processes[0].segments[1].perm = Permissions::new().with_cacheable(true);
        assert!(matches!(check(&p), Err(ValidationError::NoAccess(_))));
    }

    #[test]
    fn configuration_limits() {
        let cfg = GeneratorConfig::default().with_region_bound(33);
        assert_eq!(
            validate(&project(), &chip(), &cfg),
            Err(ValidationError::RegionBound { bound: 33, width: 32 })
        );
    }
}
