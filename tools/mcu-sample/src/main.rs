//! Builds a small three-process system, runs the generator on it and prints
//! the resulting memory map, capability table and region trees.
//!
//! Usage: `mcu-sample [log-level]` (default `info`).

mod logger;

use log::{LevelFilter, error};
use logger::StderrLogger;
use mcu_compiler::{GeneratorConfig, compile};
use mcu_model::{
    Chip, ChipOption, ChipVector, ConfigEntry, EndpointRole, Invocation, KernelImage, LibraryImage,
    MemoryKind, MemorySegment, MemoryTrunk, OptionKind, Permissions, PhysicalAddress, Placement,
    Port, Process, Project, ReceiveEndpoint, Recovery, SendEndpoint, Thread,
};
use std::process::ExitCode;
use std::str::FromStr;

fn main() -> ExitCode {
    let level = std::env::args()
        .nth(1)
        .and_then(|arg| LevelFilter::from_str(&arg).ok())
        .unwrap_or(LevelFilter::Info);
    if StderrLogger::new(level).init().is_err() {
        eprintln!("logger already installed");
    }

    let (project, chip) = match sample() {
        Ok(system) => system,
        Err(message) => {
            error!("sample description is malformed: {message}");
            return ExitCode::FAILURE;
        }
    };

    match compile(&project, &chip, &GeneratorConfig::default()) {
        Ok(system) => {
            println!("{}", system.memory_report());
            println!("{}", system.capability_report());
            print!("{}", system.region_report());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e.describe());
            ExitCode::FAILURE
        }
    }
}

/// A segment from its textual placement, size and attribute letters.
fn segment(start: &str, size: u64, kind: MemoryKind, perm: &str) -> Result<MemorySegment, String> {
    let start = Placement::from_str(start).map_err(|e| e.to_string())?;
    let perm = Permissions::from_str(perm).map_err(|e| e.to_string())?;
    Ok(MemorySegment::new(start, size, kind, perm))
}

fn sample() -> Result<(Project, Chip), String> {
    let chip = Chip {
        class: "STM32F405".into(),
        vendor: "ST".into(),
        platform: "A7M".into(),
        compatible: vec!["STM32F405RG".into()],
        cores: 1,
        regions: 8,
        trunks: vec![
            MemoryTrunk::new(0x0800_0000, 0x10_0000, MemoryKind::Code),
            MemoryTrunk::new(0x2000_0000, 0x2_0000, MemoryKind::Data),
            MemoryTrunk::new(0x1000_0000, 0x1_0000, MemoryKind::Data),
            MemoryTrunk::new(0x4000_0000, 0x2000_0000, MemoryKind::Device),
        ],
        options: vec![
            ChipOption {
                name: "SYSTICK".into(),
                macro_name: "RME_A7M_SYSTICK_VAL".into(),
                kind: OptionKind::Range {
                    min: 1,
                    max: 0xFF_FFFF,
                },
            },
            ChipOption {
                name: "FPU".into(),
                macro_name: "RME_A7M_FPU_TYPE".into(),
                kind: OptionKind::Select(vec!["None".into(), "FPV4_SP".into()]),
            },
        ],
        vectors: vec![
            ChipVector {
                name: "USART1".into(),
                number: 37,
            },
            ChipVector {
                name: "TIM2".into(),
                number: 28,
            },
        ],
    };

    let processes = vec![
        Process::new("Init")
            .with_extra_captbl(4)
            .with_segment(segment("Auto", 0x4000, MemoryKind::Code, "RXCS")?)
            .with_segment(segment("Auto", 0x1000, MemoryKind::Data, "RWBCS")?)
            .with_thread(Thread::new("Main", "init_main", 0x400, 10))
            .with_port(Port::new("Log", "Logger"))
            .with_send_endpoint(SendEndpoint::new("Request", "Driver", EndpointRole::Message)),
        Process::new("Logger")
            .with_segment(segment("0x08040000", 0x2000, MemoryKind::Code, "RXCS")?)
            .with_segment(segment("Auto", 0x800, MemoryKind::Data, "RWBCS")?)
            .with_thread(Thread::new("Flush", "logger_flush", 0x200, 3))
            .with_invocation(Invocation::new("Log", "logger_log", 0x200)),
        Process::new("Driver")
            .with_segment(segment("Auto", 0x3000, MemoryKind::Code, "RXCS")?)
            .with_segment(segment("Auto", 0x2000, MemoryKind::Data, "RWBCS")?)
            .with_segment(segment("0x40011000", 0x400, MemoryKind::Device, "RWS")?)
            .with_thread(Thread::new("Irq", "driver_irq", 0x400, 20).with_parameter("37"))
            .with_receive_endpoint(ReceiveEndpoint::new("Request", EndpointRole::Message))
            .with_receive_endpoint(ReceiveEndpoint::new("USART1", EndpointRole::Interrupt)),
    ];

    let project = Project {
        name: "Sample".into(),
        platform: "A7M".into(),
        chip_class: "STM32F405".into(),
        chip_full: "STM32F405RG".into(),
        kernel: KernelImage {
            code_start: PhysicalAddress::new(0x0800_0000),
            code_size: 0x1_0000,
            data_start: PhysicalAddress::new(0x2000_0000),
            data_size: 0x4000,
            extra_kmem: 0x800,
            kmem_order: 4,
            priorities: 32,
        },
        library: LibraryImage {
            code_size: 0x8000,
            data_size: 0x2000,
            extra_captbl: 16,
            recovery: Recovery::Thread,
        },
        chip_config: vec![
            ConfigEntry::new("SYSTICK", "10000"),
            ConfigEntry::new("FPU", "FPV4_SP"),
        ],
        processes,
    };

    Ok((project, chip))
}
