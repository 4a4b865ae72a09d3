use crate::Process;
use core::fmt;
use mcu_addresses::PhysicalAddress;

/// A whole system description: kernel, user library, chip selection and
/// processes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Project {
    pub name: String,
    /// Platform (architecture) the project targets.
    pub platform: String,
    pub chip_class: String,
    pub chip_full: String,
    pub kernel: KernelImage,
    pub library: LibraryImage,
    /// Values for the chip's options.
    pub chip_config: Vec<ConfigEntry>,
    pub processes: Vec<Process>,
}

impl Project {
    #[must_use]
    pub fn process(&self, name: &str) -> Option<&Process> {
        self.processes
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

/// One `name = value` setting for a chip option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub name: String,
    pub value: String,
}

impl ConfigEntry {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Where the kernel image lives and how much kernel memory it gets.
///
/// The kernel occupies `[code_start, code_start + code_size)` in a code trunk
/// and `[data_start, data_start + data_size)` in a data trunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KernelImage {
    pub code_start: PhysicalAddress,
    pub code_size: u64,
    pub data_start: PhysicalAddress,
    pub data_size: u64,
    /// Kernel memory reserved beyond what the static objects need.
    pub extra_kmem: u64,
    /// `log2` of the kernel memory slot size.
    pub kmem_order: u8,
    /// Number of scheduler priority levels.
    pub priorities: u32,
}

impl KernelImage {
    /// First address past the kernel code, where the library code begins.
    /// `None` if the window runs past the 64-bit range.
    #[must_use]
    pub const fn code_end(&self) -> Option<PhysicalAddress> {
        self.code_start.checked_add(self.code_size)
    }

    /// First address past the kernel data, where the library data begins.
    #[must_use]
    pub const fn data_end(&self) -> Option<PhysicalAddress> {
        self.data_start.checked_add(self.data_size)
    }
}

/// The user-level runtime linked right after the kernel image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LibraryImage {
    pub code_size: u64,
    pub data_size: u64,
    /// Extra slots in the boot process' capability table.
    pub extra_captbl: u32,
    pub recovery: Recovery,
}

/// What the runtime does when a fault is not handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Recovery {
    /// Restart the faulting thread.
    #[default]
    Thread,
    /// Restart the faulting process.
    Process,
    /// Reboot the system.
    System,
}

impl fmt::Display for Recovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Thread => "Thread",
            Self::Process => "Process",
            Self::System => "System",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_windows_follow_the_kernel() {
        let kernel = KernelImage {
            code_start: PhysicalAddress::new(0x0800_0000),
            code_size: 0x8000,
            data_start: PhysicalAddress::new(0x2000_0000),
            data_size: 0x1000,
            ..KernelImage::default()
        };
        assert_eq!(kernel.code_end(), Some(PhysicalAddress::new(0x0800_8000)));
        assert_eq!(kernel.data_end(), Some(PhysicalAddress::new(0x2000_1000)));

        let wrapped = KernelImage {
            code_start: PhysicalAddress::new(u64::MAX - 0xFFF),
            code_size: 0x2000,
            ..kernel
        };
        assert_eq!(wrapped.code_end(), None);
    }
}
