//! # System Description Model
//!
//! The typed project and chip model the generator works on. A [`Project`]
//! declares processes with their memory segments and kernel objects; a
//! [`Chip`] describes the memory trunks, options and interrupt vectors of the
//! target MCU.
//!
//! The generator phases fill in the resolved fields (`Option`s below) in
//! place: segment addresses, local and global capability ids, and
//! capability-table sizes.
//!
//! ```rust
//! use mcu_model::{MemoryKind, MemorySegment, Permissions, Process, Thread};
//!
//! let proc = Process::new("Blinky")
//!     .with_segment(MemorySegment::auto(0x1000, MemoryKind::Code, Permissions::code()))
//!     .with_segment(MemorySegment::auto(0x400, MemoryKind::Data, Permissions::data()))
//!     .with_thread(Thread::new("Main", "blinky_main", 0x200, 5));
//!
//! assert_eq!(proc.local_object_count(), 1);
//! ```

extern crate self as mcu_model;

mod chip;
pub mod consts;
mod memory;
mod objects;
mod permissions;
mod process;
mod project;

pub use chip::{Chip, ChipOption, ChipVector, OptionKind};
pub use mcu_addresses::{PhysicalAddress, Placement};
pub use memory::{MemoryKind, MemorySegment, MemoryTrunk, SegmentRef};
pub use objects::{
    CapId, EndpointRole, Invocation, KernelObject, ObjectKind, Port, ReceiveEndpoint,
    SendEndpoint, Thread, is_identifier,
};
pub use permissions::{Permissions, PermissionsError};
pub use process::Process;
pub use project::{ConfigEntry, KernelImage, LibraryImage, Project, Recovery};
