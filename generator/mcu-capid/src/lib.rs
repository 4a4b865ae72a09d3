//! # Capability Ids
//!
//! Assigns local and global capability ids to the kernel objects of a laid
//! out project, in four strictly ordered phases:
//!
//! 1. [`detect_conflicts`]: every name is a valid identifier and unique in its
//!    scope.
//! 2. [`assign_local_ids`]: per-process capability-table slots.
//! 3. [`assign_global_ids`]: the flat [`GlobalCapabilityTable`].
//! 4. [`backpropagate`]: ports and send endpoints learn the global id of
//!    what they reference.
//!
//! [`resolve`] runs all four.

mod backprop;
mod conflict;
mod error;
mod global;
mod local;

pub use backprop::backpropagate;
pub use conflict::detect_conflicts;
pub use error::CapIdError;
pub use global::{CapabilityKind, GlobalCapabilityTable, GlobalEntry, assign_global_ids};
pub use local::assign_local_ids;

use log::info;
use mcu_model::{Chip, Project};

/// Run all resolver phases in order.
///
/// # Errors
/// The first [`CapIdError`] of any phase. The project is then partially
/// resolved and must be discarded.
pub fn resolve(project: &mut Project, chip: &Chip) -> Result<GlobalCapabilityTable, CapIdError> {
    detect_conflicts(project)?;
    assign_local_ids(project)?;
    let table = assign_global_ids(project)?;
    backpropagate(project, chip)?;
    info!(
        "resolved capabilities of {} processes, main table size {}",
        project.processes.len(),
        table.main_captbl_size(project.library.extra_captbl)
    );
    Ok(table)
}
