//! # Protection Regions
//!
//! Synthesizes, per process, a tree of protection regions matching an MPU
//! with eight subregions per region. Each [`RegionNode`] spans a power of
//! two and splits into two, four or eight equal children; a child is either
//! unmapped, mapped as a whole, or split further.
//!
//! Trees are pure functions of a process' placed segments and can be built
//! independently per process.

mod error;
mod node;
mod synth;

pub use error::RegionError;
pub use node::{Leaf, RegionNode, RegionSlot};
pub use synth::synthesize;
