//! # Physical Address and Placement Types
//!
//! Strongly typed wrappers for the raw addresses and power-of-two quantities
//! the resource generator juggles while laying out an MCU system.
//!
//! ## Overview
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PhysicalAddress`] | A raw physical address on the target (flash, SRAM or MMIO). |
//! | [`Order`] | A power-of-two exponent; `Order(n)` spans `2^n` bytes. |
//! | [`Placement`] | Either a user-fixed [`PhysicalAddress`] or [`Placement::Auto`]. |
//!
//! A textual address is in one of three states, each a distinct value:
//! [`Placement::Auto`], [`Placement::Fixed`], or an `Err` of [`ParseError`]
//! from [`Placement::from_str`](core::str::FromStr).
//!
//! ## Typical Usage
//!
//! ```rust
//! # use mcu_addresses::*;
//! let start: Placement = "0x0801_0000".parse().unwrap();
//! assert_eq!(start, Placement::Fixed(PhysicalAddress::new(0x0801_0000)));
//!
//! let auto: Placement = "Auto".parse().unwrap();
//! assert!(auto.is_auto());
//!
//! // Smallest power of two holding 0x3000 bytes is 0x4000 (order 14).
//! let order = Order::containing(0x3000).unwrap();
//! assert_eq!(order.size(), 0x4000);
//! assert_eq!(PhysicalAddress::new(0x0800_1234).align_down(order.size()).as_u64(), 0x0800_0000);
//! ```

mod order;
mod physical_address;
mod placement;

pub use crate::order::Order;
pub use crate::physical_address::PhysicalAddress;
pub use crate::placement::{ParseError, Placement, parse_hex};
