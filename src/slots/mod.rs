//! The slot model: contracts, implementations, registry, and resolver.
//!
//! A mechanic family declares a handful of [`SlotContract`]s. Each
//! contract can be fulfilled by several versioned
//! [`SlotImplementation`]s registered in a [`SlotRegistry`]. A game picks
//! one implementation per slot through [`SlotSelection`]s, and
//! [`resolve_slots`] binds them before any gameplay logic runs.

pub mod contract;
pub mod error;
pub mod implementation;
pub mod params;
pub mod registry;
pub mod resolver;

pub use contract::{SlotCompatibility, SlotContract, SlotKind, SlotOwner};
pub use error::SlotError;
pub use implementation::{DynSlot, SlotContext, SlotImplementation, SlotRunFn};
pub use params::{ParamValue, SlotParams};
pub use registry::{global, global_read, global_write, new_registry, reset_global, SlotRegistry};
pub use resolver::{
    parse_selections, resolve_slot_ref, resolve_slots, ResolvedSlot, ResolvedSlots, SlotSelection,
    SlotSelections,
};
