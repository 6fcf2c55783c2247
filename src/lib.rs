//! # arcade-mechanics
//!
//! A pluggable mechanics engine for rule-driven arcade games.
//!
//! ## Design Principles
//!
//! 1. **Slots, not hard-coded rules**: each mechanic family declares named
//!    capabilities ("matchDetection", "aiOpponent") and any number of
//!    versioned implementations can fulfil them.
//!
//! 2. **Pure decisions**: a slot takes a read-only snapshot and returns
//!    plain data. The caller applies it to authoritative game state.
//!
//! 3. **Explicit randomness**: every random choice draws from the seeded
//!    [`GameRng`] carried in the [`SlotContext`].
//!
//! ## Architecture
//!
//! - **Registry**: an in-process catalogue keyed by implementation id,
//!   with ownership and compatibility checks. A lazily built global
//!   instance is available alongside explicitly constructed ones.
//!
//! - **Resolver**: binds a game's declared selections to implementations,
//!   collecting every error instead of stopping at the first.
//!
//! ## Modules
//!
//! - `core`: grid primitives (neighbours, flood fill, line runs) and RNG
//! - `slots`: contracts, implementations, registry, resolver, errors
//! - `mechanics`: the bubble, connect4, puyo, and slide families
//!
//! ## Example
//!
//! ```
//! use arcade_mechanics::mechanics::{puyo, register_all_slots};
//! use arcade_mechanics::{resolve_slots, SlotRegistry, SlotSelection, SlotSelections};
//!
//! let mut registry = SlotRegistry::new();
//! register_all_slots(&mut registry);
//!
//! let mut selections = SlotSelections::new();
//! selections.insert(
//!     "scoring".into(),
//!     SlotSelection::new("puyo", "chainScoring", "standard_chain_scoring"),
//! );
//!
//! let resolved = resolve_slots(&selections, &registry);
//! assert!(resolved.is_ok());
//!
//! let slot = resolved.get("scoring").unwrap();
//! let input = puyo::ChainScoringInput { chain_count: 1, group_sizes: vec![4], colors_cleared: 1 };
//! let mut ctx = slot.context(7);
//! let out = slot.run::<_, puyo::ChainScoringOutput>(&mut ctx, &input).unwrap();
//! assert_eq!(out.score, 320);
//! ```

pub mod core;
pub mod mechanics;
pub mod slots;

// Re-export commonly used types
pub use crate::core::{
    find_connected_groups, find_line_runs, flood_fill, hex_neighbors, square_neighbors,
    CellPos, GameRng, Grid, LineDirection, LineRun, Neighbors,
};

pub use crate::slots::{
    global, global_read, global_write, new_registry, parse_selections, reset_global,
    resolve_slot_ref, resolve_slots, DynSlot, ParamValue, ResolvedSlot, ResolvedSlots,
    SlotCompatibility, SlotContext, SlotContract, SlotError, SlotImplementation, SlotKind,
    SlotOwner, SlotParams, SlotRegistry, SlotRunFn, SlotSelection, SlotSelections,
};

pub use crate::mechanics::{register_all_slot_implementations, register_all_slots};

#[cfg(test)]
pub(crate) mod test_support {
    use once_cell::sync::Lazy;
    use std::sync::{Mutex, MutexGuard, PoisonError};

    static GLOBAL_REGISTRY_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    /// Serialises unit tests that touch the global registry.
    pub fn global_registry_lock() -> MutexGuard<'static, ()> {
        GLOBAL_REGISTRY_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
