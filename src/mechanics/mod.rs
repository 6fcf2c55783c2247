//! Mechanic families, each a set of slot contracts plus the
//! implementations that fulfil them.
//!
//! - `bubble`: hex-grid shooter (aim, attachment, matching, pop cues, ceiling)
//! - `connect4`: column drops, line wins, turns, and AI opponents
//! - `puyo`: falling pairs, group matching, chain scoring, garbage
//! - `slide`: 2048-style slides, merges, spawning, scoring
//!
//! Family types share short names (`MatchInput`, `SYSTEM_ID`), so they are
//! reached through their module rather than re-exported here.

pub mod bubble;
pub mod connect4;
pub mod puyo;
pub mod slide;

use crate::slots::{global_write, SlotRegistry};

/// Register every family's implementations not already present. Returns
/// the number newly registered.
pub fn register_all_slots(registry: &mut SlotRegistry) -> usize {
    bubble::register_bubble_slots(registry)
        + connect4::register_connect4_slots(registry)
        + puyo::register_puyo_slots(registry)
        + slide::register_slide_slots(registry)
}

/// [`register_all_slots`] against the global registry.
pub fn register_all_slot_implementations() -> usize {
    register_all_slots(&mut global_write())
}
