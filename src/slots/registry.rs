//! Slot registry for implementation lookup.
//!
//! The `SlotRegistry` catalogues every registered implementation by id
//! and answers the ownership/compatibility question the resolver asks.
//!
//! ## Example
//!
//! ```
//! use arcade_mechanics::slots::{SlotContext, SlotImplementation, SlotOwner, SlotRegistry};
//! use semver::Version;
//!
//! fn triple(_ctx: &mut SlotContext, input: &u32) -> u32 {
//!     input * 3
//! }
//!
//! let mut registry = SlotRegistry::new();
//! registry
//!     .register(SlotImplementation::new(
//!         "demo.triple",
//!         Version::new(1, 0, 0),
//!         SlotOwner::new("demo", "multiplier"),
//!         triple,
//!     ))
//!     .unwrap();
//!
//! assert!(registry.validate_selection("demo", "multiplier", "demo.triple"));
//! assert!(!registry.validate_selection("demo", "divider", "demo.triple"));
//!
//! let slot = registry.get_typed::<u32, u32>("demo.triple").unwrap();
//! assert_eq!(slot.run(&mut SlotContext::default(), &4), 12);
//! ```

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use semver::Version;
use tracing::debug;

use super::error::SlotError;
use super::implementation::{DynSlot, SlotImplementation};

/// Catalogue of slot implementations keyed by id.
#[derive(Clone, Debug, Default)]
pub struct SlotRegistry {
    slots: FxHashMap<String, Arc<dyn DynSlot>>,
}

impl SlotRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an implementation.
    ///
    /// Fails with [`SlotError::DuplicateIdentity`] if the id is taken; the
    /// existing entry is left untouched.
    pub fn register<I: 'static, O: 'static>(
        &mut self,
        slot: SlotImplementation<I, O>,
    ) -> Result<(), SlotError> {
        self.register_shared(Arc::new(slot))
    }

    /// Register an already type-erased implementation.
    pub fn register_shared(&mut self, slot: Arc<dyn DynSlot>) -> Result<(), SlotError> {
        if self.slots.contains_key(slot.id()) {
            return Err(SlotError::DuplicateIdentity {
                id: slot.id().to_string(),
            });
        }
        debug!(
            slot_id = slot.id(),
            system_id = %slot.owner().system_id,
            slot_name = %slot.owner().slot_name,
            version = %slot.version(),
            "registered slot"
        );
        self.slots.insert(slot.id().to_string(), slot);
        Ok(())
    }

    /// Register unless the id is already present. Returns whether it was
    /// inserted.
    pub fn register_if_absent<I: 'static, O: 'static>(
        &mut self,
        slot: SlotImplementation<I, O>,
    ) -> bool {
        if self.has(slot.id()) {
            return false;
        }
        self.register(slot).is_ok()
    }

    /// Remove an implementation. No-op if absent.
    pub fn unregister(&mut self, id: &str) -> Option<Arc<dyn DynSlot>> {
        let removed = self.slots.remove(id);
        if removed.is_some() {
            debug!(slot_id = id, "unregistered slot");
        }
        removed
    }

    /// Get an implementation by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Arc<dyn DynSlot>> {
        self.slots.get(id)
    }

    /// Get an implementation by id, recovering its concrete type.
    ///
    /// `None` if absent or if `I`/`O` do not match.
    #[must_use]
    pub fn get_typed<I: 'static, O: 'static>(&self, id: &str) -> Option<&SlotImplementation<I, O>> {
        self.slots.get(id).and_then(|slot| slot.downcast::<I, O>())
    }

    /// Check if an id is registered.
    #[must_use]
    pub fn has(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    /// All implementations owned by `system_id.slot_name`, unordered.
    #[must_use]
    pub fn list_for_slot(&self, system_id: &str, slot_name: &str) -> Vec<&Arc<dyn DynSlot>> {
        self.slots
            .values()
            .filter(|slot| slot.owner().matches(system_id, slot_name))
            .collect()
    }

    /// Whether `impl_id` may be bound to `system_id.slot_name`.
    ///
    /// False if the id is absent, the owner differs, or no compatibility
    /// entry names `system_id`.
    #[must_use]
    pub fn validate_selection(&self, system_id: &str, slot_name: &str, impl_id: &str) -> bool {
        self.slots
            .get(impl_id)
            .is_some_and(|slot| slot.is_valid_for(system_id, slot_name))
    }

    /// [`validate_selection`](Self::validate_selection) with the declared
    /// version range checked against `system_version`.
    #[must_use]
    pub fn validate_selection_at(
        &self,
        system_id: &str,
        slot_name: &str,
        impl_id: &str,
        system_version: &Version,
    ) -> bool {
        self.slots
            .get(impl_id)
            .is_some_and(|slot| slot.is_valid_for_version(system_id, slot_name, system_version))
    }

    /// Every registered implementation, unordered.
    #[must_use]
    pub fn get_all(&self) -> Vec<&Arc<dyn DynSlot>> {
        self.slots.values().collect()
    }

    /// Ids of every registered implementation, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.slots.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Drop every implementation.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

static GLOBAL_REGISTRY: Lazy<RwLock<SlotRegistry>> = Lazy::new(|| RwLock::new(SlotRegistry::new()));

/// A fresh, empty registry independent of the global one.
#[must_use]
pub fn new_registry() -> SlotRegistry {
    SlotRegistry::new()
}

/// The process-wide registry, constructed on first use.
pub fn global() -> &'static RwLock<SlotRegistry> {
    &GLOBAL_REGISTRY
}

/// Shared read access to the global registry.
///
/// A poisoned lock is recovered; registry mutations are single inserts or
/// removals and cannot leave it half-updated.
pub fn global_read() -> RwLockReadGuard<'static, SlotRegistry> {
    GLOBAL_REGISTRY.read().unwrap_or_else(PoisonError::into_inner)
}

/// Exclusive write access to the global registry.
pub fn global_write() -> RwLockWriteGuard<'static, SlotRegistry> {
    GLOBAL_REGISTRY.write().unwrap_or_else(PoisonError::into_inner)
}

/// Replace the global registry with an empty one.
pub fn reset_global() {
    *global_write() = SlotRegistry::new();
    debug!("global slot registry reset");
}
