//! Slot resolution - binding a game's selections to implementations.
//!
//! [`resolve_slots`] walks every selection, looks the implementation up,
//! validates ownership and compatibility, and binds params. Failures are
//! rendered as strings into [`ResolvedSlots::errors`] and resolution
//! carries on, so one game load reports every bad selection at once.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::SlotError;
use super::implementation::{DynSlot, SlotContext, SlotImplementation};
use super::params::SlotParams;
use super::registry::SlotRegistry;
use crate::core::GameRng;

/// A game's declared choice for one slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSelection {
    pub system_id: String,
    pub slot_name: String,
    pub impl_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<SlotParams>,
}

impl SlotSelection {
    /// Create a selection without params.
    pub fn new(
        system_id: impl Into<String>,
        slot_name: impl Into<String>,
        impl_id: impl Into<String>,
    ) -> Self {
        Self {
            system_id: system_id.into(),
            slot_name: slot_name.into(),
            impl_id: impl_id.into(),
            params: None,
        }
    }

    /// Attach params.
    #[must_use]
    pub fn with_params(mut self, params: SlotParams) -> Self {
        self.params = Some(params);
        self
    }
}

/// Selections keyed by the game's own slot key (e.g. `"mainScoring"`).
pub type SlotSelections = BTreeMap<String, SlotSelection>;

/// A validated binding.
#[derive(Clone, Debug)]
pub struct ResolvedSlot {
    pub system_id: String,
    pub slot_name: String,
    pub implementation: Arc<dyn DynSlot>,
    pub params: Option<SlotParams>,
}

impl ResolvedSlot {
    /// Fresh context carrying the bound params, with a generator derived
    /// from `seed` and this slot's `system.slot` name.
    #[must_use]
    pub fn context(&self, seed: u64) -> SlotContext {
        let rng = GameRng::new(seed).for_context(&format!("{}.{}", self.system_id, self.slot_name));
        SlotContext::from_rng(rng).with_params(self.params.clone().unwrap_or_default())
    }

    /// Concrete implementation, if `I`/`O` match.
    #[must_use]
    pub fn typed<I: 'static, O: 'static>(&self) -> Option<&SlotImplementation<I, O>> {
        self.implementation.downcast::<I, O>()
    }

    /// Run the bound implementation.
    pub fn run<I: 'static, O: 'static>(
        &self,
        ctx: &mut SlotContext,
        input: &I,
    ) -> Result<O, SlotError> {
        self.implementation.run_typed(ctx, input)
    }
}

/// Outcome of [`resolve_slots`].
///
/// Every input key lands in exactly one of `slots` or `errors`.
#[derive(Clone, Debug, Default)]
pub struct ResolvedSlots {
    pub slots: BTreeMap<String, ResolvedSlot>,
    pub errors: Vec<String>,
}

impl ResolvedSlots {
    /// True when every selection resolved.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ResolvedSlot> {
        self.slots.get(key)
    }
}

/// Bind every selection against `registry`, collecting all errors.
pub fn resolve_slots(selections: &SlotSelections, registry: &SlotRegistry) -> ResolvedSlots {
    let mut resolved = ResolvedSlots::default();

    for (key, selection) in selections {
        match resolve_one(key, selection, registry) {
            Ok(slot) => {
                debug!(key = %key, impl_id = %selection.impl_id, "resolved slot");
                resolved.slots.insert(key.clone(), slot);
            }
            Err(err) => {
                warn!(key = %key, error = %err, "slot selection rejected");
                resolved.errors.push(err.to_string());
            }
        }
    }

    debug!(
        resolved = resolved.slots.len(),
        errors = resolved.errors.len(),
        "slot resolution finished"
    );
    resolved
}

fn resolve_one(
    key: &str,
    selection: &SlotSelection,
    registry: &SlotRegistry,
) -> Result<ResolvedSlot, SlotError> {
    let implementation = registry.get(&selection.impl_id).ok_or_else(|| {
        SlotError::ImplementationNotFound {
            impl_id: selection.impl_id.clone(),
            key: key.to_string(),
        }
    })?;

    if !registry.validate_selection(&selection.system_id, &selection.slot_name, &selection.impl_id)
    {
        return Err(SlotError::InvalidSelection {
            impl_id: selection.impl_id.clone(),
            system_id: selection.system_id.clone(),
            slot_name: selection.slot_name.clone(),
        });
    }

    Ok(ResolvedSlot {
        system_id: selection.system_id.clone(),
        slot_name: selection.slot_name.clone(),
        implementation: Arc::clone(implementation),
        params: selection.params.clone(),
    })
}

/// Look up a single implementation by id, with no validation.
#[must_use]
pub fn resolve_slot_ref<'r>(impl_id: &str, registry: &'r SlotRegistry) -> Option<&'r Arc<dyn DynSlot>> {
    registry.get(impl_id)
}

/// Parse a JSON object of `key -> selection`.
///
/// ```
/// use arcade_mechanics::slots::parse_selections;
///
/// let selections = parse_selections(
///     r#"{"ai": {"systemId": "connect4", "slotName": "aiOpponent",
///               "implId": "minimax_ai", "params": {"depth": 6}}}"#,
/// )
/// .unwrap();
/// assert_eq!(selections["ai"].impl_id, "minimax_ai");
/// ```
pub fn parse_selections(json: &str) -> Result<SlotSelections, SlotError> {
    Ok(serde_json::from_str(json)?)
}
