//! Slot implementations and the context they run in.
//!
//! An implementation is plain data plus a function pointer: identity,
//! version, owning slot, compatibility list, and `run`. Implementations
//! hold no mutable state; anything a slot needs per call comes in through
//! [`SlotContext`] or its input.
//!
//! The registry stores implementations of many input/output shapes side
//! by side, so they are type-erased behind [`DynSlot`] and recovered with
//! [`DynSlot::downcast`] at the call site.

use std::any::{type_name, Any};
use std::fmt;

use semver::Version;

use super::contract::{SlotCompatibility, SlotOwner};
use super::error::SlotError;
use super::params::SlotParams;
use crate::core::GameRng;

/// Per-call environment handed to a slot's `run`.
#[derive(Clone, Debug, Default)]
pub struct SlotContext {
    /// Randomness source for policy slots.
    pub rng: GameRng,
    /// Parameters bound by the selection, if any.
    pub params: SlotParams,
}

impl SlotContext {
    /// Context with a fresh seeded generator and no params.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: GameRng::new(seed),
            params: SlotParams::new(),
        }
    }

    /// Replace the bound parameters.
    #[must_use]
    pub fn with_params(mut self, params: SlotParams) -> Self {
        self.params = params;
        self
    }

    /// Context driven by an existing generator.
    #[must_use]
    pub fn from_rng(rng: GameRng) -> Self {
        Self {
            rng,
            params: SlotParams::new(),
        }
    }
}

/// Signature of a slot's behavior.
pub type SlotRunFn<I, O> = fn(&mut SlotContext, &I) -> O;

/// A concrete, versioned fulfilment of one slot contract.
pub struct SlotImplementation<I, O> {
    id: String,
    version: Version,
    owner: SlotOwner,
    compatible_with: Vec<SlotCompatibility>,
    run: SlotRunFn<I, O>,
}

impl<I, O> SlotImplementation<I, O> {
    /// Create an implementation. It starts out compatible with its own
    /// system at `^version`.
    pub fn new(
        id: impl Into<String>,
        version: Version,
        owner: SlotOwner,
        run: SlotRunFn<I, O>,
    ) -> Self {
        let compatible_with = vec![SlotCompatibility::caret(owner.system_id.clone(), &version)];
        Self {
            id: id.into(),
            version,
            owner,
            compatible_with,
            run,
        }
    }

    /// Declare an additional compatible system.
    #[must_use]
    pub fn also_compatible_with(mut self, compat: SlotCompatibility) -> Self {
        self.compatible_with.push(compat);
        self
    }

    /// Replace the whole compatibility list.
    #[must_use]
    pub fn with_compatibility(mut self, compatible_with: Vec<SlotCompatibility>) -> Self {
        self.compatible_with = compatible_with;
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn version(&self) -> &Version {
        &self.version
    }

    #[must_use]
    pub fn owner(&self) -> &SlotOwner {
        &self.owner
    }

    #[must_use]
    pub fn compatible_with(&self) -> &[SlotCompatibility] {
        &self.compatible_with
    }

    /// Execute the slot.
    pub fn run(&self, ctx: &mut SlotContext, input: &I) -> O {
        (self.run)(ctx, input)
    }
}

impl<I, O> fmt::Debug for SlotImplementation<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotImplementation")
            .field("id", &self.id)
            .field("version", &self.version.to_string())
            .field("owner", &self.owner)
            .field("input", &type_name::<I>())
            .field("output", &type_name::<O>())
            .finish_non_exhaustive()
    }
}

/// Type-erased view of a [`SlotImplementation`].
pub trait DynSlot: fmt::Debug + Send + Sync + 'static {
    fn id(&self) -> &str;
    fn version(&self) -> &Version;
    fn owner(&self) -> &SlotOwner;
    fn compatible_with(&self) -> &[SlotCompatibility];
    /// Type names of the input and output, for diagnostics.
    fn signature(&self) -> (&'static str, &'static str);
    fn as_any(&self) -> &dyn Any;
}

impl<I: 'static, O: 'static> DynSlot for SlotImplementation<I, O> {
    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> &Version {
        &self.version
    }

    fn owner(&self) -> &SlotOwner {
        &self.owner
    }

    fn compatible_with(&self) -> &[SlotCompatibility] {
        &self.compatible_with
    }

    fn signature(&self) -> (&'static str, &'static str) {
        (type_name::<I>(), type_name::<O>())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn DynSlot {
    /// Recover the concrete implementation if `I`/`O` match.
    #[must_use]
    pub fn downcast<I: 'static, O: 'static>(&self) -> Option<&SlotImplementation<I, O>> {
        self.as_any().downcast_ref::<SlotImplementation<I, O>>()
    }

    /// Run through the erased handle.
    pub fn run_typed<I: 'static, O: 'static>(
        &self,
        ctx: &mut SlotContext,
        input: &I,
    ) -> Result<O, SlotError> {
        match self.downcast::<I, O>() {
            Some(slot) => Ok(slot.run(ctx, input)),
            None => Err(SlotError::TypeMismatch {
                id: self.id().to_string(),
                input: type_name::<I>(),
                output: type_name::<O>(),
            }),
        }
    }

    /// Whether this implementation may be bound to `system_id.slot_name`:
    /// same owner and the system is on its compatibility list.
    #[must_use]
    pub fn is_valid_for(&self, system_id: &str, slot_name: &str) -> bool {
        self.owner().matches(system_id, slot_name)
            && self.compatible_with().iter().any(|c| c.matches_system(system_id))
    }

    /// Like [`is_valid_for`](Self::is_valid_for), also checking the
    /// declared range against the requesting system version.
    #[must_use]
    pub fn is_valid_for_version(&self, system_id: &str, slot_name: &str, version: &Version) -> bool {
        self.owner().matches(system_id, slot_name)
            && self.compatible_with().iter().any(|c| c.accepts(system_id, version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn double(_ctx: &mut SlotContext, input: &i64) -> i64 {
        input * 2
    }

    fn scaled(ctx: &mut SlotContext, input: &i64) -> i64 {
        input * ctx.params.get_int("factor", 1)
    }

    fn doubler() -> SlotImplementation<i64, i64> {
        SlotImplementation::new(
            "test.double",
            Version::new(1, 0, 0),
            SlotOwner::new("test", "math"),
            double,
        )
    }

    #[test]
    fn test_run_direct() {
        let slot = doubler();
        let mut ctx = SlotContext::new(0);
        assert_eq!(slot.run(&mut ctx, &21), 42);
        assert_eq!(slot.compatible_with().len(), 1);
        assert!(slot.compatible_with()[0].accepts("test", &Version::new(1, 4, 0)));
    }

    #[test]
    fn test_run_through_erasure() {
        let slot: Box<dyn DynSlot> = Box::new(doubler());
        let mut ctx = SlotContext::new(0);

        assert_eq!(slot.run_typed::<i64, i64>(&mut ctx, &5).unwrap(), 10);
        assert!(matches!(
            slot.run_typed::<u8, i64>(&mut ctx, &5),
            Err(SlotError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_params_flow_through_context() {
        let slot = SlotImplementation::new(
            "test.scaled",
            Version::new(1, 0, 0),
            SlotOwner::new("test", "math"),
            scaled,
        );
        let mut ctx = SlotContext::new(0).with_params(SlotParams::new().with("factor", 3));
        assert_eq!(slot.run(&mut ctx, &7), 21);
    }

    #[test]
    fn test_validity() {
        let slot: Box<dyn DynSlot> = Box::new(
            doubler().also_compatible_with(SlotCompatibility::caret("other", &Version::new(2, 0, 0))),
        );

        assert!(slot.is_valid_for("test", "math"));
        assert!(!slot.is_valid_for("test", "physics"));
        // Compatibility alone does not grant ownership.
        assert!(!slot.is_valid_for("other", "math"));

        assert!(slot.is_valid_for_version("test", "math", &Version::new(1, 3, 0)));
        assert!(!slot.is_valid_for_version("test", "math", &Version::new(2, 0, 0)));
    }

    #[test]
    fn test_empty_compatibility_is_never_valid() {
        let slot: Box<dyn DynSlot> = Box::new(doubler().with_compatibility(Vec::new()));
        assert!(!slot.is_valid_for("test", "math"));
    }
}
