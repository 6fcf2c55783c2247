//! Slot system errors.

use thiserror::Error;

/// Errors raised by the registry, the resolver, and typed dispatch.
///
/// Resolution failures ([`SlotError::ImplementationNotFound`] and
/// [`SlotError::InvalidSelection`]) are rendered into the resolver's error
/// list rather than returned, so one bad selection never hides the others.
#[derive(Debug, Error)]
pub enum SlotError {
    /// An implementation with this id is already registered.
    #[error("Slot implementation '{id}' already registered")]
    DuplicateIdentity { id: String },

    /// A selection names an implementation the registry does not know.
    #[error("implementation '{impl_id}' not found for slot '{key}'")]
    ImplementationNotFound { impl_id: String, key: String },

    /// The implementation exists but is owned by another slot or is not
    /// declared compatible with the requesting system.
    #[error("implementation '{impl_id}' is not valid for slot '{system_id}.{slot_name}'")]
    InvalidSelection {
        impl_id: String,
        system_id: String,
        slot_name: String,
    },

    /// A slot was run with input/output types other than its own.
    #[error("slot implementation '{id}' does not take {input} -> {output}")]
    TypeMismatch {
        id: String,
        input: &'static str,
        output: &'static str,
    },

    /// Slot selection config could not be parsed.
    #[error("invalid slot selection config: {0}")]
    Config(#[from] serde_json::Error),
}
