//! Declarative slot metadata: contracts, ownership, compatibility.
//!
//! None of these types execute anything. A [`SlotContract`] names a
//! capability a mechanic family delegates; a [`SlotOwner`] ties an
//! implementation to exactly one such capability; [`SlotCompatibility`]
//! lists the system versions an implementation may be bound to.

use semver::{Comparator, Op, Version, VersionReq};
use serde::{Deserialize, Serialize};

/// What kind of capability a slot describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    /// Deterministic function of its input only.
    Pure,
    /// May embed game-balance heuristics or randomness.
    Policy,
    /// Visual or timing cue, expressed as output data.
    Hook,
}

impl std::fmt::Display for SlotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SlotKind::Pure => "pure",
            SlotKind::Policy => "policy",
            SlotKind::Hook => "hook",
        })
    }
}

/// A named capability within a mechanic family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SlotContract {
    /// Unique within the owning system.
    pub name: &'static str,
    pub kind: SlotKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
}

impl SlotContract {
    /// Create a contract with a description.
    #[must_use]
    pub const fn new(name: &'static str, kind: SlotKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description: Some(description),
        }
    }
}

/// The `(system, slot)` pair an implementation fulfils.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotOwner {
    pub system_id: String,
    pub slot_name: String,
}

impl SlotOwner {
    /// Create an owner.
    pub fn new(system_id: impl Into<String>, slot_name: impl Into<String>) -> Self {
        Self {
            system_id: system_id.into(),
            slot_name: slot_name.into(),
        }
    }

    /// Whether this owner is exactly `system_id.slot_name`.
    #[must_use]
    pub fn matches(&self, system_id: &str, slot_name: &str) -> bool {
        self.system_id == system_id && self.slot_name == slot_name
    }
}

impl std::fmt::Display for SlotOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.system_id, self.slot_name)
    }
}

/// A system an implementation may be bound to, with the accepted versions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotCompatibility {
    pub system_id: String,
    pub range: VersionReq,
}

impl SlotCompatibility {
    /// Compatibility with an explicit range.
    pub fn new(system_id: impl Into<String>, range: VersionReq) -> Self {
        Self {
            system_id: system_id.into(),
            range,
        }
    }

    /// `^major.minor.patch` compatibility with `system_id`.
    pub fn caret(system_id: impl Into<String>, version: &Version) -> Self {
        let comparator = Comparator {
            op: Op::Caret,
            major: version.major,
            minor: Some(version.minor),
            patch: Some(version.patch),
            pre: version.pre.clone(),
        };
        Self::new(
            system_id,
            VersionReq {
                comparators: vec![comparator],
            },
        )
    }

    /// Whether this entry names the given system.
    #[must_use]
    pub fn matches_system(&self, system_id: &str) -> bool {
        self.system_id == system_id
    }

    /// Whether this entry names the system and its range accepts `version`.
    #[must_use]
    pub fn accepts(&self, system_id: &str, version: &Version) -> bool {
        self.matches_system(system_id) && self.range.matches(version)
    }
}
