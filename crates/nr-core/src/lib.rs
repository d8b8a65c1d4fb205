//! Core types for Nightrule: conditions and game state snapshots.
//!
//! This crate defines the data model the rules engine evaluates. It is
//! independent of the expression language. Conditions and snapshots can be
//! built programmatically or deserialized from JSON.

/// Win and death condition records.
pub mod condition;
/// Error types used throughout the crate.
pub mod error;
/// Read-only snapshots of the game state that conditions are evaluated against.
pub mod state;

/// Re-export condition types.
pub use condition::{Condition, ConditionKind, DeathReason, WinLevel, load_conditions};
/// Re-export error types.
pub use error::{NrError, NrResult};
/// Re-export state types.
pub use state::{ATTRIBUTE_SCHEMA, AttributeValue, GameStateSnapshot};
