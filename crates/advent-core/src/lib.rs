//! World model for the advent text-adventure engine.
//!
//! This crate owns the data every other layer works on: uniquely keyed
//! entities (rooms, items, containers, exits and characters), the flags
//! that describe what they can do, and the [`World`] registry that enforces
//! containment and lock rules. A world can be built programmatically or
//! loaded from JSON through [`loader::WorldFile`].

/// Compass directions used by room exits.
pub mod direction;
/// Entity keys, flags, description states and kind-specific data.
pub mod entity;
/// Error types used throughout the crate.
pub mod error;
/// JSON world definitions and the two-phase world builder.
pub mod loader;
/// Integer currency.
pub mod money;
/// The entity registry and its containment rules.
pub mod world;

/// Re-export direction type.
pub use direction::Direction;
/// Re-export core entity types.
pub use entity::{
    CharacterState, ContainerState, DescriptionTag, Descriptions, Entity, EntityKey, EntityKind,
    ExitState, Flag, ItemProfile, PlayerStats, RoomState, Urgency,
};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export currency type.
pub use money::Money;
/// Re-export world model types.
pub use world::{CloseOutcome, NOWHERE, OpenOutcome, World, WorldMeta};
