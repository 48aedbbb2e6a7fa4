//! Error types for the fiction engine.

use advent_core::{CoreError, EntityKey};
use thiserror::Error;

/// Result type for fiction operations.
pub type FictionResult<T> = Result<T, FictionError>;

/// Errors raised by broken content or engine misuse.
///
/// Player mistakes never surface here. They come back as parse failures or
/// response lines so the game loop keeps running.
#[derive(Debug, Error)]
pub enum FictionError {
    /// World model error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The scenario names no player, or the player is not a character.
    #[error("player entity not found: {0}")]
    PlayerNotFound(EntityKey),

    /// A behavior or vendor refers to an entity that does not exist.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityKey),

    /// A dialogue node id is empty.
    #[error("dialogue \"{0}\" has a node with an empty id")]
    EmptyNodeId(String),

    /// Two dialogue nodes share an id.
    #[error("dialogue \"{dialogue}\" declares node \"{node}\" twice")]
    DuplicateNode {
        /// The dialogue being built.
        dialogue: String,
        /// The repeated node id.
        node: String,
    },

    /// The declared root node does not exist.
    #[error("dialogue \"{dialogue}\" has no root node \"{root}\"")]
    MissingRoot {
        /// The dialogue being built.
        dialogue: String,
        /// The missing root id.
        root: String,
    },

    /// A choice leads to a node that does not exist.
    #[error("dialogue \"{dialogue}\": choice \"{choice}\" on node \"{node}\" leads to unknown node \"{target}\"")]
    DanglingChoice {
        /// The dialogue being built.
        dialogue: String,
        /// Node carrying the choice.
        node: String,
        /// Text of the choice.
        choice: String,
        /// The missing target id.
        target: String,
    },

    /// A terminal marker names a node that does not exist.
    #[error("dialogue \"{dialogue}\" marks unknown node \"{node}\" as terminal")]
    UnknownNode {
        /// The dialogue being built.
        dialogue: String,
        /// The missing node id.
        node: String,
    },

    /// A choice index outside the current node's choices.
    #[error("invalid choice: {0}")]
    InvalidChoice(usize),

    /// A behavior refers to a dialogue that was never declared.
    #[error("dialogue not found: {0}")]
    DialogueNotFound(String),

    /// A behavior refers to a vending machine that was never declared.
    #[error("vending machine not found: {0}")]
    VendorNotFound(EntityKey),

    /// Reading a scenario file failed.
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    /// Scenario JSON could not be decoded.
    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),
}
