use crate::entity::EntityKey;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while building or mutating a world.
///
/// All of these indicate broken content or a programming mistake. Ordinary
/// gameplay refusals (a locked door, a full bag) are reported as outcomes,
/// never as errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Another entity already uses this key.
    #[error("duplicate entity key: \"{0}\"")]
    DuplicateKey(EntityKey),

    /// The requested key does not exist in the world.
    #[error("entity not found: \"{0}\"")]
    EntityNotFound(EntityKey),

    /// An entity was declared without a `Main` description.
    #[error("entity \"{0}\" has no Main description")]
    MissingMainDescription(EntityKey),

    /// A description tag was selected that the entity never declared.
    #[error("entity \"{key}\" has no \"{tag}\" description")]
    UnknownDescription {
        /// The entity whose description was changed.
        key: EntityKey,
        /// The undeclared tag.
        tag: String,
    },

    /// The entity was used as a container but is not one.
    #[error("entity \"{0}\" is not a container")]
    NotAContainer(EntityKey),

    /// The entity was used as a room but is not one.
    #[error("entity \"{0}\" is not a room")]
    NotARoom(EntityKey),

    /// The entity was used as a character but is not one.
    #[error("entity \"{0}\" is not a character")]
    NotACharacter(EntityKey),

    /// Adding the item would exceed the container's capacity.
    #[error("\"{item}\" does not fit in \"{container}\"")]
    CapacityExceeded {
        /// The item being placed.
        item: EntityKey,
        /// The full container.
        container: EntityKey,
    },

    /// An entity's location cannot hold other entities.
    #[error("\"{holder}\" cannot hold \"{item}\"")]
    InvalidLocation {
        /// The entity being placed.
        item: EntityKey,
        /// The entity named as its location.
        holder: EntityKey,
    },

    /// A direction name could not be parsed.
    #[error("invalid direction: \"{0}\"")]
    InvalidDirection(String),

    /// World JSON could not be decoded.
    #[error("invalid world JSON: {0}")]
    Json(#[from] serde_json::Error),
}
